use clap::Parser;
use kpmouse::backend::{KeysymLookup, X11Backend};
use kpmouse::core::clock::MonotonicClock;
use kpmouse::core::config::{self, CliOverrides};
use kpmouse::core::error::KpmError;
use kpmouse::dispatch::{Dispatcher, Keymap};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::{self, File};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kpmouse", about = "Drive the mouse pointer from the numeric keypad")]
struct Args {
    /// Config file (default: ~/.kpmouse/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Zoom steps before movement becomes linear
    #[arg(long)]
    max_depth: Option<u8>,

    /// Linear steps across the final zoom window
    #[arg(long)]
    linear_steps: Option<u32>,

    /// Inactivity (ms) after which navigation starts over
    #[arg(long)]
    move_ttl_ms: Option<u64>,

    /// Hold (ms) after which a button stays down until the next button key
    #[arg(long)]
    long_press_ms: Option<u64>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Log file (default: ~/.kpmouse/kpmouse.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let (file_config, config_source) =
        config::load_config(args.config.as_deref()).map_err(KpmError::from)?;
    let cli = CliOverrides {
        max_depth: args.max_depth,
        linear_steps: args.linear_steps,
        move_ttl_ms: args.move_ttl_ms,
        long_press_ms: args.long_press_ms,
        log_level: args.log_level,
        log_file: args.log_file,
    };
    let resolved = config::resolve(&file_config, &cli).map_err(KpmError::from)?;

    // Initialize file logger
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Some(parent) = resolved.log_file.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    config_source.log();
    log::info!("kpmouse starting up with {:?}", resolved);

    let mut backend = X11Backend::connect()?;
    let keymap = Keymap::resolve(&backend)?;
    backend.grab_keys(&keymap.codes())?;

    let mut dispatcher = Dispatcher::new(
        backend,
        MonotonicClock,
        keymap,
        resolved.navigation,
        resolved.long_press,
    )?;

    let result = dispatcher.run();
    if let Err(ref e) = result {
        log::error!("Dispatch loop stopped: {e}");
    }
    result.map_err(Into::into)
}
