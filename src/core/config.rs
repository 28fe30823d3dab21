//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.kpmouse/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! Key bindings are fixed (see `dispatch::keymap`) and not configurable.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::navigation::NavigationSettings;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct KpmConfig {
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub buttons: ButtonsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NavigationConfig {
    pub max_depth: Option<u8>,
    pub linear_steps: Option<u32>,
    pub move_ttl_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ButtonsConfig {
    pub long_press_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub max_depth: Option<u8>,
    pub linear_steps: Option<u32>,
    pub move_ttl_ms: Option<u64>,
    pub long_press_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MAX_DEPTH: u8 = 4;
pub const DEFAULT_LINEAR_STEPS: u32 = 5;
pub const DEFAULT_MOVE_TTL_MS: u64 = 4000;
pub const DEFAULT_LONG_PRESS_MS: u64 = 600;
pub const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
pub const DEFAULT_LOG_FILE: &str = "kpmouse.log";

/// The window halves per zoom step; past this it is sub-pixel on any display.
pub const MAX_DEPTH_LIMIT: u8 = 8;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub navigation: NavigationSettings,
    pub long_press: Duration,
    pub log_level: log::LevelFilter,
    pub log_file: PathBuf,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.kpmouse/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".kpmouse"))
}

/// Returns the path to `~/.kpmouse/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Where the loaded config came from.
///
/// Loading runs before the logger exists, so the outcome is returned and
/// reported by [`ConfigSource::log`] once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file existed; a commented default was written here.
    Generated(PathBuf),
    /// No file existed and writing the commented default failed.
    GenerateFailed { path: PathBuf, reason: String },
    NoHomeDir,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Generated(path) => {
                info!("No config file found, generated default at {}", path.display())
            }
            ConfigSource::GenerateFailed { path, reason } => warn!(
                "No config file found, failed to write default at {}: {}",
                path.display(),
                reason
            ),
            ConfigSource::NoHomeDir => {
                warn!("Could not determine home directory, using default config")
            }
        }
    }
}

/// Load config from `path`, or `~/.kpmouse/config.toml` when `None`.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `KpmConfig::default()`. An explicit path that doesn't exist is an
/// error. A malformed file returns `ConfigError::Parse`.
pub fn load_config(path: Option<&Path>) -> Result<(KpmConfig, ConfigSource), ConfigError> {
    if let Some(path) = path {
        let config = read_config(path)?;
        return Ok((config, ConfigSource::File(path.to_path_buf())));
    }

    match config_path() {
        Some(p) => load_or_generate(&p),
        None => Ok((KpmConfig::default(), ConfigSource::NoHomeDir)),
    }
}

fn load_or_generate(path: &Path) -> Result<(KpmConfig, ConfigSource), ConfigError> {
    if path.exists() {
        let config = read_config(path)?;
        return Ok((config, ConfigSource::File(path.to_path_buf())));
    }

    let source = match generate_default_config(path) {
        Ok(()) => ConfigSource::Generated(path.to_path_buf()),
        Err(e) => ConfigSource::GenerateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    };
    Ok((KpmConfig::default(), source))
}

fn read_config(path: &Path) -> Result<KpmConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: KpmConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    let default_content = r#"# kpmouse Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [navigation]
# max_depth = 4          # zoom steps before linear movement (0-8)
# linear_steps = 5       # linear steps across the final zoom window
# move_ttl_ms = 4000     # inactivity before navigation starts over

# [buttons]
# long_press_ms = 600    # hold longer than this to keep the button down

# [logging]
# level = "info"         # "off", "error", "warn", "info", "debug", "trace"
# file = "kpmouse.log"   # relative to ~/.kpmouse/
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_content)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &KpmConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    let max_depth = pick(
        cli.max_depth,
        "KPMOUSE_MAX_DEPTH",
        config.navigation.max_depth,
        DEFAULT_MAX_DEPTH,
    )?;
    if max_depth > MAX_DEPTH_LIMIT {
        return Err(ConfigError::Invalid(format!(
            "max_depth must be at most {MAX_DEPTH_LIMIT}, got {max_depth}"
        )));
    }

    let linear_steps = pick(
        cli.linear_steps,
        "KPMOUSE_LINEAR_STEPS",
        config.navigation.linear_steps,
        DEFAULT_LINEAR_STEPS,
    )?;
    if linear_steps == 0 {
        return Err(ConfigError::Invalid(
            "linear_steps must be at least 1".to_string(),
        ));
    }

    let move_ttl_ms = pick(
        cli.move_ttl_ms,
        "KPMOUSE_MOVE_TTL_MS",
        config.navigation.move_ttl_ms,
        DEFAULT_MOVE_TTL_MS,
    )?;
    let long_press_ms = pick(
        cli.long_press_ms,
        "KPMOUSE_LONG_PRESS_MS",
        config.buttons.long_press_ms,
        DEFAULT_LONG_PRESS_MS,
    )?;

    // Log level: CLI → env → config → default
    let log_level = match cli
        .log_level
        .clone()
        .or_else(|| std::env::var("KPMOUSE_LOG_LEVEL").ok())
        .or_else(|| config.logging.level.clone())
    {
        Some(level) => log::LevelFilter::from_str(&level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {level:?}")))?,
        None => DEFAULT_LOG_LEVEL,
    };

    // Log file: CLI → config (relative to ~/.kpmouse/) → default
    let log_file = cli.log_file.clone().unwrap_or_else(|| {
        let name = config
            .logging
            .file
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        match config_dir() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    });

    Ok(ResolvedConfig {
        navigation: NavigationSettings {
            max_depth,
            linear_steps,
            move_ttl: Duration::from_millis(move_ttl_ms),
        },
        long_press: Duration::from_millis(long_press_ms),
        log_level,
        log_file,
    })
}

/// CLI → env → config file → default, for one numeric setting.
fn pick<T: FromStr>(
    cli: Option<T>,
    env_var: &str,
    file: Option<T>,
    default: T,
) -> Result<T, ConfigError> {
    if let Some(v) = cli {
        return Ok(v);
    }
    if let Ok(raw) = std::env::var(env_var) {
        return raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{env_var}={raw:?} is not a valid number")));
    }
    Ok(file.unwrap_or(default))
}
