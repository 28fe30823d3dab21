use std::fmt;

use crate::core::config::ConfigError;

/// Errors surfaced by kpmouse.
///
/// Nothing is retried: an `Io` failure from the display server ends the
/// dispatch loop.
#[derive(Debug)]
pub enum KpmError {
    /// Startup failed (no display, key grab refused, unbound key symbol).
    Init(String),
    /// A pointer or input primitive failed during steady-state operation.
    Io {
        operation: &'static str,
        message: String,
    },
    /// Config file unreadable, malformed or out of range.
    Config(ConfigError),
}

impl KpmError {
    pub fn io(operation: &'static str, err: impl fmt::Display) -> Self {
        KpmError::Io {
            operation,
            message: err.to_string(),
        }
    }

    pub fn init(err: impl fmt::Display) -> Self {
        KpmError::Init(err.to_string())
    }
}

impl fmt::Display for KpmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpmError::Init(msg) => write!(f, "initialization failed: {msg}"),
            KpmError::Io { operation, message } => {
                write!(f, "I/O error during {operation}: {message}")
            }
            KpmError::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for KpmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KpmError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for KpmError {
    fn from(e: ConfigError) -> Self {
        KpmError::Config(e)
    }
}

impl From<KpmError> for std::io::Error {
    fn from(e: KpmError) -> Self {
        std::io::Error::other(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KpmError>;
