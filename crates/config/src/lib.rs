// Configuration loading

pub mod settings;

use std::fmt;
use std::path::PathBuf;

pub use settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Settings file could not be read or written.
    Io { path: PathBuf, message: String },
    /// Settings file is not valid JSON for `Settings`.
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Parse { path, message } => {
                write!(f, "error parsing {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
