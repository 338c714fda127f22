use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file could not be read or written.
    Io { path: String, message: String },
    /// Settings file is not valid settings JSON.
    Parse { path: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{path}: {message}"),
            Self::Parse { path, message } => write!(f, "{path}: invalid settings: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}
