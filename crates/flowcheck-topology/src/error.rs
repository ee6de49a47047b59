//! Error types for topology configuration loading.

use std::io;
use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading a topology configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        /// The file that could not be read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The configuration document did not deserialize.
    #[error("Invalid configuration in '{path}': {source}")]
    Parse {
        /// The file that failed to parse.
        path: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    /// Creates a file read error.
    pub fn read(path: impl Into<String>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
