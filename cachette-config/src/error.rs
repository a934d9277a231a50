//! Configuration error types

use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading configuration file
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvError(String),

    /// A value that cannot be interpreted for its key
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
