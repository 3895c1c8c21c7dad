//! Common error types for MixWheel

use thiserror::Error;

/// Common result type for MixWheel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across MixWheel crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration file
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Upstream feature data outside its valid domain (bad key/mode index,
    /// non-finite tempo). Never coerced to a default.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}
