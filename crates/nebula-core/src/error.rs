//! Error types for Nebula

use thiserror::Error;

/// The main error type for Nebula operations
#[derive(Debug, Error)]
pub enum NebulaError {
    /// A drawing surface could not be acquired. Fatal only for the system
    /// that draws on it.
    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Image error: {0}")]
    Image(String),
}

/// Result type alias for Nebula operations
pub type Result<T> = std::result::Result<T, NebulaError>;

impl From<toml::de::Error> for NebulaError {
    fn from(err: toml::de::Error) -> Self {
        NebulaError::TomlParse(err.to_string())
    }
}
