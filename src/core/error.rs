//! Error types for reftree

use thiserror::Error;

/// Result type alias using reftree's Error
pub type Result<T> = std::result::Result<T, Error>;

/// reftree error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Entity not found: {id}")]
    EntityNotFound { id: String },

    #[error("Invalid max level {level} (must be at least 1)")]
    InvalidMaxLevel { level: usize },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Fetch error: {message}")]
    Fetch { message: String },

    #[error("The reference tree is too complex to be displayed")]
    TreeTooComplex,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Whether the caller should fall back to the "too complex" explanation
    /// instead of rendering a tree
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            Error::TreeTooComplex | Error::Fetch { .. } | Error::Http(_)
        )
    }
}
