//! Error types shared by the generation pipeline and config loading

use std::path::PathBuf;

/// Generation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameters { field: &'static str, reason: String },
}

impl GenerationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        GenerationError::InvalidParameters {
            field,
            reason: reason.into(),
        }
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported config format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config rejected: {0}")]
    Invalid(#[from] GenerationError),
}
