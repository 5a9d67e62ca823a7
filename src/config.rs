//! Loading and saving generation parameters

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::params::GenerationParams;

/// On-disk encoding of a parameter file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl TryFrom<&Path> for ConfigFormat {
    type Error = ConfigError;

    /// Extensions are matched case-insensitively
    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if extension.eq_ignore_ascii_case("toml") {
            Ok(ConfigFormat::Toml)
        } else if extension.eq_ignore_ascii_case("json") {
            Ok(ConfigFormat::Json)
        } else {
            Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Parse parameters from text. Missing fields take their defaults.
pub fn parse_params(text: &str, format: ConfigFormat) -> Result<GenerationParams, ConfigError> {
    let params: GenerationParams = match format {
        ConfigFormat::Json => serde_json::from_str(text)?,
        ConfigFormat::Toml => toml::from_str(text)?,
    };
    Ok(params.validated()?)
}

/// Load and validate parameters from a `.toml` or `.json` file
pub fn load_params(path: impl AsRef<Path>) -> Result<GenerationParams, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::try_from(path)?;

    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("[config] loading {:?} params from {}", format, path.display());
    parse_params(&text, format)
}

/// Write parameters in the format implied by the extension
pub fn save_params(params: &GenerationParams, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::try_from(path)?;

    let text = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(params)?,
        ConfigFormat::Toml => toml::to_string_pretty(params)?,
    };

    fs::write(path, text).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
