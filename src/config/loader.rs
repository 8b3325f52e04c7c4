//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ReceiverSettings;
use crate::config::validation::validate_settings;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load receiver settings from a TOML file.
pub fn load_config(path: &Path) -> Result<ReceiverSettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let settings = parse_config(&content)?;
    tracing::info!(path = %path.display(), port = settings.port, "Configuration loaded");
    Ok(settings)
}

/// Parse receiver settings from TOML text, logging any validation warnings.
pub fn parse_config(content: &str) -> Result<ReceiverSettings, ConfigError> {
    let settings: ReceiverSettings = toml::from_str(content)?;

    for warning in validate_settings(&settings) {
        tracing::warn!(%warning, "Questionable receiver configuration");
    }

    Ok(settings)
}
