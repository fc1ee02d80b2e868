//! Configuration file loading

use std::path::Path;

use super::{
    ConfigError,
    I18nConfig,
};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "i18n.config.json";

/// Loads the configuration from a directory
///
/// Looks for `i18n.config.json`, reads it and validates it.
///
/// # Arguments
/// * `dir` - Directory holding the configuration file
///
/// # Returns
/// - `Ok(Some(config))`: the file was found, read and validated
/// - `Ok(None)`: no configuration file
/// - `Err(ConfigError)`: read, parse or validation error
///
/// # Errors
/// - File read error
/// - JSON parse error
/// - Validation error
pub fn load_from_dir(dir: &Path) -> Result<Option<I18nConfig>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let config: I18nConfig = serde_json::from_str(&content)?;
    config.validate().map_err(ConfigError::ValidationErrors)?;

    Ok(Some(config))
}
