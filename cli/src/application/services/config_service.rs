//! Application service — configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::OutlineConfig;

/// Load configuration.
pub fn load_config(store: &impl ConfigStore) -> Result<OutlineConfig> {
    store.load()
}

/// Save configuration.
pub fn save_config(store: &impl ConfigStore, config: &OutlineConfig) -> Result<()> {
    store.save(config)
}

/// Validate `key = value`, apply it to the stored configuration and persist
/// the result. Returns the updated configuration.
///
/// # Errors
///
/// Returns an error if the key or value is invalid, or the store fails.
pub fn set_config_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<OutlineConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    tracing::debug!(key, value, "configuration updated");
    Ok(config)
}
