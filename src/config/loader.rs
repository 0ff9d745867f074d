use std::path::Path;

use super::Config;
use crate::error::Result;

pub const DEFAULT_CONFIG_FILE: &str = "shellcast_config.json";

/// Load a config file. A missing file yields the defaults; fields absent from
/// the file keep their default values.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(e) => return Err(e.into()),
    };

    let config: Config = serde_json::from_str(&content)?;
    // Surface a bad timestamp format at load time rather than on first use.
    config.timestamp_policy()?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let data = serde_json::to_string_pretty(config)?;
    std::fs::write(path, data)?;
    tracing::debug!("Saved config to {}", path.display());
    Ok(())
}
