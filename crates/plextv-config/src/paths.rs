use anyhow::Result;
use std::path::PathBuf;

/// Default location of the config file: `<platform config dir>/plextv/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let base_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("plextv");
    Ok(base_dir.join("config.toml"))
}
