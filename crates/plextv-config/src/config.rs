use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub plex: PlexConfig,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    /// Machine identifier of the Plex server whose shared users are allowed
    /// through the access check. Absent until the server is configured.
    #[serde(default)]
    pub machine_id: Option<String>,
    #[serde(default)]
    pub server_url: Option<String>,
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the platform config directory
    /// (`<config dir>/plextv/config.toml`), falling back to defaults when no
    /// file exists yet.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = crate::paths::default_config_path()?;
        Self::load_or_default(&path)
    }

    /// Load from the given path, falling back to defaults when the file does
    /// not exist yet.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
