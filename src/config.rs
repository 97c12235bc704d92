use std::path::PathBuf;

use color_eyre::eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    spotify: SpotifyConfig,
    tidal: TidalConfig,
    #[serde(default)]
    sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub access_token: String,
    /// Override of the API base URL, mainly for testing.
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TidalConfig {
    pub access_token: String,
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Only source playlists whose name starts with this prefix are mirrored.
    #[serde(default)]
    pub playlist_prefix: Option<String>,
    /// Destination folder the mirrored playlists are filed under.
    #[serde(default)]
    pub parent_folder: Option<String>,
    /// Merge every matched playlist into this single destination playlist.
    #[serde(default)]
    pub combine_into: Option<String>,
}

const DEFAULT_CONFIG: &str = r#"[spotify]
access_token = ""

[tidal]
access_token = ""

[sync]
# playlist_prefix = "EUROVISION"
# parent_folder = "Eurovision"
# combine_into = "Everything"
"#;

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-mirror").join("config.toml"))
    }

    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or(eyre!("Config file not found"))?;

        Self::from_file(&config_path)
    }

    /// Write a default config file at the default location, unless one exists
    pub fn create_default() -> Result<()> {
        let path = Self::config_path().ok_or(eyre!("No default config path found"))?;

        if path.exists() {
            log::info!("Config file already exists at {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, DEFAULT_CONFIG)
            .context(format!("Failed to write {}", path.display()))?;

        log::info!("Created default config at {}", path.display());
        Ok(())
    }

    pub fn spotify(&self) -> &SpotifyConfig {
        &self.spotify
    }

    pub fn tidal(&self) -> &TidalConfig {
        &self.tidal
    }

    pub fn sync(&self) -> &SyncConfig {
        &self.sync
    }
}
