//! Configuration for feedtag.
//!
//! FEEDTAG_ROOT resolution order:
//! 1. Explicit path passed to Config::with_root() / Config::load_from()
//! 2. FEEDTAG_ROOT environment variable
//! 3. Platform config directory (via the directories crate)
//! 4. Default: ~/.config/feedtag

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// feedtag configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config.toml.
    #[serde(skip)]
    pub root: PathBuf,

    /// Record field holding each record's tag collection.
    #[serde(default = "default_tag_field")]
    pub tag_field: String,

    /// Member holding the record array when an input document is an object.
    #[serde(default = "default_collection_key")]
    pub collection_key: String,

    /// Default output format: table, json, oneline.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_tag_field() -> String {
    "tags".to_string()
}

fn default_collection_key() -> String {
    "feeds".to_string()
}

fn default_format() -> String {
    "table".to_string()
}

impl Config {
    /// Create a new config with the given root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tag_field: default_tag_field(),
            collection_key: default_collection_key(),
            format: default_format(),
        }
    }

    /// Create a config using default root resolution.
    pub fn default_location() -> Result<Self> {
        let root = resolve_root()?;
        Ok(Self::with_root(root))
    }

    /// Load config from FEEDTAG_ROOT/config.toml, or fall back to defaults.
    pub fn load() -> Result<Self> {
        let root = resolve_root()?;
        Self::load_from(&root)
    }

    /// Load config from a specific root.
    pub fn load_from(root: &Path) -> Result<Self> {
        let config_path = root.join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
            config.root = root.to_path_buf();
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Self::with_root(root))
        }
    }

    /// Save config to FEEDTAG_ROOT/config.toml, creating the root if needed.
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(self.config_path(), contents)?;
        Ok(())
    }

    /// Path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }
}

/// Resolve FEEDTAG_ROOT using the standard resolution order.
fn resolve_root() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("FEEDTAG_ROOT") {
        return Ok(PathBuf::from(path));
    }

    if let Some(proj_dirs) = ProjectDirs::from("", "", "feedtag") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = std::env::var("HOME")
        .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;
    Ok(PathBuf::from(home).join(".config/feedtag"))
}
