//! Persisted application configuration, currently just the remembered root
//! directory. Read at startup to resume the same folder.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::storage::{Error, Result};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The notebook folder selected by the user, if one has been chosen.
    pub root_dir: Option<PathBuf>,
    /// A version number for the config format, useful for future migrations.
    version: u32,
}

impl Config {
    pub fn new() -> Self {
        Config { root_dir: None, version: 1 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

/// Reads the config file at `path`. A missing file is a first run and yields
/// the default config; an unreadable or malformed one is an error so the
/// caller can surface it instead of silently forgetting the chosen folder.
pub async fn read_config(path: &Path) -> Result<Config> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::new());
        }
        Err(e) => {
            warn!("Failed to read config file '{}': {}", path.display(), e);
            return Err(Error::InvalidConfig(path.to_path_buf()));
        }
    };

    serde_json::from_slice(&content).map_err(|e| {
        warn!("Failed to parse config file '{}': {}", path.display(), e);
        Error::InvalidConfig(path.to_path_buf())
    })
}

/// Serializes and writes `config` to `path`, creating parent directories as
/// needed.
pub async fn write_config(path: &Path, config: &Config) -> Result<()> {
    let content = serde_json::to_string_pretty(config).map_err(Error::Metadata)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(Error::Io)?;
    }
    fs::write(path, content).await.map_err(Error::Io)?;
    debug!("Config written successfully to {}", path.display());
    Ok(())
}
