use crate::codec::Encoding;
use crate::error::{ChirpyError, Result};
use crate::store::StoreOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_DATABASE_PATH: &str = "database.json";

/// Configuration for chirpy, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChirpyConfig {
    /// Location of the database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// How long to wait for the database lock before giving up (none: wait forever)
    #[serde(default)]
    pub lock_timeout_ms: Option<u64>,

    /// Layout of the database file ("pretty" or "compact")
    #[serde(default)]
    pub encoding: Encoding,
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

impl Default for ChirpyConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            lock_timeout_ms: None,
            encoding: Encoding::default(),
        }
    }
}

impl ChirpyConfig {
    /// Load config from the given file, or return defaults if it does not exist
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)?;
        serde_json::from_str(&content).map_err(|e| {
            ChirpyError::Config(format!("{}: {}", config_path.display(), e))
        })
    }

    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();

        if let Some(dir) = config_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            lock_timeout: self.lock_timeout_ms.map(Duration::from_millis),
            encoding: self.encoding,
        }
    }
}
