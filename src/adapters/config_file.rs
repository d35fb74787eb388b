//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a JSON document on the local file
//! system.  Missing fields take their defaults; the loaded configuration
//! is validated before it is returned.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::StationConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CONVEYOR_CONFIG";

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Adapter for the file named by `CONVEYOR_CONFIG`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(CONFIG_ENV).map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<StationConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let config: StationConfig =
            serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        info!("config: loaded {}", self.path.display());
        Ok(config)
    }
}
