use std::fs;
use std::path::{Path, PathBuf};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::logging::LogLevel;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub indicator_glyph: String,
    pub indicator_brackets: bool,
    /// Drop a user's streaming flag when their session ends.
    pub clear_on_disconnect: bool,
    /// `{name}` and `{message}` are filled in after placeholders are resolved.
    pub chat_format: String,
    pub broadcast_format: String,
    #[serde(skip)]
    pub(crate) path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LogLevel::INFO,
            indicator_glyph: "⦿".to_string(),
            indicator_brackets: true,
            clear_on_disconnect: false,
            chat_format: "%streamertag:status%<{name}> {message}".to_string(),
            broadcast_format: "%streamertag:status%[Server] {message}".to_string(),
            path: PathBuf::from(Config::CONFIG_PATH),
        }
    }
}

impl Config {
    pub const CONFIG_PATH: &'static str = "streamertag.conf";

    /// Loads the config at `path`, writing the defaults there first if it is missing.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut config: Config = toml::from_str(&raw)?;
            config.path = path.to_path_buf();
            Ok(config)
        } else {
            let config = Config {
                path: path.to_path_buf(),
                ..Config::default()
            };
            config.save()?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let toml = toml::to_string(self)?;
        fs::write(&self.path, toml).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_log_level(&mut self, level: LogLevel) -> Result<(), ConfigError> {
        self.log_level = level;
        self.save()
    }
}
