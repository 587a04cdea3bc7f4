use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StorageConfig {
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    #[serde(default)]
    pub(crate) bucket: Option<String>,
    #[serde(default)]
    pub(crate) region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DatabaseConfig {
    #[serde(default)]
    pub(crate) host: Option<String>,
    #[serde(default)]
    pub(crate) port: Option<u16>,
    #[serde(default)]
    pub(crate) user: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
    #[serde(default)]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerConfig {
    #[serde(default)]
    pub(crate) executable: Option<String>,
    #[serde(default)]
    pub(crate) port: Option<u16>,
    #[serde(default)]
    pub(crate) startup_timeout: Option<u64>,
    #[serde(default)]
    pub(crate) icon_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LogsConfig {
    #[serde(default)]
    pub(crate) base_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) tenant: Option<String>,
    #[serde(default)]
    pub(crate) strict_provisioning: bool,
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    #[serde(default)]
    pub(crate) storage: StorageConfig,
    #[serde(default)]
    pub(crate) database: DatabaseConfig,
    #[serde(default)]
    pub(crate) server: ServerConfig,
    #[serde(default)]
    pub(crate) logs: LogsConfig,
}

impl Config {
    /// Load an explicitly requested config file. Errors are fatal here since
    /// the user asked for this file by name.
    pub(crate) fn load_from(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the first discovered config file, falling back to defaults.
    pub(crate) fn load() -> Self {
        for path in Self::get_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    return config;
                }
                Err(e) => tracing::warn!("{e}"),
            }
        }

        Self::default()
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/hubtrack/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("hubtrack").join("config.toml"));
        }

        // 2. Platform config dir (differs from XDG on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("hubtrack").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.hubtrack.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".hubtrack.toml"));
        }

        paths
    }
}
