use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_BASE_URL, SERVER_HISTORY_LIMIT};
use crate::errors::Result;

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Root of the REST contract, e.g. `https://host/api`
    pub base_url: String,

    /// `limit` requested when the history screen reads from the server
    pub history_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the key-value entries (history, favorites)
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory export files are written to before being shared
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// Application configuration, layered defaults < file < environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub export: ExportSettings,
    pub logger: Logger,
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// Environment variables use the `SCANBOX` prefix and `__` as the nesting
    /// separator, e.g. `SCANBOX__API__BASE_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.history_limit", i64::from(defaults.api.history_limit))?
            .set_default("storage.dir", defaults.storage.dir.to_string_lossy().to_string())?
            .set_default("export.dir", defaults.export.dir.to_string_lossy().to_string())?
            .set_default("logger.level", defaults.logger.level)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: AppConfig = builder
            .add_source(
                Environment::with_prefix("SCANBOX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                history_limit: SERVER_HISTORY_LIMIT,
            },
            storage: StorageSettings {
                dir: PathBuf::from(".scanbox"),
            },
            export: ExportSettings {
                dir: std::env::temp_dir(),
            },
            logger: Logger {
                level: "info".to_string(),
            },
        }
    }
}
