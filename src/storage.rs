//! Local persistence of scan history and favorite networks.
//!
//! Reads never surface an error: an unreadable or corrupt entry is treated
//! as empty and logged. Writes are logged on failure and not propagated.
//! There is no locking across calls; concurrent writers race and the last
//! write wins.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::constants::{FAVORITES_KEY, HISTORY_KEY, LOCAL_HISTORY_CAP};
use crate::errors::{DecodeError, Result};
use crate::model::ScanHistoryItem;

/// String key-value store, the device-local persistence capability
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per entry inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path(key), value).await?;
        Ok(())
    }
}

/// Volatile store, handy for tests and one-shot runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// History and favorites on top of a [`KeyValueStore`]
#[derive(Clone)]
pub struct LocalStore {
    store: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn try_read<T: DeserializeOwned + Default>(&self, key: &str) -> std::result::Result<T, DecodeError> {
        match self.store.get_item(key).await.map_err(DecodeError::Read)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(T::default()),
        }
    }

    /// Stored history, newest first, with decode failures reported
    pub async fn try_local_history(&self) -> std::result::Result<Vec<ScanHistoryItem>, DecodeError> {
        self.try_read(HISTORY_KEY).await
    }

    /// Stored history, newest first; empty when missing or unreadable
    pub async fn get_local_history(&self) -> Vec<ScanHistoryItem> {
        self.try_local_history().await.unwrap_or_else(|e| {
            warn!(error = %e, "local history unreadable, treating as empty");
            Vec::new()
        })
    }

    /// Prepend `item` and keep at most [`LOCAL_HISTORY_CAP`] entries
    pub async fn save_local_history(&self, item: ScanHistoryItem) {
        let mut history = self.get_local_history().await;
        history.insert(0, item);
        history.truncate(LOCAL_HISTORY_CAP);

        if let Err(e) = self.write(HISTORY_KEY, &history).await {
            warn!(error = %e, "failed to save local history");
        }
    }

    pub async fn try_favorites(&self) -> std::result::Result<Vec<String>, DecodeError> {
        self.try_read(FAVORITES_KEY).await
    }

    /// Favorite BSSIDs in insertion order; empty when missing or unreadable
    pub async fn get_favorites(&self) -> Vec<String> {
        self.try_favorites().await.unwrap_or_else(|e| {
            warn!(error = %e, "favorites unreadable, treating as empty");
            Vec::new()
        })
    }

    /// Add `bssid` if absent, remove it if present. Returns true when it was added.
    pub async fn toggle_favorite(&self, bssid: &str) -> bool {
        let mut favorites = self.get_favorites().await;
        let added = match favorites.iter().position(|f| f == bssid) {
            Some(index) => {
                favorites.remove(index);
                false
            }
            None => {
                favorites.push(bssid.to_string());
                true
            }
        };

        match self.write(FAVORITES_KEY, &favorites).await {
            Ok(()) => {
                debug!(bssid, added, "favorite toggled");
                added
            }
            Err(e) => {
                warn!(error = %e, "failed to save favorites");
                false
            }
        }
    }

    async fn write<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set_item(key, &raw).await
    }
}
