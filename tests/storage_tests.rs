use std::sync::Arc;

use async_trait::async_trait;
use time::macros::datetime;
use time::Duration;

use scanbox::constants::{FAVORITES_KEY, HISTORY_KEY, LOCAL_HISTORY_CAP};
use scanbox::errors::{Result, ScanBoxError};
use scanbox::model::ScanHistoryItem;
use scanbox::storage::{FileStore, KeyValueStore, LocalStore, MemoryStore};
use test_utils::create_test_network;

mod test_utils;

fn memory_store() -> LocalStore {
    LocalStore::new(Arc::new(MemoryStore::new()))
}

/// Store whose writes always fail
struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(ScanBoxError::Other("read-only".to_string()))
    }
}

#[tokio::test]
async fn test_toggle_favorite_twice_restores_membership() {
    let local = memory_store();
    local.toggle_favorite("aa:aa").await;
    let before = local.get_favorites().await;

    assert!(local.toggle_favorite("bb:bb").await);
    assert_eq!(local.get_favorites().await, vec!["aa:aa", "bb:bb"]);

    assert!(!local.toggle_favorite("bb:bb").await);
    assert_eq!(local.get_favorites().await, before);
}

#[tokio::test]
async fn test_history_capped_newest_first() {
    let local = memory_store();
    let start = datetime!(2024-05-20 12:00 UTC);

    for i in 0..=LOCAL_HISTORY_CAP as i64 {
        let network = create_test_network(&format!("net{i}"), &format!("bssid{i}"), -50, 2437, "[WPA2]");
        let item = ScanHistoryItem::from_scan(vec![network], start + Duration::seconds(i));
        local.save_local_history(item).await;
    }

    let history = local.get_local_history().await;
    assert_eq!(history.len(), LOCAL_HISTORY_CAP);
    assert_eq!(history[0].networks[0].ssid, format!("net{}", LOCAL_HISTORY_CAP));
    assert_eq!(history.last().unwrap().networks[0].ssid, "net1");
    assert!(history.iter().all(|h| h.networks[0].ssid != "net0"));
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let first = LocalStore::new(Arc::new(FileStore::new(dir.path().join("state"))));

    let item = ScanHistoryItem::from_scan(
        vec![create_test_network("Maison", "aa:bb:cc:dd:ee:01", -48, 5180, "[WPA2]")],
        datetime!(2024-05-20 12:00 UTC),
    );
    first.save_local_history(item.clone()).await;
    first.toggle_favorite("aa:bb:cc:dd:ee:01").await;

    let second = LocalStore::new(Arc::new(FileStore::new(dir.path().join("state"))));
    assert_eq!(second.get_local_history().await, vec![item]);
    assert_eq!(second.get_favorites().await, vec!["aa:bb:cc:dd:ee:01"]);
    assert!(dir.path().join("state").join(format!("{HISTORY_KEY}.json")).exists());
}

#[tokio::test]
async fn test_corrupt_favorites_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{FAVORITES_KEY}.json")), "[1, 2").unwrap();

    let local = LocalStore::new(Arc::new(FileStore::new(dir.path())));
    assert!(local.try_favorites().await.is_err());
    assert!(local.get_favorites().await.is_empty());

    // A toggle starts over from an empty list
    assert!(local.toggle_favorite("cc:cc").await);
    assert_eq!(local.get_favorites().await, vec!["cc:cc"]);
}

#[tokio::test]
async fn test_write_failures_are_swallowed() {
    let local = LocalStore::new(Arc::new(ReadOnlyStore));
    assert!(!local.toggle_favorite("aa:aa").await);

    let item = ScanHistoryItem::from_scan(Vec::new(), datetime!(2024-05-20 12:00 UTC));
    local.save_local_history(item).await;
    assert!(local.get_local_history().await.is_empty());
}
