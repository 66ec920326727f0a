use std::sync::Arc;

use time::macros::datetime;

use scanbox::classify::connection::{connection_label, port_label};
use scanbox::classify::signal::SignalStrength;
use scanbox::errors::ScanBoxError;
use scanbox::export::{networks_csv, ExportFormat, LogShare, NETWORKS_CSV_HEADER};
use scanbox::model::{ConnectionGroup, WifiNetwork};
use scanbox::native::{normalize, RawWifiEntry};
use scanbox::storage::MemoryStore;
use scanbox::view::devices::DevicesController;
use scanbox::view::scan::ScanController;
use scanbox::{ApiClient, Exporter, LocalStore};
use test_utils::{create_test_network, raw_entry, MockScanner, UNREACHABLE_BACKEND};

mod test_utils;

fn exporter() -> Exporter {
    Exporter::new(std::env::temp_dir(), Arc::new(LogShare))
}

#[test]
fn test_hidden_network_display_name() {
    let hidden = create_test_network("", "aa:00", -60, 2437, "[WPA2]");
    assert_eq!(hidden.display_ssid(), "(Reseau cache)");
    assert_eq!(hidden.band().to_string(), "2.4GHz");
}

#[test]
fn test_band_boundary_at_5000() {
    assert!(create_test_network("a", "a", -60, 5000, "").is_five_ghz());
    assert!(!create_test_network("b", "b", -60, 4999, "").is_five_ghz());
}

#[test]
fn test_extreme_signal_levels() {
    assert_eq!(SignalStrength::from_level(0), SignalStrength::Excellent);
    assert_eq!(SignalStrength::from_level(i32::MIN), SignalStrength::Faible);
    assert_eq!(SignalStrength::from_level(i32::MAX).bars(), 4);
}

#[test]
fn test_normalize_empty_scan() {
    assert!(normalize(Vec::new(), datetime!(2024-05-20 12:00 UTC)).is_empty());
}

#[test]
fn test_normalize_keeps_entries_without_bssid() {
    let networks = normalize(vec![RawWifiEntry::default()], datetime!(2024-05-20 12:00 UTC));
    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0].capabilities, "[UNKNOWN]");
}

#[test]
fn test_empty_csv_is_header_only() {
    let csv = networks_csv(&[] as &[WifiNetwork]).unwrap();
    assert_eq!(csv, format!("{NETWORKS_CSV_HEADER}\n"));
}

#[test]
fn test_unlabelled_connections_and_ports() {
    let group = ConnectionGroup {
        ip: "203.0.113.9".to_string(),
        count: 2,
        processes: Vec::new(),
        ports: vec![8443],
        local_ports: vec![50000, 50001],
    };
    assert_eq!(connection_label(&group), None);
    assert_eq!(port_label(0), None);
}

#[tokio::test]
async fn test_empty_device_export_rejected() {
    let controller = DevicesController::new(ApiClient::new(UNREACHABLE_BACKEND), exporter());
    let err = controller.export(ExportFormat::Csv).await.unwrap_err();
    assert!(matches!(err, ScanBoxError::Other(_)));
}

#[tokio::test]
async fn test_wake_rejects_malformed_mac() {
    let controller = DevicesController::new(ApiClient::new(UNREACHABLE_BACKEND), exporter());
    for mac in ["", "zz:zz:zz:zz:zz:zz", "aa:bb:cc"] {
        let err = controller.wake(mac).await.unwrap_err();
        assert!(matches!(err, ScanBoxError::InvalidMac(_)), "{mac}");
    }
}

#[tokio::test]
async fn test_trust_rejects_malformed_mac() {
    let controller = DevicesController::new(ApiClient::new(UNREACHABLE_BACKEND), exporter());
    for mac in ["../wol", "aa:bb:cc:dd:ee:ff/../../wol", "aa:bb?x=1", "  "] {
        let err = controller.set_trust(mac, true, None).await.unwrap_err();
        assert!(matches!(err, ScanBoxError::InvalidMac(_)), "{mac}");
    }
}

#[tokio::test]
async fn test_connect_unknown_network_fails() {
    let scanner = Arc::new(MockScanner::new(vec![raw_entry("Maison", "aa:01", -45, 5180, "[WPA2]")]));
    let controller = ScanController::new(
        scanner.clone(),
        ApiClient::new(UNREACHABLE_BACKEND),
        LocalStore::new(Arc::new(MemoryStore::new())),
        exporter(),
    );

    assert!(controller.connect("aa:01", Some("pw")).await.is_err());
    controller.scan().await.unwrap();
    assert!(controller.connect("ff:ff", Some("pw")).await.is_err());
    assert!(scanner.connections.lock().await.is_empty());
}

#[tokio::test]
async fn test_hidden_network_connects_by_bssid() {
    let scanner = Arc::new(MockScanner::new(vec![raw_entry("", "aa:09", -50, 2437, "[OPEN]")]));
    let controller = ScanController::new(
        scanner.clone(),
        ApiClient::new(UNREACHABLE_BACKEND),
        LocalStore::new(Arc::new(MemoryStore::new())),
        exporter(),
    );
    controller.scan().await.unwrap();

    let selected = controller.select(Some("aa:09")).await.unwrap();
    assert_eq!(selected.display_ssid(), "(Reseau cache)");

    controller.connect("aa:09", None).await.unwrap();
    assert_eq!(
        *scanner.connections.lock().await,
        vec![("aa:09".to_string(), String::new())]
    );
}
