use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::{Mutex, Notify};

use scanbox::errors::Result;
use scanbox::model::{NetworkDevice, WifiNetwork};
use scanbox::native::{PermissionStatus, RawWifiEntry, WifiScanner};

/// Create a test WiFi network
#[allow(dead_code)]
pub fn create_test_network(ssid: &str, bssid: &str, level: i32, frequency: u32, caps: &str) -> WifiNetwork {
    WifiNetwork {
        ssid: ssid.to_string(),
        bssid: bssid.to_string(),
        level,
        frequency,
        capabilities: caps.to_string(),
        timestamp: 1_716_206_400_000,
    }
}

/// Create a test network device with minimal configuration
#[allow(dead_code)]
pub fn create_test_device(ip: &str, vendor: Option<&str>, hostname: Option<&str>) -> NetworkDevice {
    NetworkDevice {
        ip: ip.to_string(),
        vendor: vendor.map(|s| s.to_string()),
        hostname: hostname.map(|s| s.to_string()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn raw_entry(ssid: &str, bssid: &str, level: i32, frequency: u32, caps: &str) -> RawWifiEntry {
    RawWifiEntry {
        ssid: Some(ssid.to_string()),
        bssid: Some(bssid.to_string()),
        level: Some(level),
        frequency: Some(frequency),
        capabilities: Some(caps.to_string()),
    }
}

/// `{success: true, data}`
#[allow(dead_code)]
pub fn ok(data: Value) -> axum::Json<Value> {
    axum::Json(json!({ "success": true, "data": data }))
}

/// `{success: false, error}`
#[allow(dead_code)]
pub fn fail(error: &str) -> axum::Json<Value> {
    axum::Json(json!({ "success": false, "error": error }))
}

/// Serve `router` on an ephemeral local port and return the API base URL
#[allow(dead_code)]
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Base URL nothing listens on
#[allow(dead_code)]
pub const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:9/api";

/// Scanner returning canned entries; optionally blocks inside `scan` until released
#[allow(dead_code)]
pub struct MockScanner {
    entries: Vec<RawWifiEntry>,
    permission: PermissionStatus,
    gate: Option<Arc<Notify>>,
    pub entered: Arc<Notify>,
    pub scans: AtomicUsize,
    pub connections: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl MockScanner {
    pub fn new(entries: Vec<RawWifiEntry>) -> Self {
        Self {
            entries,
            permission: PermissionStatus::Granted,
            gate: None,
            entered: Arc::new(Notify::new()),
            scans: AtomicUsize::new(0),
            connections: Mutex::new(Vec::new()),
        }
    }

    pub fn denied() -> Self {
        Self {
            permission: PermissionStatus::Denied,
            ..Self::new(Vec::new())
        }
    }

    /// `scan` waits on `gate` after signalling `entered`
    pub fn gated(entries: Vec<RawWifiEntry>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(entries)
        }
    }

    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WifiScanner for MockScanner {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        Ok(self.permission)
    }

    async fn scan(&self) -> Result<Vec<RawWifiEntry>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self.entries.clone())
    }

    async fn connect(&self, ssid: &str, password: &str) -> Result<()> {
        self.connections
            .lock()
            .await
            .push((ssid.to_string(), password.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
