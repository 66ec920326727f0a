//! ScanBox - WiFi, LAN and diagnostics client for the ScanBox backend
//!
//! This library provides:
//! - Display classification of devices, signal, security and connections
//! - A typed REST client for the backend `/network/*` contract
//! - Local scan history and favorites persistence
//! - JSON and CSV export
//! - Per-screen controllers holding explicit view state

pub mod api;
pub mod classify;
pub mod config;
pub mod constants;
pub mod errors;
pub mod export;
pub mod model;
pub mod native;
pub mod storage;
pub mod table;
pub mod view;

// Re-export commonly used types for convenience
pub use api::ApiClient;
pub use config::AppConfig;
pub use errors::{Result, ScanBoxError};
pub use export::{ExportFormat, Exporter, ShareTarget};
pub use model::{NetworkDevice, ScanHistoryItem, WifiNetwork};
pub use native::{NmcliScanner, PermissionStatus, WifiScanner};
pub use storage::{FileStore, KeyValueStore, LocalStore, MemoryStore};
