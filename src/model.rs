use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::constants::{FIVE_GHZ_THRESHOLD_MHZ, HIDDEN_SSID_LABEL};

/// A WiFi access point radio observed by a native scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiNetwork {
    /// Empty for hidden networks.
    pub ssid: String,
    /// Unique within a single scan snapshot.
    pub bssid: String,
    /// Signal strength in dBm.
    pub level: i32,
    /// Centre frequency in MHz.
    pub frequency: u32,
    pub capabilities: String,
    /// Epoch milliseconds of the observation.
    pub timestamp: i64,
}

impl WifiNetwork {
    pub fn band(&self) -> Band {
        Band::from_frequency(self.frequency)
    }

    pub fn is_five_ghz(&self) -> bool {
        self.band() == Band::FiveGhz
    }

    pub fn display_ssid(&self) -> &str {
        if self.ssid.is_empty() {
            HIDDEN_SSID_LABEL
        } else {
            &self.ssid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "2.4GHz")]
    TwoPointFourGhz,
    #[serde(rename = "5GHz")]
    FiveGhz,
}

impl Band {
    pub fn from_frequency(frequency_mhz: u32) -> Self {
        if frequency_mhz >= FIVE_GHZ_THRESHOLD_MHZ {
            Band::FiveGhz
        } else {
            Band::TwoPointFourGhz
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::TwoPointFourGhz => write!(f, "2.4GHz"),
            Band::FiveGhz => write!(f, "5GHz"),
        }
    }
}

/// A host found on the LAN by the backend device scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDevice {
    pub ip: String,
    pub hostname: Option<String>,
    pub mac: Option<String>,
    pub vendor: Option<String>,
    #[serde(default)]
    pub is_server: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mdns_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    /// `None` when the backend has no trust decision for this device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

/// One WiFi scan as kept in the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanHistoryItem {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub networks: Vec<WifiNetwork>,
    pub network_count: usize,
}

impl ScanHistoryItem {
    /// Builds a history entry for a scan completed at `at`; the id is derived from the time.
    pub fn from_scan(networks: Vec<WifiNetwork>, at: OffsetDateTime) -> Self {
        Self {
            id: epoch_millis(at).to_string(),
            timestamp: at,
            network_count: networks.len(),
            networks,
        }
    }

    pub fn five_ghz_count(&self) -> usize {
        self.networks.iter().filter(|n| n.is_five_ghz()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceScanResult {
    #[serde(rename = "serverIP")]
    pub server_ip: String,
    pub subnet: String,
    pub devices: Vec<NetworkDevice>,
    #[serde(default)]
    pub new_devices: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub scanned_at: OffsetDateTime,
}

/// Backend-owned identity record for a MAC address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownDevice {
    pub mac: String,
    pub ip: String,
    pub hostname: Option<String>,
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub first_seen: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
    pub trusted: bool,
}

/// Known devices keyed by MAC address
pub type KnownDevices = HashMap<String, KnownDevice>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPort {
    pub port: u16,
    pub name: Option<String>,
    pub process: Option<String>,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionGroup {
    pub ip: String,
    pub count: u32,
    pub processes: Vec<String>,
    pub ports: Vec<u16>,
    pub local_ports: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub active: bool,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestResult {
    pub download: f64,
    pub upload: f64,
    pub latency: Option<f64>,
    pub unit: String,
    #[serde(with = "time::serde::rfc3339")]
    pub tested_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingSample {
    pub seq: u32,
    pub ttl: u32,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResult {
    pub target: String,
    pub pings: Vec<PingSample>,
    pub transmitted: u32,
    pub received: u32,
    pub loss: f64,
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub tested_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortsReport {
    pub ports: Vec<OpenPort>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionsReport {
    pub groups: Vec<ConnectionGroup>,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicesReport {
    pub services: Vec<ServiceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeOnLanReply {
    pub message: String,
}

/// Milliseconds since the Unix epoch
pub fn epoch_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}
