use std::path::PathBuf;

use eui48::MacAddress;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::RequestFence;
use crate::api::ApiClient;
use crate::classify::device::{classify_device, DeviceBadge};
use crate::errors::{Result, ScanBoxError};
use crate::export::{ExportFormat, Exporter};
use crate::model::{DeviceScanResult, KnownDevice, KnownDevices, NetworkDevice};

/// State of the LAN devices screen
#[derive(Debug, Clone, Default)]
pub struct DevicesState {
    pub result: Option<DeviceScanResult>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DevicesState {
    pub fn devices(&self) -> &[NetworkDevice] {
        self.result.as_ref().map(|r| r.devices.as_slice()).unwrap_or_default()
    }
}

/// A device with its display classification
#[derive(Debug, Clone)]
pub struct DeviceRow {
    pub device: NetworkDevice,
    pub badge: DeviceBadge,
}

impl DeviceRow {
    /// Custom name first, then the classifier label, then the hostname, then the IP
    pub fn title(&self) -> &str {
        self.device
            .custom_name
            .as_deref()
            .or(self.badge.label)
            .or(self.device.hostname.as_deref())
            .unwrap_or(&self.device.ip)
    }
}

/// Copy user-assigned names from the known-device map onto scanned devices, matching MACs case-insensitively
pub fn merge_known_names(devices: &mut [NetworkDevice], known: &KnownDevices) {
    for device in devices.iter_mut() {
        let Some(mac) = device.mac.as_deref() else {
            continue;
        };

        let name = known
            .iter()
            .find(|(key, entry)| key.eq_ignore_ascii_case(mac) || entry.mac.eq_ignore_ascii_case(mac))
            .and_then(|(_, entry)| entry.custom_name.clone());

        if let Some(name) = name {
            device.custom_name = Some(name);
        }
    }
}

/// LAN device screen: scan, known-device enrichment, trust, Wake-on-LAN and export
pub struct DevicesController {
    api: ApiClient,
    exporter: Exporter,
    fence: RequestFence,
    state: Mutex<DevicesState>,
}

impl DevicesController {
    pub fn new(api: ApiClient, exporter: Exporter) -> Self {
        Self {
            api,
            exporter,
            fence: RequestFence::new(),
            state: Mutex::new(DevicesState::default()),
        }
    }

    pub async fn state(&self) -> DevicesState {
        self.state.lock().await.clone()
    }

    /// Ask the backend for a device scan. Returns `Ok(false)` when a scan is already running.
    pub async fn scan(&self) -> Result<bool> {
        let ticket = {
            let mut state = self.state.lock().await;
            if state.loading {
                debug!("device scan already in progress, ignoring trigger");
                return Ok(false);
            }
            state.loading = true;
            state.error = None;
            self.fence.issue()
        };

        let outcome = self.api.scan_devices().await;
        let outcome = match outcome {
            Ok(mut result) => {
                match self.api.get_known_devices().await {
                    Ok(known) => merge_known_names(&mut result.devices, &known),
                    Err(e) => debug!(error = %e, "known devices unavailable, names not merged"),
                }
                Ok(result)
            }
            Err(e) => Err(e),
        };

        let mut state = self.state.lock().await;
        state.loading = false;
        match outcome {
            Ok(result) => {
                info!(
                    devices = result.devices.len(),
                    new = result.new_devices,
                    subnet = %result.subnet,
                    "device scan complete"
                );
                if self.fence.is_current(ticket) {
                    state.result = Some(result);
                }
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "device scan failed");
                if self.fence.is_current(ticket) {
                    state.error = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    pub async fn rows(&self) -> Vec<DeviceRow> {
        self.state
            .lock()
            .await
            .devices()
            .iter()
            .map(|device| DeviceRow {
                badge: classify_device(device),
                device: device.clone(),
            })
            .collect()
    }

    /// Mark a device trusted or not, optionally renaming it, and reflect the answer locally
    pub async fn set_trust(&self, mac: &str, trusted: bool, name: Option<&str>) -> Result<KnownDevice> {
        let mac = mac.trim();
        MacAddress::parse_str(mac).map_err(|_| ScanBoxError::InvalidMac(mac.to_string()))?;

        let known = self.api.set_device_trust(mac, trusted, name).await?;

        let mut state = self.state.lock().await;
        if let Some(result) = state.result.as_mut() {
            for device in result.devices.iter_mut() {
                if device.mac.as_deref().is_some_and(|m| m.eq_ignore_ascii_case(mac)) {
                    device.trusted = Some(known.trusted);
                    if known.custom_name.is_some() {
                        device.custom_name = known.custom_name.clone();
                    }
                }
            }
        }
        Ok(known)
    }

    /// Send a Wake-on-LAN request after checking that `mac` is a valid EUI-48 address
    pub async fn wake(&self, mac: &str) -> Result<String> {
        let parsed = MacAddress::parse_str(mac.trim())
            .map_err(|_| ScanBoxError::InvalidMac(mac.to_string()))?;

        let reply = self.api.wake_on_lan(&parsed.to_hex_string()).await?;
        info!(mac = %parsed.to_hex_string(), "wake-on-lan sent");
        Ok(reply.message)
    }

    pub async fn export(&self, format: ExportFormat) -> Result<PathBuf> {
        let devices = self.state.lock().await.devices().to_vec();
        if devices.is_empty() {
            return Err(ScanBoxError::Other("no devices to export".to_string()));
        }
        self.exporter.export_devices(&devices, format).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn known(mac: &str, name: Option<&str>) -> KnownDevice {
        KnownDevice {
            mac: mac.to_string(),
            ip: "192.168.1.10".to_string(),
            hostname: None,
            vendor: None,
            custom_name: name.map(str::to_string),
            first_seen: datetime!(2024-01-01 0:00 UTC),
            last_seen: datetime!(2024-01-02 0:00 UTC),
            trusted: true,
        }
    }

    #[test]
    fn test_merge_matches_mac_case_insensitively() {
        let mut devices = vec![
            NetworkDevice {
                ip: "192.168.1.10".to_string(),
                mac: Some("aa:bb:cc:dd:ee:ff".to_string()),
                ..Default::default()
            },
            NetworkDevice {
                ip: "192.168.1.11".to_string(),
                mac: Some("11:22:33:44:55:66".to_string()),
                custom_name: Some("kept".to_string()),
                ..Default::default()
            },
            NetworkDevice {
                ip: "192.168.1.12".to_string(),
                ..Default::default()
            },
        ];

        let mut map = KnownDevices::new();
        map.insert("AA:BB:CC:DD:EE:FF".to_string(), known("AA:BB:CC:DD:EE:FF", Some("NAS")));
        map.insert("11:22:33:44:55:66".to_string(), known("11:22:33:44:55:66", None));

        merge_known_names(&mut devices, &map);
        assert_eq!(devices[0].custom_name.as_deref(), Some("NAS"));
        assert_eq!(devices[1].custom_name.as_deref(), Some("kept"));
        assert_eq!(devices[2].custom_name, None);
    }

    #[test]
    fn test_row_title_precedence() {
        let device = NetworkDevice {
            ip: "192.168.1.254".to_string(),
            vendor: Some("Sagemcom".to_string()),
            ..Default::default()
        };
        let row = DeviceRow {
            badge: classify_device(&device),
            device: device.clone(),
        };
        assert_eq!(row.title(), "Box Internet");

        let bare = NetworkDevice {
            ip: "10.0.0.7".to_string(),
            ..Default::default()
        };
        let row = DeviceRow {
            badge: classify_device(&bare),
            device: bare,
        };
        assert_eq!(row.title(), "10.0.0.7");
    }
}
