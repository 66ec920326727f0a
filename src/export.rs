//! JSON and CSV export of network and device lists.
//!
//! Builders are pure and synchronous; [`Exporter`] writes the blob to a file
//! and hands the path to a [`ShareTarget`]. Errors from either step go back
//! to the caller untouched.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

use crate::errors::{Result, ScanBoxError};
use crate::model::{epoch_millis, Band, NetworkDevice, WifiNetwork};

pub const NETWORKS_CSV_HEADER: &str = "SSID,BSSID,Signal (dBm),Frequency (MHz),Band,Security";
pub const DEVICES_CSV_HEADER: &str = "IP,Hostname,MAC,Vendor,IsServer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ScanBoxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ScanBoxError::Other(format!("unknown export format '{other}'"))),
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportedNetwork<'a> {
    ssid: &'a str,
    bssid: &'a str,
    signal: i32,
    frequency: u32,
    band: Band,
    security: &'a str,
    timestamp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NetworksDocument<'a> {
    #[serde(with = "time::serde::rfc3339")]
    exported_at: OffsetDateTime,
    count: usize,
    networks: Vec<ExportedNetwork<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DevicesDocument<'a> {
    #[serde(with = "time::serde::rfc3339")]
    exported_at: OffsetDateTime,
    count: usize,
    devices: &'a [NetworkDevice],
}

/// Pretty-printed `{exportedAt, count, networks}`
pub fn networks_json(networks: &[WifiNetwork], exported_at: OffsetDateTime) -> Result<String> {
    let document = NetworksDocument {
        exported_at,
        count: networks.len(),
        networks: networks
            .iter()
            .map(|n| ExportedNetwork {
                ssid: &n.ssid,
                bssid: &n.bssid,
                signal: n.level,
                frequency: n.frequency,
                band: n.band(),
                security: &n.capabilities,
                timestamp: n.timestamp,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Pretty-printed `{exportedAt, count, devices}`
pub fn devices_json(devices: &[NetworkDevice], exported_at: OffsetDateTime) -> Result<String> {
    let document = DevicesDocument {
        exported_at,
        count: devices.len(),
        devices,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

// Every field that is not a number is quoted, band and flags included. Embedded quotes are doubled.
fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::NonNumeric)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish_csv(header: &str, writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let rows = writer
        .into_inner()
        .map_err(|e| ScanBoxError::Other(format!("CSV buffer flush failed: {e}")))?;
    let rows = String::from_utf8(rows)
        .map_err(|e| ScanBoxError::Other(format!("CSV output is not UTF-8: {e}")))?;
    Ok(format!("{header}\n{rows}"))
}

pub fn networks_csv(networks: &[WifiNetwork]) -> Result<String> {
    let mut writer = csv_writer();
    for n in networks {
        let level = n.level.to_string();
        let frequency = n.frequency.to_string();
        let band = n.band().to_string();
        writer.write_record([
            n.ssid.as_str(),
            n.bssid.as_str(),
            level.as_str(),
            frequency.as_str(),
            band.as_str(),
            n.capabilities.as_str(),
        ])?;
    }
    finish_csv(NETWORKS_CSV_HEADER, writer)
}

pub fn devices_csv(devices: &[NetworkDevice]) -> Result<String> {
    let mut writer = csv_writer();
    for d in devices {
        writer.write_record([
            d.ip.as_str(),
            d.hostname.as_deref().unwrap_or_default(),
            d.mac.as_deref().unwrap_or_default(),
            d.vendor.as_deref().unwrap_or_default(),
            if d.is_server { "true" } else { "false" },
        ])?;
    }
    finish_csv(DEVICES_CSV_HEADER, writer)
}

/// The platform share action an export file is handed to
#[async_trait]
pub trait ShareTarget: Send + Sync {
    async fn share(&self, path: &Path) -> Result<()>;
}

/// Share by announcing the file location through the log
#[derive(Debug, Default)]
pub struct LogShare;

#[async_trait]
impl ShareTarget for LogShare {
    async fn share(&self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "export ready");
        Ok(())
    }
}

/// Writes export files into a directory and shares them
#[derive(Clone)]
pub struct Exporter {
    dir: PathBuf,
    share: Arc<dyn ShareTarget>,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>, share: Arc<dyn ShareTarget>) -> Self {
        Self {
            dir: dir.into(),
            share,
        }
    }

    pub async fn export_networks(&self, networks: &[WifiNetwork], format: ExportFormat) -> Result<PathBuf> {
        let now = OffsetDateTime::now_utc();
        let content = match format {
            ExportFormat::Json => networks_json(networks, now)?,
            ExportFormat::Csv => networks_csv(networks)?,
        };
        self.write_and_share("wifi", format, now, &content).await
    }

    pub async fn export_devices(&self, devices: &[NetworkDevice], format: ExportFormat) -> Result<PathBuf> {
        let now = OffsetDateTime::now_utc();
        let content = match format {
            ExportFormat::Json => devices_json(devices, now)?,
            ExportFormat::Csv => devices_csv(devices)?,
        };
        self.write_and_share("devices", format, now, &content).await
    }

    async fn write_and_share(
        &self,
        kind: &str,
        format: ExportFormat,
        at: OffsetDateTime,
        content: &str,
    ) -> Result<PathBuf> {
        let filename = format!("scanbox_{}_{}.{}", kind, epoch_millis(at), format.extension());
        let path = self.dir.join(filename);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, content).await?;
        self.share.share(&path).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(ssid: &str, bssid: &str, level: i32, frequency: u32, caps: &str) -> WifiNetwork {
        WifiNetwork {
            ssid: ssid.to_string(),
            bssid: bssid.to_string(),
            level,
            frequency,
            capabilities: caps.to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_networks_csv_layout() {
        let csv = networks_csv(&[
            network("Maison", "aa:bb:cc:dd:ee:01", -48, 5180, "[WPA2-PSK-CCMP]"),
            network("", "aa:bb:cc:dd:ee:02", -80, 2437, "[OPEN]"),
        ])
        .unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], NETWORKS_CSV_HEADER);
        assert_eq!(lines[1], r#""Maison","aa:bb:cc:dd:ee:01",-48,5180,"5GHz","[WPA2-PSK-CCMP]""#);
        assert_eq!(lines[2], r#""","aa:bb:cc:dd:ee:02",-80,2437,"2.4GHz","[OPEN]""#);
    }

    #[test]
    fn test_csv_escapes_quotes_and_commas() {
        let csv = networks_csv(&[network("Bob's \"fast\", net", "x", -60, 2412, "[ESS]")]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(r#""Bob's ""fast"", net","x","#));
    }

    #[test]
    fn test_devices_csv_blanks_missing_fields() {
        let device = NetworkDevice {
            ip: "192.168.1.254".to_string(),
            vendor: Some("Sagemcom".to_string()),
            ..Default::default()
        };
        let csv = devices_csv(&[device]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], DEVICES_CSV_HEADER);
        assert_eq!(lines[1], r#""192.168.1.254","","","Sagemcom","false""#);
    }

    #[test]
    fn test_csv_quotes_band_and_server_flag() {
        let device = NetworkDevice {
            ip: "1.2.3.4".to_string(),
            is_server: true,
            ..Default::default()
        };
        let csv = devices_csv(&[device]).unwrap();
        assert_eq!(csv.lines().nth(1), Some(r#""1.2.3.4","","","","true""#));

        let csv = networks_csv(&[network("A", "b", -40, 5180, "[WPA2]")]).unwrap();
        assert_eq!(csv.lines().nth(1), Some(r#""A","b",-40,5180,"5GHz","[WPA2]""#));
    }
}
