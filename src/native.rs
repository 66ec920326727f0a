//! Native WiFi capability: permission, scan and connect.
//!
//! Controllers only see the [`WifiScanner`] trait. The shipped backend drives
//! NetworkManager through `nmcli`; tests plug in their own implementation.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::process::Command;
use tracing::debug;

use crate::constants::{
    DEFAULT_CAPABILITIES, DEFAULT_FREQUENCY_MHZ, DEFAULT_LEVEL_DBM,
};
use crate::errors::{Result, ScanBoxError};
use crate::model::{epoch_millis, WifiNetwork};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// One access point as reported by the platform, fields possibly missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWifiEntry {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub level: Option<i32>,
    pub frequency: Option<u32>,
    pub capabilities: Option<String>,
}

#[async_trait]
pub trait WifiScanner: Send + Sync {
    /// Ask for (or check) the permission WiFi scanning depends on
    async fn request_permission(&self) -> Result<PermissionStatus>;

    async fn scan(&self) -> Result<Vec<RawWifiEntry>>;

    /// Join `ssid`; open networks are joined with an empty password
    async fn connect(&self, ssid: &str, password: &str) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Fill missing fields with defaults, stamp with `now` and sort strongest first
pub fn normalize(entries: Vec<RawWifiEntry>, now: OffsetDateTime) -> Vec<WifiNetwork> {
    let timestamp = epoch_millis(now);
    let mut networks: Vec<WifiNetwork> = entries
        .into_iter()
        .map(|entry| WifiNetwork {
            ssid: entry.ssid.unwrap_or_default(),
            bssid: entry.bssid.unwrap_or_default(),
            level: entry.level.unwrap_or(DEFAULT_LEVEL_DBM),
            frequency: entry.frequency.unwrap_or(DEFAULT_FREQUENCY_MHZ),
            capabilities: entry
                .capabilities
                .unwrap_or_else(|| DEFAULT_CAPABILITIES.to_string()),
            timestamp,
        })
        .collect();

    networks.sort_by(|a, b| b.level.cmp(&a.level));
    networks
}

/// NetworkManager backend
#[derive(Debug, Clone)]
pub struct NmcliScanner {
    program: String,
}

impl Default for NmcliScanner {
    fn default() -> Self {
        Self {
            program: "nmcli".to_string(),
        }
    }
}

impl NmcliScanner {
    pub fn new() -> Self {
        Self::default()
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!(program = %self.program, ?args, "running");
        let output = Command::new(&self.program).args(args).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanBoxError::Scanner(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl WifiScanner for NmcliScanner {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        let state = self.run(&["radio", "wifi"]).await?;
        Ok(if state.trim() == "enabled" {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn scan(&self) -> Result<Vec<RawWifiEntry>> {
        let listing = self
            .run(&[
                "-t",
                "-f",
                "SSID,BSSID,SIGNAL,FREQ,SECURITY",
                "device",
                "wifi",
                "list",
                "--rescan",
                "yes",
            ])
            .await?;
        Ok(parse_nmcli_listing(&listing))
    }

    async fn connect(&self, ssid: &str, password: &str) -> Result<()> {
        let mut args = vec!["device", "wifi", "connect", ssid];
        if !password.is_empty() {
            args.extend(["password", password]);
        }
        self.run(&args).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "nmcli"
    }
}

/// Split one terse `nmcli` line on unescaped `:`, undoing `\:` and `\\`
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = vec![String::new()];
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let (Some(next), Some(field)) = (chars.next(), fields.last_mut()) {
                    field.push(next);
                }
            }
            ':' => fields.push(String::new()),
            _ => {
                if let Some(field) = fields.last_mut() {
                    field.push(c);
                }
            }
        }
    }
    fields
}

/// NetworkManager reports quality in percent; map it onto -100..-50 dBm
fn percent_to_dbm(percent: i32) -> i32 {
    percent.clamp(0, 100) / 2 - 100
}

/// `WPA1 WPA2` becomes `[WPA1][WPA2]`, an empty value means an open network
fn security_to_capabilities(security: &str) -> String {
    let tokens: Vec<&str> = security
        .split_whitespace()
        .filter(|t| *t != "--")
        .collect();
    if tokens.is_empty() {
        return "[OPEN]".to_string();
    }
    tokens.iter().map(|t| format!("[{t}]")).collect()
}

pub(crate) fn parse_nmcli_listing(listing: &str) -> Vec<RawWifiEntry> {
    listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields = split_terse(line);
            if fields.len() < 5 {
                debug!(line, "skipping malformed nmcli line");
                return None;
            }

            let frequency = fields[3]
                .split_whitespace()
                .next()
                .and_then(|f| f.parse().ok());

            Some(RawWifiEntry {
                ssid: Some(fields[0].clone()),
                bssid: Some(fields[1].clone()).filter(|b| !b.is_empty()),
                level: fields[2].trim().parse().ok().map(percent_to_dbm),
                frequency,
                capabilities: Some(security_to_capabilities(&fields[4])),
            })
        })
        .collect()
}
