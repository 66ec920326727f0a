use std::path::PathBuf;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::RequestFence;
use crate::api::ApiClient;
use crate::classify::signal::{connects_without_password, is_secure};
use crate::errors::{Result, ScanBoxError};
use crate::export::{ExportFormat, Exporter};
use crate::model::{ScanHistoryItem, WifiNetwork};
use crate::native::{normalize, PermissionStatus, WifiScanner};
use crate::storage::LocalStore;

/// Shown when the platform refuses the permission WiFi scanning needs
pub const PERMISSION_REQUIRED_MESSAGE: &str =
    "La localisation est requise pour scanner les reseaux WiFi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ScanFilter {
    #[default]
    All,
    #[value(name = "5ghz")]
    FiveGhz,
    Open,
    Favorites,
}

impl ScanFilter {
    pub fn accepts(&self, network: &WifiNetwork, favorites: &[String]) -> bool {
        match self {
            ScanFilter::All => true,
            ScanFilter::FiveGhz => network.is_five_ghz(),
            ScanFilter::Open => !is_secure(&network.capabilities),
            ScanFilter::Favorites => favorites.iter().any(|f| *f == network.bssid),
        }
    }
}

/// State of the WiFi screen
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    /// Latest scan, strongest first
    pub networks: Vec<WifiNetwork>,
    pub favorites: Vec<String>,
    pub filter: ScanFilter,
    pub scanning: bool,
    pub permission: Option<PermissionStatus>,
    pub error: Option<String>,
    /// BSSID of the network opened in the detail view
    pub selected: Option<String>,
    pub last_scan: Option<OffsetDateTime>,
}

impl ScanState {
    pub fn filtered(&self) -> Vec<WifiNetwork> {
        self.networks
            .iter()
            .filter(|n| self.filter.accepts(n, &self.favorites))
            .cloned()
            .collect()
    }

    pub fn is_favorite(&self, bssid: &str) -> bool {
        self.favorites.iter().any(|f| f == bssid)
    }

    pub fn selected_network(&self) -> Option<&WifiNetwork> {
        let bssid = self.selected.as_deref()?;
        self.networks.iter().find(|n| n.bssid == bssid)
    }
}

/// WiFi scan screen: permission gate, scan, filters, favorites, connect and export
pub struct ScanController {
    scanner: Arc<dyn WifiScanner>,
    api: ApiClient,
    local: LocalStore,
    exporter: Exporter,
    fence: RequestFence,
    state: Mutex<ScanState>,
}

impl ScanController {
    pub fn new(
        scanner: Arc<dyn WifiScanner>,
        api: ApiClient,
        local: LocalStore,
        exporter: Exporter,
    ) -> Self {
        Self {
            scanner,
            api,
            local,
            exporter,
            fence: RequestFence::new(),
            state: Mutex::new(ScanState::default()),
        }
    }

    pub async fn state(&self) -> ScanState {
        self.state.lock().await.clone()
    }

    /// Check the scan permission and load favorites
    pub async fn init(&self) -> Result<PermissionStatus> {
        let permission = self.scanner.request_permission().await?;
        let favorites = self.local.get_favorites().await;

        let mut state = self.state.lock().await;
        state.permission = Some(permission);
        state.favorites = favorites;
        if permission == PermissionStatus::Denied {
            warn!(scanner = self.scanner.name(), "wifi scan permission denied");
            state.error = Some(PERMISSION_REQUIRED_MESSAGE.to_string());
        }
        Ok(permission)
    }

    /// Run a scan. Returns `Ok(false)` without doing anything when one is already running.
    pub async fn scan(&self) -> Result<bool> {
        let unchecked = self.state.lock().await.permission.is_none();
        if unchecked {
            self.init().await?;
        }

        let ticket = {
            let mut state = self.state.lock().await;
            if state.scanning {
                debug!("scan already in progress, ignoring trigger");
                return Ok(false);
            }
            if state.permission != Some(PermissionStatus::Granted) {
                return Err(ScanBoxError::PermissionDenied(
                    PERMISSION_REQUIRED_MESSAGE.to_string(),
                ));
            }
            state.scanning = true;
            state.error = None;
            self.fence.issue()
        };

        let now = OffsetDateTime::now_utc();
        let raw = match self.scanner.scan().await {
            Ok(raw) => raw,
            Err(e) => {
                let mut state = self.state.lock().await;
                state.scanning = false;
                if self.fence.is_current(ticket) {
                    state.error = Some(e.to_string());
                }
                return Err(e);
            }
        };

        let networks = normalize(raw, now);
        info!(count = networks.len(), "wifi scan complete");

        self.local
            .save_local_history(ScanHistoryItem::from_scan(networks.clone(), now))
            .await;

        {
            let mut state = self.state.lock().await;
            state.scanning = false;
            if self.fence.is_current(ticket) {
                state.networks = networks.clone();
                state.last_scan = Some(now);
            }
        }

        // Local history is authoritative; the server copy is best-effort.
        if let Err(e) = self.api.save_scan_history(&networks).await {
            warn!(error = %e, "failed to mirror scan to server history");
        }

        Ok(true)
    }

    pub async fn set_filter(&self, filter: ScanFilter) {
        self.state.lock().await.filter = filter;
    }

    pub async fn filtered_networks(&self) -> Vec<WifiNetwork> {
        self.state.lock().await.filtered()
    }

    /// Returns true when `bssid` became a favorite
    pub async fn toggle_favorite(&self, bssid: &str) -> bool {
        let added = self.local.toggle_favorite(bssid).await;
        let favorites = self.local.get_favorites().await;
        self.state.lock().await.favorites = favorites;
        added
    }

    /// Open the detail view of a network from the current scan
    pub async fn select(&self, bssid: Option<&str>) -> Option<WifiNetwork> {
        let mut state = self.state.lock().await;
        state.selected = bssid.map(str::to_string);
        state.selected_network().cloned()
    }

    /// Join a network from the current scan. Secured networks need a password.
    pub async fn connect(&self, bssid: &str, password: Option<&str>) -> Result<()> {
        let network = self
            .state
            .lock()
            .await
            .networks
            .iter()
            .find(|n| n.bssid == bssid)
            .cloned()
            .ok_or_else(|| ScanBoxError::Other(format!("network {bssid} not in the last scan")))?;

        let password = if connects_without_password(&network.capabilities) {
            ""
        } else {
            match password {
                Some(p) if !p.is_empty() => p,
                _ => {
                    return Err(ScanBoxError::Other(format!(
                        "a password is required for {}",
                        network.display_ssid()
                    )))
                }
            }
        };

        // Hidden networks can only be addressed by BSSID
        let target = if network.ssid.is_empty() {
            network.bssid.as_str()
        } else {
            network.ssid.as_str()
        };

        self.scanner.connect(target, password).await?;
        info!(ssid = network.display_ssid(), "connected");
        Ok(())
    }

    /// Export the networks that pass the current filter
    pub async fn export(&self, format: ExportFormat) -> Result<PathBuf> {
        let networks = self.filtered_networks().await;
        self.exporter.export_networks(&networks, format).await
    }
}
