use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::RequestFence;
use crate::api::ApiClient;
use crate::constants::HISTORY_TOP_NETWORKS;
use crate::errors::Result;
use crate::model::{ScanHistoryItem, WifiNetwork};
use crate::storage::LocalStore;

pub const SERVER_HISTORY_ERROR: &str = "Impossible de charger l'historique serveur";

const MONTHS_FR: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistorySource {
    #[default]
    Local,
    Server,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    pub items: Vec<ScanHistoryItem>,
    pub source: HistorySource,
    pub loading: bool,
    pub error: Option<String>,
    /// Id of the entry currently expanded, at most one
    pub expanded: Option<String>,
}

/// What a history card shows for one scan
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub id: String,
    pub timestamp: OffsetDateTime,
    pub network_count: usize,
    pub five_ghz_count: usize,
    /// Strongest networks as stored, at most [`HISTORY_TOP_NETWORKS`]
    pub top: Vec<WifiNetwork>,
    /// Networks beyond `top`
    pub more: usize,
}

impl HistorySummary {
    pub fn of(item: &ScanHistoryItem) -> Self {
        let top: Vec<WifiNetwork> = item
            .networks
            .iter()
            .take(HISTORY_TOP_NETWORKS)
            .cloned()
            .collect();
        Self {
            id: item.id.clone(),
            timestamp: item.timestamp,
            network_count: item.network_count,
            five_ghz_count: item.five_ghz_count(),
            more: item.networks.len().saturating_sub(top.len()),
            top,
        }
    }
}

/// `A l'instant`, `Il y a N min`, `Il y a Nh`, `Il y a Nj`, then `D mois` after a week
pub fn format_relative(at: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = now - at;

    if elapsed < Duration::minutes(1) {
        "A l'instant".to_string()
    } else if elapsed < Duration::hours(1) {
        format!("Il y a {} min", elapsed.whole_minutes())
    } else if elapsed < Duration::days(1) {
        format!("Il y a {}h", elapsed.whole_hours())
    } else if elapsed < Duration::days(7) {
        format!("Il y a {}j", elapsed.whole_days())
    } else {
        let month = MONTHS_FR[usize::from(u8::from(at.month())) - 1];
        format!("{} {}", at.day(), month)
    }
}

/// `HH:MM` of the scan
pub fn format_clock(at: OffsetDateTime) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}

/// Scan history screen reading from the local store or the server
pub struct HistoryController {
    api: ApiClient,
    local: LocalStore,
    server_limit: u32,
    fence: RequestFence,
    state: Mutex<HistoryState>,
}

impl HistoryController {
    pub fn new(api: ApiClient, local: LocalStore, server_limit: u32) -> Self {
        Self {
            api,
            local,
            server_limit,
            fence: RequestFence::new(),
            state: Mutex::new(HistoryState::default()),
        }
    }

    pub async fn state(&self) -> HistoryState {
        self.state.lock().await.clone()
    }

    /// Switch source and reload
    pub async fn set_source(&self, source: HistorySource) -> Result<bool> {
        self.state.lock().await.source = source;
        self.load().await
    }

    /// Reload from the current source. A failed server read falls back to the local history.
    ///
    /// A source switch made while a load is in flight is picked up by that load,
    /// which refetches from the new source before applying anything.
    pub async fn load(&self) -> Result<bool> {
        let (mut ticket, mut source) = {
            let mut state = self.state.lock().await;
            if state.loading {
                debug!("history load already in progress, ignoring trigger");
                return Ok(false);
            }
            state.loading = true;
            state.error = None;
            (self.fence.issue(), state.source)
        };

        loop {
            let (items, resolved, error) = self.fetch(source).await;

            let mut state = self.state.lock().await;
            if state.source != source {
                debug!(from = ?source, to = ?state.source, "history source changed during load, reloading");
                source = state.source;
                ticket = self.fence.issue();
                continue;
            }
            state.loading = false;
            if self.fence.is_current(ticket) {
                state.items = items;
                state.source = resolved;
                state.error = error;
            }
            return Ok(true);
        }
    }

    async fn fetch(&self, source: HistorySource) -> (Vec<ScanHistoryItem>, HistorySource, Option<String>) {
        match source {
            HistorySource::Local => (self.local.get_local_history().await, source, None),
            HistorySource::Server => match self.api.get_scan_history(Some(self.server_limit)).await {
                Ok(items) => (items, source, None),
                Err(e) => {
                    warn!(error = %e, "server history unavailable, falling back to local");
                    (
                        self.local.get_local_history().await,
                        HistorySource::Local,
                        Some(SERVER_HISTORY_ERROR.to_string()),
                    )
                }
            },
        }
    }

    /// Expand `id`, or collapse it when it is already expanded
    pub async fn toggle_expanded(&self, id: &str) -> Option<String> {
        let mut state = self.state.lock().await;
        state.expanded = match state.expanded.as_deref() {
            Some(current) if current == id => None,
            _ => Some(id.to_string()),
        };
        state.expanded.clone()
    }

    pub async fn summaries(&self) -> Vec<HistorySummary> {
        self.state
            .lock()
            .await
            .items
            .iter()
            .map(HistorySummary::of)
            .collect()
    }
}
