use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::RequestFence;
use crate::api::ApiClient;
use crate::errors::{Result, ScanBoxError};
use crate::model::{ConnectionsReport, PingResult, PortsReport, ServicesReport, SpeedTestResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NetworkSection {
    #[default]
    Services,
    Ports,
    Connections,
}

#[derive(Debug, Clone, Default)]
pub struct NetworkState {
    pub section: NetworkSection,
    pub services: Option<ServicesReport>,
    pub ports: Option<PortsReport>,
    pub connections: Option<ConnectionsReport>,
    pub info: Option<serde_json::Value>,
    pub speed_test: Option<SpeedTestResult>,
    pub ping: Option<PingResult>,
    pub loading: bool,
    pub testing_speed: bool,
    pub pinging: bool,
    pub error: Option<String>,
}

/// Diagnostics screen: services, ports, connections, speed test and ping
pub struct NetworkController {
    api: ApiClient,
    fence: RequestFence,
    state: Mutex<NetworkState>,
}

impl NetworkController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            fence: RequestFence::new(),
            state: Mutex::new(NetworkState::default()),
        }
    }

    pub async fn state(&self) -> NetworkState {
        self.state.lock().await.clone()
    }

    pub async fn set_section(&self, section: NetworkSection) {
        self.state.lock().await.section = section;
    }

    /// Fetch services, ports and connections together; any failure fails the whole load
    pub async fn load(&self) -> Result<bool> {
        let ticket = {
            let mut state = self.state.lock().await;
            if state.loading {
                debug!("diagnostics load already in progress, ignoring trigger");
                return Ok(false);
            }
            state.loading = true;
            state.error = None;
            self.fence.issue()
        };

        let outcome = futures::try_join!(
            self.api.get_services(),
            self.api.get_ports(),
            self.api.get_connections()
        );

        let mut state = self.state.lock().await;
        state.loading = false;
        match outcome {
            Ok((services, ports, connections)) => {
                if self.fence.is_current(ticket) {
                    state.services = Some(services);
                    state.ports = Some(ports);
                    state.connections = Some(connections);
                }
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "network diagnostics load failed");
                if self.fence.is_current(ticket) {
                    state.error = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Backend network summary, kept as raw JSON
    pub async fn load_info(&self) -> Result<serde_json::Value> {
        let info = self.api.get_network_info().await?;
        self.state.lock().await.info = Some(info.clone());
        Ok(info)
    }

    /// Returns `Ok(None)` when a speed test is already running
    pub async fn speed_test(&self) -> Result<Option<SpeedTestResult>> {
        {
            let mut state = self.state.lock().await;
            if state.testing_speed {
                return Ok(None);
            }
            state.testing_speed = true;
        }

        let outcome = self.api.run_speed_test().await;

        let mut state = self.state.lock().await;
        state.testing_speed = false;
        match outcome {
            Ok(result) => {
                info!(download = result.download, upload = result.upload, unit = %result.unit, "speed test done");
                state.speed_test = Some(result.clone());
                Ok(Some(result))
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Returns `Ok(None)` when a ping is already running
    pub async fn ping(&self, target: &str) -> Result<Option<PingResult>> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ScanBoxError::Other("ping target is empty".to_string()));
        }

        {
            let mut state = self.state.lock().await;
            if state.pinging {
                return Ok(None);
            }
            state.pinging = true;
        }

        let outcome = self.api.ping(target).await;

        let mut state = self.state.lock().await;
        state.pinging = false;
        match outcome {
            Ok(result) => {
                state.ping = Some(result.clone());
                Ok(Some(result))
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
