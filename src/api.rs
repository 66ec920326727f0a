//! Typed client for the ScanBox backend REST contract.
//!
//! Every endpoint answers with the same `{success, data?, error?}` envelope.
//! A call is a single round trip: no retry, no caching, and no timeout beyond
//! the HTTP client's defaults. Callers decide when to try again.

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{APP_ID, DEFAULT_HISTORY_QUERY_LIMIT};
use crate::errors::{Result, ScanBoxError};
use crate::model::{
    ConnectionsReport, DeviceScanResult, KnownDevice, KnownDevices, PingResult, PortsReport,
    ScanHistoryItem, ServicesReport, SpeedTestResult, WakeOnLanReply, WifiNetwork,
};

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Envelope {
    /// Unwrap `data` on success, otherwise fail with the server-provided message
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        if !self.success {
            return Err(ScanBoxError::Api(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        match self.data {
            Some(data) => Ok(serde_json::from_value(data)?),
            None => Err(ScanBoxError::Api("Missing data".to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
struct DeviceInfo<'a> {
    app: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveHistoryRequest<'a> {
    networks: &'a [WifiNetwork],
    device_info: DeviceInfo<'a>,
}

#[derive(Debug, Serialize)]
struct TrustRequest<'a> {
    trusted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WakeRequest<'a> {
    mac: &'a str,
}

/// REST client bound to one backend base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let envelope: Envelope = response.json().await?;
        envelope.into_result()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(method = "GET", path, "api request");
        self.send(self.http.get(self.url(path))).await
    }

    async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!(method = "GET", path, "api request");
        self.send(self.http.get(self.url(path)).query(query)).await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(method = "POST", path, "api request");
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    /// Mirror a WiFi scan to the server history
    pub async fn save_scan_history(&self, networks: &[WifiNetwork]) -> Result<ScanHistoryItem> {
        let body = SaveHistoryRequest {
            networks,
            device_info: DeviceInfo { app: APP_ID },
        };
        self.post("/network/wifi/history", &body).await
    }

    /// Server-side scan history, newest first
    pub async fn get_scan_history(&self, limit: Option<u32>) -> Result<Vec<ScanHistoryItem>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_QUERY_LIMIT);
        self.get_with_query("/network/wifi/history", &[("limit", limit)])
            .await
    }

    pub async fn scan_devices(&self) -> Result<DeviceScanResult> {
        self.get("/network/devices").await
    }

    /// Shape is backend-defined, so it is returned as raw JSON
    pub async fn get_network_info(&self) -> Result<serde_json::Value> {
        self.get("/network/info").await
    }

    pub async fn get_ports(&self) -> Result<PortsReport> {
        self.get("/network/ports").await
    }

    pub async fn get_connections(&self) -> Result<ConnectionsReport> {
        self.get("/network/connections").await
    }

    pub async fn get_services(&self) -> Result<ServicesReport> {
        self.get("/network/services").await
    }

    pub async fn get_known_devices(&self) -> Result<KnownDevices> {
        self.get("/network/known-devices").await
    }

    /// Mark a device as trusted or not, optionally renaming it
    pub async fn set_device_trust(
        &self,
        mac: &str,
        trusted: bool,
        name: Option<&str>,
    ) -> Result<KnownDevice> {
        let url = self.trust_url(mac)?;
        debug!(method = "POST", path = url.path(), "api request");
        self.send(self.http.post(url).json(&TrustRequest { trusted, name }))
            .await
    }

    /// `/network/known-devices/{mac}/trust` with `mac` percent-encoded as one segment
    fn trust_url(&self, mac: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url("/network/known-devices"))
            .map_err(|e| ScanBoxError::Other(format!("invalid backend url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ScanBoxError::Other(format!("backend url {} cannot take a path", self.base_url)))?
            .push(mac)
            .push("trust");
        Ok(url)
    }

    pub async fn wake_on_lan(&self, mac: &str) -> Result<WakeOnLanReply> {
        self.post("/network/wol", &WakeRequest { mac }).await
    }

    pub async fn run_speed_test(&self) -> Result<SpeedTestResult> {
        self.get("/network/speedtest").await
    }

    pub async fn ping(&self, target: &str) -> Result<PingResult> {
        self.get_with_query("/network/ping", &[("target", target)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: serde_json::Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_failure_carries_server_message() {
        let err = envelope(json!({"success": false, "error": "timeout"}))
            .into_result::<serde_json::Value>()
            .unwrap_err();
        assert_eq!(err.to_string(), "timeout");
    }

    #[test]
    fn test_failure_ignores_malformed_data() {
        let err = envelope(json!({"success": false, "data": 42, "error": "nope"}))
            .into_result::<Vec<String>>()
            .unwrap_err();
        assert!(matches!(err, ScanBoxError::Api(ref m) if m == "nope"));
    }

    #[test]
    fn test_missing_message_and_data() {
        let err = envelope(json!({"success": false}))
            .into_result::<u32>()
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown error");

        let err = envelope(json!({"success": true})).into_result::<u32>().unwrap_err();
        assert_eq!(err.to_string(), "Missing data");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:3000/api/");
        assert_eq!(client.url("/network/info"), "http://localhost:3000/api/network/info");
    }

    #[test]
    fn test_trust_url_encodes_mac_segment() {
        let client = ApiClient::new("http://localhost:3000/api");
        assert_eq!(
            client.trust_url("AA:BB:CC:DD:EE:FF").unwrap().as_str(),
            "http://localhost:3000/api/network/known-devices/AA:BB:CC:DD:EE:FF/trust"
        );
        assert_eq!(
            client.trust_url("aa/bb?x").unwrap().path(),
            "/api/network/known-devices/aa%2Fbb%3Fx/trust"
        );
    }
}
