/// Backend used when no configuration overrides it
pub const DEFAULT_API_BASE_URL: &str = "https://nexuserv.duckdns.org/api";

/// Application identifier sent along with mirrored scans
pub const APP_ID: &str = "scanbox";

/// Key-value entry holding the capped scan history
pub const HISTORY_KEY: &str = "scanbox_history";

/// Key-value entry holding favorite BSSIDs
pub const FAVORITES_KEY: &str = "scanbox_favorites";

/// Maximum number of scans kept in the local history
pub const LOCAL_HISTORY_CAP: usize = 50;

/// `limit` used by the history screen when reading from the server
pub const SERVER_HISTORY_LIMIT: u32 = 50;

/// Default `limit` for a bare history request
pub const DEFAULT_HISTORY_QUERY_LIMIT: u32 = 20;

/// Frequencies at or above this value belong to the 5GHz band
pub const FIVE_GHZ_THRESHOLD_MHZ: u32 = 5000;

/// Display name of a network with an empty SSID
pub const HIDDEN_SSID_LABEL: &str = "(Reseau cache)";

/// Number of networks shown when a history entry is expanded
pub const HISTORY_TOP_NETWORKS: usize = 5;

/// Defaults applied to fields missing from a native scan entry
pub const DEFAULT_LEVEL_DBM: i32 = -100;
pub const DEFAULT_FREQUENCY_MHZ: u32 = 2400;
pub const DEFAULT_CAPABILITIES: &str = "[UNKNOWN]";

/// Dark theme palette shared by the list renderers
pub mod colors {
    pub const PRIMARY_LIGHT: &str = "#60a5fa";
    pub const SUCCESS: &str = "#4ade80";
    pub const WARNING: &str = "#facc15";
    pub const DANGER: &str = "#ef4444";
    pub const ORANGE: &str = "#fb923c";
    pub const APPLE: &str = "#a78bfa";
}
