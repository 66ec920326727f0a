use thiserror::Error;

/// Error types surfaced by the ScanBox client
#[derive(Error, Debug)]
pub enum ScanBoxError {
    /// The backend answered with `success: false`; the message is the server's own.
    #[error("{0}")]
    Api(String),

    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode Error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    #[error("WiFi scanner error: {0}")]
    Scanner(String),

    #[error("Error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScanBoxError>;

/// Failure to read back a locally persisted value
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("storage read failed: {0}")]
    Read(#[source] ScanBoxError),

    #[error("stored value is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
