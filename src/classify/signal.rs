use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::colors;

/// Signal quality band of a WiFi network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalStrength {
    Faible,
    Moyen,
    Bon,
    Excellent,
}

/// Lower bound (inclusive, dBm) of each band, strongest first
const SIGNAL_BANDS: &[(i32, SignalStrength)] = &[
    (-50, SignalStrength::Excellent),
    (-60, SignalStrength::Bon),
    (-70, SignalStrength::Moyen),
];

impl SignalStrength {
    pub fn from_level(level_dbm: i32) -> Self {
        SIGNAL_BANDS
            .iter()
            .find(|(floor, _)| level_dbm >= *floor)
            .map(|(_, band)| *band)
            .unwrap_or(SignalStrength::Faible)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalStrength::Excellent => "Excellent",
            SignalStrength::Bon => "Bon",
            SignalStrength::Moyen => "Moyen",
            SignalStrength::Faible => "Faible",
        }
    }

    /// Color of the strength indicator
    pub fn color(&self) -> &'static str {
        match self {
            SignalStrength::Excellent => "#00ff88",
            SignalStrength::Bon => "#88ff00",
            SignalStrength::Moyen => "#ffcc00",
            SignalStrength::Faible => "#ff4444",
        }
    }

    /// Color of the network icon in list views
    pub fn palette_color(&self) -> &'static str {
        match self {
            SignalStrength::Excellent => colors::SUCCESS,
            SignalStrength::Bon => colors::WARNING,
            SignalStrength::Moyen => colors::ORANGE,
            SignalStrength::Faible => colors::DANGER,
        }
    }

    /// Number of lit bars, 1 to 4
    pub fn bars(&self) -> u8 {
        match self {
            SignalStrength::Excellent => 4,
            SignalStrength::Bon => 3,
            SignalStrength::Moyen => 2,
            SignalStrength::Faible => 1,
        }
    }
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Security tier derived from a capabilities descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityTier {
    Open,
    Wep,
    Wpa,
    Wpa2,
    Wpa3,
}

/// Substring tested for each tier, highest priority first
const SECURITY_MARKERS: &[(&str, SecurityTier)] = &[
    ("WPA3", SecurityTier::Wpa3),
    ("WPA2", SecurityTier::Wpa2),
    ("WPA", SecurityTier::Wpa),
    ("WEP", SecurityTier::Wep),
];

impl SecurityTier {
    pub fn from_capabilities(capabilities: &str) -> Self {
        SECURITY_MARKERS
            .iter()
            .find(|(marker, _)| capabilities.contains(*marker))
            .map(|(_, tier)| *tier)
            .unwrap_or(SecurityTier::Open)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SecurityTier::Wpa3 => "WPA3",
            SecurityTier::Wpa2 => "WPA2",
            SecurityTier::Wpa => "WPA",
            SecurityTier::Wep => "WEP",
            SecurityTier::Open => "Open",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SecurityTier::Wpa3 => "🔒",
            SecurityTier::Wpa2 => "🔐",
            SecurityTier::Wpa => "🔑",
            SecurityTier::Wep => "⚠️",
            SecurityTier::Open => "🔓",
        }
    }
}

impl fmt::Display for SecurityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lock shown in list views: anything not flagged `OPEN` counts as secured
pub fn is_secure(capabilities: &str) -> bool {
    !capabilities.contains("OPEN")
}

/// Whether a connection attempt should skip the password
pub fn connects_without_password(capabilities: &str) -> bool {
    capabilities.contains("OPEN") || !capabilities.contains("WPA")
}
