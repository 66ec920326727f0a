use once_cell::sync::Lazy;

use super::{first_match, Rule};
use crate::model::{ConnectionGroup, OpenPort};

/// Remote address of the tunnel VPS the backend keeps a connection to
pub const TUNNEL_VPS_IP: &str = "207.180.204.232";

const LOOPBACK_ADDRESSES: &[&str] = &["127.0.0.1", "::1", "::ffff:127.0.0.1"];

/// Remote peer of a connection group with the local processes using it
pub struct ConnectionFacts {
    pub ip: String,
    /// Process names as reported by the backend
    pub processes: Vec<String>,
    /// The same names lowercased
    pub processes_lower: Vec<String>,
}

impl ConnectionFacts {
    pub fn of(group: &ConnectionGroup) -> Self {
        Self {
            ip: group.ip.clone(),
            processes: group.processes.clone(),
            processes_lower: group.processes.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    fn is_loopback(&self) -> bool {
        LOOPBACK_ADDRESSES.contains(&self.ip.as_str())
    }

    /// Case-sensitive match on the reported names
    fn runs(&self, needle: &str) -> bool {
        self.processes.iter().any(|p| p.contains(needle))
    }

    /// Case-insensitive match, `needle` must be lowercase
    fn has_process(&self, needle: &str) -> bool {
        self.processes_lower.iter().any(|p| p.contains(needle))
    }

    fn starts_with_any(&self, prefixes: &[&str]) -> bool {
        prefixes.iter().any(|prefix| self.ip.starts_with(*prefix))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionLabel {
    Fixed(&'static str),
    /// Rendered with the peer address appended
    LocalNetwork,
}

pub static CONNECTION_LABEL_RULES: Lazy<Vec<Rule<ConnectionFacts, ConnectionLabel>>> =
    Lazy::new(|| {
        vec![
            Rule::new(
                "local-node",
                |f: &ConnectionFacts| f.is_loopback() && f.runs("node"),
                ConnectionLabel::Fixed("Services locaux (Node.js)"),
            ),
            Rule::new(
                "localhost",
                |f: &ConnectionFacts| f.is_loopback(),
                ConnectionLabel::Fixed("Localhost"),
            ),
            Rule::new(
                "lan",
                |f: &ConnectionFacts| f.ip.starts_with("192.168."),
                ConnectionLabel::LocalNetwork,
            ),
            Rule::new(
                "google",
                |f: &ConnectionFacts| {
                    f.starts_with_any(&["2a00:1450:", "142.250.", "172.217."])
                },
                ConnectionLabel::Fixed("Google"),
            ),
            Rule::new(
                "tunnel-vps",
                |f: &ConnectionFacts| f.ip == TUNNEL_VPS_IP,
                ConnectionLabel::Fixed("VPS Contabo (NexusTunnel)"),
            ),
            Rule::new(
                "cloudflare",
                |f: &ConnectionFacts| f.starts_with_any(&["104.", "1.1.1."]),
                ConnectionLabel::Fixed("Cloudflare"),
            ),
            Rule::new(
                "web-v6",
                |f: &ConnectionFacts| f.starts_with_any(&["2607:", "2a00:", "2a03:"]),
                ConnectionLabel::Fixed("Navigation Web"),
            ),
        ]
    });

pub static CONNECTION_ICON_RULES: Lazy<Vec<Rule<ConnectionFacts, &'static str>>> =
    Lazy::new(|| {
        vec![
            Rule::new("loopback", |f: &ConnectionFacts| f.is_loopback(), "server"),
            Rule::new(
                "tunnel-vps",
                |f: &ConnectionFacts| f.ip == TUNNEL_VPS_IP,
                "cloud-upload",
            ),
            Rule::new(
                "browser",
                |f: &ConnectionFacts| f.has_process("chrome") || f.has_process("firefox"),
                "globe",
            ),
            Rule::new("editor", |f: &ConnectionFacts| f.has_process("code"), "code-slash"),
            Rule::new("node", |f: &ConnectionFacts| f.has_process("node"), "logo-nodejs"),
        ]
    });

pub const DEFAULT_CONNECTION_ICON: &str = "git-network";

/// Friendly name for the peer of a connection group, `None` for unrecognised addresses
pub fn connection_label(group: &ConnectionGroup) -> Option<String> {
    first_match(&CONNECTION_LABEL_RULES, &ConnectionFacts::of(group)).map(|rule| match rule.outcome {
        ConnectionLabel::Fixed(label) => label.to_string(),
        ConnectionLabel::LocalNetwork => format!("Reseau local ({})", group.ip),
    })
}

pub fn connection_icon(group: &ConnectionGroup) -> &'static str {
    first_match(&CONNECTION_ICON_RULES, &ConnectionFacts::of(group))
        .map(|rule| rule.outcome)
        .unwrap_or(DEFAULT_CONNECTION_ICON)
}

/// Well-known port names shown next to open ports
pub fn port_label(port: u16) -> Option<&'static str> {
    match port {
        22 => Some("SSH"),
        53 => Some("DNS"),
        80 => Some("HTTP"),
        443 => Some("HTTPS"),
        631 => Some("Imprimante"),
        3000 => Some("Cloud1"),
        3001 => Some("NexusBuild"),
        5678 => Some("N8N"),
        5679 => Some("N8N Worker"),
        8080 => Some("Proxy HTTP"),
        9090 => Some("Cockpit"),
        18955 | 51984 => Some("VS Code"),
        _ => None,
    }
}

/// Icon for an open port, chosen from the name the backend attached to it
pub fn port_icon(port: &OpenPort) -> &'static str {
    const MARKERS: &[(&str, &str)] = &[
        ("DNS", "globe"),
        ("Imprimante", "print"),
        ("HTTP", "globe"),
        ("Cloud1", "cloud"),
        ("NexusBuild", "construct"),
        ("VS Code", "code-slash"),
    ];

    port.name
        .as_deref()
        .and_then(|name| MARKERS.iter().find(|(marker, _)| name.contains(*marker)))
        .map(|(_, icon)| *icon)
        .unwrap_or("radio-button-on")
}

/// Icon for a system service, by name
pub fn service_icon(name: &str) -> &'static str {
    const MARKERS: &[(&str, &str)] = &[
        ("cloud", "cloud"),
        ("nexusbuild", "construct"),
        ("nginx", "globe"),
        ("ssh", "terminal"),
        ("docker", "cube"),
    ];

    let name = name.to_lowercase();
    MARKERS
        .iter()
        .find(|(marker, _)| name.contains(*marker))
        .map(|(_, icon)| *icon)
        .unwrap_or("server")
}
