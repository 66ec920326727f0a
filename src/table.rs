use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use time::OffsetDateTime;

use crate::classify::connection::{connection_icon, connection_label, port_icon, port_label, service_icon};
use crate::classify::signal::{SecurityTier, SignalStrength};
use crate::model::{ConnectionsReport, PortsReport, ServicesReport, WifiNetwork};
use crate::view::devices::DeviceRow;
use crate::view::history::{format_clock, format_relative, HistorySummary};

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(header);
    table
}

/// `#rrggbb` to a terminal color, white when malformed
fn hex_color(hex: &str) -> Color {
    let channel = |range: std::ops::Range<usize>| {
        hex.trim_start_matches('#')
            .get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb { r, g, b },
        _ => Color::White,
    }
}

pub fn networks_table(networks: &[WifiNetwork], favorites: &[String]) -> Table {
    let mut table = table(vec!["", "SSID", "BSSID", "Signal", "Band", "Security"]);

    for n in networks {
        let strength = SignalStrength::from_level(n.level);
        let tier = SecurityTier::from_capabilities(&n.capabilities);
        let star = if favorites.iter().any(|f| *f == n.bssid) { "★" } else { "" };

        table.add_row(vec![
            Cell::new(star),
            Cell::new(n.display_ssid()).add_attribute(Attribute::Bold),
            Cell::new(&n.bssid),
            Cell::new(format!(
                "{} dBm {} {}",
                n.level,
                "▮".repeat(strength.bars() as usize),
                strength
            ))
            .fg(hex_color(strength.palette_color())),
            Cell::new(n.band()),
            Cell::new(format!("{} {}", tier.icon(), tier)),
        ]);
    }
    table
}

pub fn devices_table(rows: &[DeviceRow]) -> Table {
    let mut table = table(vec!["Name", "IP", "MAC", "Vendor", "Icon", "Status"]);

    for row in rows {
        let d = &row.device;
        let mut status = Vec::new();
        if d.is_server {
            status.push("server");
        }
        if d.is_new == Some(true) {
            status.push("new");
        }
        match d.trusted {
            Some(true) => status.push("trusted"),
            Some(false) => status.push("untrusted"),
            None => {}
        }

        table.add_row(vec![
            Cell::new(row.title())
                .fg(hex_color(row.badge.color))
                .add_attribute(Attribute::Bold),
            Cell::new(&d.ip),
            Cell::new(d.mac.as_deref().unwrap_or("-")),
            Cell::new(d.vendor.as_deref().unwrap_or("-")),
            Cell::new(row.badge.icon),
            Cell::new(status.join(", ")),
        ]);
    }
    table
}

pub fn services_table(report: &ServicesReport) -> Table {
    let mut table = table(vec!["Service", "Icon", "Status"]);
    for s in &report.services {
        let color = if s.active { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(service_icon(&s.name)),
            Cell::new(&s.status).fg(color),
        ]);
    }
    table
}

pub fn ports_table(report: &PortsReport) -> Table {
    let mut table = table(vec!["Port", "Name", "Process", "State", "Icon"]);
    for p in &report.ports {
        let name = p
            .name
            .as_deref()
            .or_else(|| port_label(p.port))
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(p.port),
            Cell::new(name),
            Cell::new(p.process.as_deref().unwrap_or("-")),
            Cell::new(&p.state),
            Cell::new(port_icon(p)),
        ]);
    }
    table
}

pub fn connections_table(report: &ConnectionsReport) -> Table {
    let mut table = table(vec!["Remote", "Label", "Count", "Processes", "Ports", "Icon"]);
    for g in &report.groups {
        let ports: Vec<String> = g.ports.iter().map(|p| p.to_string()).collect();
        table.add_row(vec![
            Cell::new(&g.ip),
            Cell::new(connection_label(g).unwrap_or_default()),
            Cell::new(g.count),
            Cell::new(g.processes.join(", ")),
            Cell::new(ports.join(", ")),
            Cell::new(connection_icon(g)),
        ]);
    }
    table
}

/// History cards; the expanded entry lists its top networks beneath it
pub fn history_table(summaries: &[HistorySummary], expanded: Option<&str>, now: OffsetDateTime) -> Table {
    let mut table = table(vec!["Id", "Date", "Heure", "Reseaux", "5GHz"]);

    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(format_relative(s.timestamp, now)),
            Cell::new(format_clock(s.timestamp)),
            Cell::new(s.network_count),
            Cell::new(s.five_ghz_count),
        ]);

        if expanded == Some(s.id.as_str()) {
            for n in &s.top {
                let color = hex_color(SignalStrength::from_level(n.level).palette_color());
                table.add_row(vec![
                    Cell::new(""),
                    Cell::new(format!("  {}", n.display_ssid())).fg(color),
                    Cell::new(""),
                    Cell::new(n.level),
                    Cell::new(""),
                ]);
            }
            if s.more > 0 {
                table.add_row(vec![
                    Cell::new(""),
                    Cell::new(format!("  +{} autres reseaux", s.more)),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                ]);
            }
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert!(matches!(hex_color("#4ade80"), Color::Rgb { r: 0x4a, g: 0xde, b: 0x80 }));
        assert!(matches!(hex_color("nope"), Color::White));
    }

    #[test]
    fn test_networks_table_marks_hidden_and_favorites() {
        let networks = vec![WifiNetwork {
            ssid: String::new(),
            bssid: "aa:bb".to_string(),
            level: -45,
            frequency: 5180,
            capabilities: "[WPA3]".to_string(),
            timestamp: 0,
        }];
        let rendered = networks_table(&networks, &["aa:bb".to_string()]).to_string();
        assert!(rendered.contains("(Reseau cache)"));
        assert!(rendered.contains("★"));
        assert!(rendered.contains("5GHz"));
    }
}
