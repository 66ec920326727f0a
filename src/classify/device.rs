use once_cell::sync::Lazy;

use super::{contains_any, first_match, Rule};
use crate::constants::colors;
use crate::model::NetworkDevice;

/// ISPs whose boxes usually sit on the gateway address
const ISP_VENDORS: &[&str] = &[
    "sagemcom",
    "technicolor",
    "arcadyan",
    "orange",
    "sfr",
    "bouygues",
    "free",
];

/// Lower-cased view of a device the label rules are evaluated against
#[derive(Debug, Clone)]
pub struct DeviceFacts {
    pub vendor: String,
    pub hostname: String,
    pub ip: String,
    pub is_server: bool,
}

impl DeviceFacts {
    pub fn of(device: &NetworkDevice) -> Self {
        Self {
            vendor: device.vendor.as_deref().unwrap_or_default().to_lowercase(),
            hostname: device.hostname.as_deref().unwrap_or_default().to_lowercase(),
            ip: device.ip.clone(),
            is_server: device.is_server,
        }
    }

    /// Boxes are usually reachable on `.254` or `.1`
    fn on_gateway_address(&self) -> bool {
        self.ip.ends_with(".254") || self.ip.ends_with(".1")
    }
}

/// Facts the icon and color rules look at: the computed label plus the raw vendor
#[derive(Debug, Clone)]
pub struct BadgeFacts {
    pub label: String,
    pub vendor: String,
    pub is_server: bool,
}

impl BadgeFacts {
    pub fn of(device: &NetworkDevice) -> Self {
        Self {
            label: device_label(device).unwrap_or_default().to_lowercase(),
            vendor: device.vendor.as_deref().unwrap_or_default().to_lowercase(),
            is_server: device.is_server,
        }
    }
}

/// Label, icon and color shown for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceBadge {
    pub label: Option<&'static str>,
    pub icon: &'static str,
    pub color: &'static str,
}

pub static LABEL_RULES: Lazy<Vec<Rule<DeviceFacts, &'static str>>> = Lazy::new(|| {
    vec![
        Rule::new(
            "isp-box",
            |f: &DeviceFacts| f.on_gateway_address() && contains_any(&f.vendor, ISP_VENDORS),
            "Box Internet",
        ),
        Rule::new(
            "anonymous-gateway",
            |f: &DeviceFacts| f.on_gateway_address() && f.vendor.is_empty(),
            "Box Internet / Routeur",
        ),
        Rule::new(
            "printer-vendor",
            |f: &DeviceFacts| {
                contains_any(&f.vendor, &["canon", "epson", "brother"])
                    || (f.vendor.contains("hp")
                        && (f.vendor.contains("print") || f.hostname.contains("print")))
            },
            "Imprimante",
        ),
        Rule::new(
            "printer-hostname",
            |f: &DeviceFacts| contains_any(&f.hostname, &["printer", "print", "imprimante"]),
            "Imprimante",
        ),
        Rule::new(
            "apple-iphone",
            |f: &DeviceFacts| f.vendor.contains("apple") && f.hostname.contains("iphone"),
            "iPhone",
        ),
        Rule::new(
            "apple-ipad",
            |f: &DeviceFacts| f.vendor.contains("apple") && f.hostname.contains("ipad"),
            "iPad",
        ),
        Rule::new(
            "apple-mac",
            |f: &DeviceFacts| f.vendor.contains("apple") && f.hostname.contains("mac"),
            "Mac",
        ),
        Rule::new("apple", |f: &DeviceFacts| f.vendor.contains("apple"), "Appareil Apple"),
        Rule::new(
            "samsung-galaxy",
            |f: &DeviceFacts| {
                f.vendor.contains("samsung") && contains_any(&f.hostname, &["galaxy", "sm-"])
            },
            "Samsung Galaxy",
        ),
        Rule::new(
            "samsung-tv",
            |f: &DeviceFacts| f.vendor.contains("samsung") && f.hostname.contains("tv"),
            "Samsung TV",
        ),
        Rule::new("samsung", |f: &DeviceFacts| f.vendor.contains("samsung"), "Samsung"),
        Rule::new(
            "xiaomi",
            |f: &DeviceFacts| contains_any(&f.vendor, &["xiaomi", "redmi"]),
            "Xiaomi",
        ),
        Rule::new(
            "huawei",
            |f: &DeviceFacts| contains_any(&f.vendor, &["huawei", "honor"]),
            "Huawei",
        ),
        Rule::new("oneplus", |f: &DeviceFacts| f.vendor.contains("oneplus"), "OnePlus"),
        Rule::new("oppo", |f: &DeviceFacts| f.vendor.contains("oppo"), "OPPO"),
        Rule::new("google", |f: &DeviceFacts| f.vendor.contains("google"), "Google / Pixel"),
        Rule::new(
            "generic-pc",
            |f: &DeviceFacts| contains_any(&f.vendor, &["intel", "realtek"]),
            "PC",
        ),
        Rule::new("dell", |f: &DeviceFacts| f.vendor.contains("dell"), "PC Dell"),
        Rule::new("lenovo", |f: &DeviceFacts| f.vendor.contains("lenovo"), "PC Lenovo"),
        Rule::new(
            "asus-pc",
            |f: &DeviceFacts| f.vendor.contains("asus") && !f.vendor.contains("router"),
            "PC Asus",
        ),
        Rule::new("raspberry", |f: &DeviceFacts| f.vendor.contains("raspberry"), "Raspberry Pi"),
        Rule::new(
            "router-vendor",
            |f: &DeviceFacts| {
                contains_any(&f.vendor, &["tp-link", "netgear", "asus", "ubiquiti", "mikrotik"])
            },
            "Routeur / AP WiFi",
        ),
        Rule::new(
            "lg-tv",
            |f: &DeviceFacts| f.vendor.contains("lg") && contains_any(&f.hostname, &["tv", "lg"]),
            "LG TV",
        ),
        Rule::new(
            "amazon",
            |f: &DeviceFacts| contains_any(&f.vendor, &["amazon", "echo"]),
            "Amazon Echo / Alexa",
        ),
        Rule::new("server", |f: &DeviceFacts| f.is_server, "Serveur"),
    ]
});

pub static ICON_RULES: Lazy<Vec<Rule<BadgeFacts, &'static str>>> = Lazy::new(|| {
    vec![
        Rule::new("server", |f: &BadgeFacts| f.is_server, "server"),
        Rule::new(
            "network-gear",
            |f: &BadgeFacts| contains_any(&f.label, &["box", "routeur", "ap wifi"]),
            "wifi",
        ),
        Rule::new("printer", |f: &BadgeFacts| f.label.contains("imprimante"), "print"),
        Rule::new(
            "phone",
            |f: &BadgeFacts| {
                contains_any(
                    &f.label,
                    &["iphone", "galaxy", "xiaomi", "huawei", "oneplus", "oppo", "pixel"],
                )
            },
            "phone-portrait",
        ),
        Rule::new("tablet", |f: &BadgeFacts| f.label.contains("ipad"), "tablet-portrait"),
        Rule::new(
            "computer",
            |f: &BadgeFacts| contains_any(&f.label, &["mac", "pc", "dell", "lenovo", "asus"]),
            "desktop",
        ),
        Rule::new("board", |f: &BadgeFacts| f.label.contains("raspberry"), "hardware-chip"),
        Rule::new("tv", |f: &BadgeFacts| f.label.contains("tv"), "tv"),
        Rule::new(
            "assistant",
            |f: &BadgeFacts| contains_any(&f.label, &["echo", "alexa"]),
            "mic",
        ),
        Rule::new("apple-label", |f: &BadgeFacts| f.label.contains("apple"), "logo-apple"),
        Rule::new("apple-vendor", |f: &BadgeFacts| f.vendor.contains("apple"), "logo-apple"),
        Rule::new(
            "phone-vendor",
            |f: &BadgeFacts| contains_any(&f.vendor, &["samsung", "xiaomi", "huawei"]),
            "phone-portrait",
        ),
        Rule::new(
            "computer-vendor",
            |f: &BadgeFacts| contains_any(&f.vendor, &["intel", "dell", "hp", "lenovo"]),
            "desktop",
        ),
    ]
});

pub static COLOR_RULES: Lazy<Vec<Rule<BadgeFacts, &'static str>>> = Lazy::new(|| {
    vec![
        Rule::new("server", |f: &BadgeFacts| f.is_server, colors::SUCCESS),
        Rule::new(
            "network-gear",
            |f: &BadgeFacts| contains_any(&f.label, &["box", "routeur"]),
            colors::WARNING,
        ),
        Rule::new("printer", |f: &BadgeFacts| f.label.contains("imprimante"), colors::ORANGE),
        Rule::new(
            "apple",
            |f: &BadgeFacts| contains_any(&f.label, &["iphone", "ipad", "apple", "mac"]),
            colors::APPLE,
        ),
    ]
});

pub const DEFAULT_ICON: &str = "hardware-chip-outline";
pub const DEFAULT_COLOR: &str = colors::PRIMARY_LIGHT;

/// Human label for a device, `None` when no rule recognises it
pub fn device_label(device: &NetworkDevice) -> Option<&'static str> {
    first_match(&LABEL_RULES, &DeviceFacts::of(device)).map(|rule| rule.outcome)
}

pub fn device_icon(device: &NetworkDevice) -> &'static str {
    first_match(&ICON_RULES, &BadgeFacts::of(device))
        .map(|rule| rule.outcome)
        .unwrap_or(DEFAULT_ICON)
}

pub fn device_color(device: &NetworkDevice) -> &'static str {
    first_match(&COLOR_RULES, &BadgeFacts::of(device))
        .map(|rule| rule.outcome)
        .unwrap_or(DEFAULT_COLOR)
}

/// Label, icon and color in one pass over the rule lists
pub fn classify_device(device: &NetworkDevice) -> DeviceBadge {
    let facts = BadgeFacts::of(device);
    DeviceBadge {
        label: device_label(device),
        icon: first_match(&ICON_RULES, &facts)
            .map(|rule| rule.outcome)
            .unwrap_or(DEFAULT_ICON),
        color: first_match(&COLOR_RULES, &facts)
            .map(|rule| rule.outcome)
            .unwrap_or(DEFAULT_COLOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(ip: &str, vendor: Option<&str>, hostname: Option<&str>) -> NetworkDevice {
        NetworkDevice {
            ip: ip.to_string(),
            vendor: vendor.map(str::to_string),
            hostname: hostname.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_gateway_precedes_vendor_rules() {
        // "Free" would otherwise fall through to no match at all
        let box_device = device("192.168.1.254", Some("Freebox SAS"), None);
        assert_eq!(device_label(&box_device), Some("Box Internet"));

        let unknown_gateway = device("10.0.0.1", None, None);
        assert_eq!(device_label(&unknown_gateway), Some("Box Internet / Routeur"));
    }

    #[test]
    fn test_gateway_address_with_other_vendor_falls_through() {
        let tplink = device("192.168.0.1", Some("TP-LINK Technologies"), None);
        assert_eq!(device_label(&tplink), Some("Routeur / AP WiFi"));
        assert_eq!(device_icon(&tplink), "wifi");
    }

    #[test]
    fn test_apple_family() {
        let phone = device("192.168.1.20", Some("Apple, Inc."), Some("Johns-iPhone"));
        let tablet = device("192.168.1.21", Some("Apple, Inc."), Some("ipad-salon"));
        let laptop = device("192.168.1.22", Some("Apple, Inc."), Some("MacBook-Pro"));
        let other = device("192.168.1.23", Some("Apple, Inc."), None);

        assert_eq!(device_label(&phone), Some("iPhone"));
        assert_eq!(device_label(&tablet), Some("iPad"));
        assert_eq!(device_label(&laptop), Some("Mac"));
        assert_eq!(device_label(&other), Some("Appareil Apple"));

        assert_eq!(device_icon(&phone), "phone-portrait");
        assert_eq!(device_icon(&tablet), "tablet-portrait");
        assert_eq!(device_icon(&laptop), "desktop");
        assert_eq!(device_icon(&other), "logo-apple");
        assert_eq!(device_color(&other), colors::APPLE);
    }

    #[test]
    fn test_hp_needs_print_hint() {
        let laptop = device("192.168.1.40", Some("HP Inc."), Some("elitebook"));
        assert_eq!(device_label(&laptop), None);
        assert_eq!(device_icon(&laptop), "desktop");

        let printer = device("192.168.1.41", Some("HP Inc."), Some("hp-printer"));
        assert_eq!(device_label(&printer), Some("Imprimante"));
        assert_eq!(device_icon(&printer), "print");
        assert_eq!(device_color(&printer), colors::ORANGE);
    }

    #[test]
    fn test_server_badge_overrides_label_based_icon() {
        let mut server = device("192.168.1.10", Some("Intel Corporate"), None);
        server.is_server = true;

        assert_eq!(device_label(&server), Some("PC"));
        assert_eq!(device_icon(&server), "server");
        assert_eq!(device_color(&server), colors::SUCCESS);
    }

    #[test]
    fn test_unknown_device_gets_defaults() {
        let unknown = device("192.168.1.77", Some("Espressif Inc."), None);
        let badge = classify_device(&unknown);
        assert_eq!(
            badge,
            DeviceBadge {
                label: None,
                icon: DEFAULT_ICON,
                color: DEFAULT_COLOR,
            }
        );
    }
}
