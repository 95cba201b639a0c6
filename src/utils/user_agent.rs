//! User-agent classification for click analytics.

use std::fmt;
use woothee::parser::Parser;

/// Maximum stored length of browser and OS names.
const MAX_FAMILY_LENGTH: usize = 50;

/// Device class recorded with each click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Bot,
    Other,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "Mobile",
            DeviceType::Tablet => "Tablet",
            DeviceType::Desktop => "Desktop",
            DeviceType::Bot => "Bot",
            DeviceType::Other => "Other",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUserAgent {
    pub device_type: DeviceType,
    pub browser: Option<String>,
    pub os: Option<String>,
}

/// Classifies a user-agent string.
///
/// Returns `None` for an empty header. When woothee does not recognise the string,
/// the device class falls back to substring heuristics and browser/OS stay unknown.
pub fn parse_user_agent(ua: &str) -> Option<ParsedUserAgent> {
    let ua = ua.trim();
    if ua.is_empty() {
        return None;
    }

    let Some(result) = Parser::new().parse(ua) else {
        return Some(ParsedUserAgent {
            device_type: guess_device(ua),
            browser: None,
            os: None,
        });
    };

    let device_type = if result.category == "crawler" {
        DeviceType::Bot
    } else if is_tablet(ua, result.os) {
        DeviceType::Tablet
    } else {
        match result.category {
            "smartphone" | "mobilephone" => DeviceType::Mobile,
            "pc" => DeviceType::Desktop,
            _ => guess_device(ua),
        }
    };

    Some(ParsedUserAgent {
        device_type,
        browser: known(result.name),
        os: known(result.os),
    })
}

fn known(value: &str) -> Option<String> {
    if value.is_empty() || value == "UNKNOWN" {
        None
    } else {
        Some(value.chars().take(MAX_FAMILY_LENGTH).collect())
    }
}

// woothee reports tablets as smartphones.
fn is_tablet(ua: &str, os: &str) -> bool {
    os == "iPad"
        || ua.contains("iPad")
        || ua.contains("Tablet")
        || (ua.contains("Android") && !ua.contains("Mobile"))
}

fn guess_device(ua: &str) -> DeviceType {
    let lower = ua.to_ascii_lowercase();

    if ["bot", "crawler", "spider"].iter().any(|m| lower.contains(m)) {
        DeviceType::Bot
    } else if ua.contains("iPad") || ua.contains("Tablet") {
        DeviceType::Tablet
    } else if ua.contains("Mobile") || ua.contains("Android") {
        DeviceType::Mobile
    } else if lower.starts_with("mozilla/") {
        DeviceType::Desktop
    } else {
        DeviceType::Other
    }
}
