//! Device records held by the registry

use serde::{Deserialize, Serialize};

/// Well-known device type tags
///
/// Device types are open-ended; these are only the ones the control unit
/// knows type-specific actions for.
pub mod kind {
    pub const LIGHT: &str = "light";
    pub const AC: &str = "ac";
    pub const CURTAIN: &str = "curtain";
    pub const TV: &str = "tv";
    pub const HUMIDIFIER: &str = "humidifier";
    pub const FAN: &str = "fan";
    pub const SENSOR: &str = "sensor";
}

/// Compare two type or location tags
///
/// Every lookup in the crate goes through here so matching stays
/// case-insensitive everywhere.
pub fn tags_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// A single controllable (or observable) device in the home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub location: String,

    // Light
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    // Air conditioner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<String>,

    // Curtain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,

    // TV
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<i32>,

    // Humidifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<i32>,

    // Fan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
}

fn default_status() -> String {
    "off".to_string()
}

impl Device {
    /// Create a device with status "off" and no type-specific fields
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        device_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_type: device_type.into(),
            status: default_status(),
            location: location.into(),
            brightness: None,
            color: None,
            temperature: None,
            mode: None,
            fan_speed: None,
            position: None,
            volume: None,
            channel: None,
            humidity: None,
            speed: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Whether this device carries the given type tag
    pub fn is_type(&self, device_type: &str) -> bool {
        tags_match(&self.device_type, device_type)
    }

    /// Whether this device sits in the given room
    pub fn is_in(&self, location: &str) -> bool {
        tags_match(&self.location, location)
    }

    /// One-line human readable summary of the device state
    pub fn summary(&self) -> String {
        let mut s = format!(
            "{} [{}] {} @ {} - {}",
            self.id, self.device_type, self.name, self.location, self.status
        );
        let extras = [
            ("brightness", self.brightness.map(|v| v.to_string())),
            ("color", self.color.clone()),
            ("temperature", self.temperature.map(|v| v.to_string())),
            ("mode", self.mode.clone()),
            ("fan_speed", self.fan_speed.clone()),
            ("position", self.position.map(|v| v.to_string())),
            ("volume", self.volume.map(|v| v.to_string())),
            ("channel", self.channel.map(|v| v.to_string())),
            ("humidity", self.humidity.map(|v| v.to_string())),
            ("speed", self.speed.clone()),
        ];
        for (label, value) in extras {
            if let Some(value) = value {
                s.push_str(&format!(", {}={}", label, value));
            }
        }
        s
    }
}
