//! Device control unit - applies a single action to a single device
//!
//! Actions arrive as free-form verbs from the NLU side. They are parsed into
//! [`ControlAction`] once; anything unrecognized becomes
//! [`ControlAction::Unsupported`] and degrades to a logged no-op so a
//! misheard verb never aborts the command.

use std::fmt;

use crate::core::types::Parameter;

use super::model::{kind, Device};

/// Actions the control unit knows how to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    TurnOn,
    TurnOff,
    SetBrightness,
    SetColor,
    SetTemperature,
    SetMode,
    SetFanSpeed,
    SetPosition,
    Open,
    Close,
    SetVolume,
    SetChannel,
    SetHumidity,
    SetSpeed,
    /// A verb nobody taught us; kept for logging
    Unsupported(String),
}

impl ControlAction {
    /// Parse a control-vocabulary verb (`turn_on`, `set_volume`, ...)
    pub fn parse(verb: &str) -> Self {
        match verb.trim().to_lowercase().as_str() {
            "turn_on" => Self::TurnOn,
            "turn_off" => Self::TurnOff,
            "set_brightness" => Self::SetBrightness,
            "set_color" => Self::SetColor,
            "set_temperature" => Self::SetTemperature,
            "set_mode" => Self::SetMode,
            "set_fan_speed" => Self::SetFanSpeed,
            "set_position" => Self::SetPosition,
            "open" | "open_curtain" => Self::Open,
            "close" | "close_curtain" => Self::Close,
            "set_volume" => Self::SetVolume,
            "set_channel" => Self::SetChannel,
            "set_humidity" => Self::SetHumidity,
            "set_speed" => Self::SetSpeed,
            _ => Self::Unsupported(verb.to_string()),
        }
    }

    /// Translate an NLU verb (`TURN_ON`, `SET_VOLUME`, ...) into a control action
    pub fn from_nlu(verb: &str) -> Self {
        match verb.trim() {
            "TURN_ON" => Self::TurnOn,
            "TURN_OFF" => Self::TurnOff,
            other => Self::parse(&other.to_lowercase()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::SetBrightness => "set_brightness",
            Self::SetColor => "set_color",
            Self::SetTemperature => "set_temperature",
            Self::SetMode => "set_mode",
            Self::SetFanSpeed => "set_fan_speed",
            Self::SetPosition => "set_position",
            Self::Open => "open",
            Self::Close => "close",
            Self::SetVolume => "set_volume",
            Self::SetChannel => "set_channel",
            Self::SetHumidity => "set_humidity",
            Self::SetSpeed => "set_speed",
            Self::Unsupported(verb) => verb,
        };
        write!(f, "{}", s)
    }
}

/// What happened when an action was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The device was mutated
    Applied,
    /// Known action, but the device type or parameter shape did not fit
    Skipped,
    /// Unknown action, nothing touched
    Unsupported,
}

/// Apply an action to a device in place
pub fn apply(device: &mut Device, action: &ControlAction, parameter: &Parameter) -> ControlOutcome {
    tracing::info!(
        "Controlling device {}: action={}, parameter={}",
        device.id,
        action,
        parameter
    );

    let outcome = match action {
        ControlAction::TurnOn => {
            device.status = "on".to_string();
            ControlOutcome::Applied
        }
        ControlAction::TurnOff => {
            device.status = "off".to_string();
            ControlOutcome::Applied
        }
        ControlAction::SetBrightness => set_int(device, kind::LIGHT, parameter, |d, v| {
            d.brightness = Some(v)
        }),
        ControlAction::SetColor => set_text(device, kind::LIGHT, parameter, |d, v| {
            d.color = Some(v)
        }),
        ControlAction::SetTemperature => set_int(device, kind::AC, parameter, |d, v| {
            d.temperature = Some(v)
        }),
        ControlAction::SetMode => set_text(device, kind::AC, parameter, |d, v| d.mode = Some(v)),
        ControlAction::SetFanSpeed => set_text(device, kind::AC, parameter, |d, v| {
            d.fan_speed = Some(v)
        }),
        ControlAction::SetPosition => set_int(device, kind::CURTAIN, parameter, |d, v| {
            d.position = Some(v)
        }),
        ControlAction::Open if device.is_type(kind::CURTAIN) => {
            device.status = "open".to_string();
            device.position = Some(100);
            ControlOutcome::Applied
        }
        ControlAction::Close if device.is_type(kind::CURTAIN) => {
            device.status = "closed".to_string();
            device.position = Some(0);
            ControlOutcome::Applied
        }
        ControlAction::Open | ControlAction::Close => ControlOutcome::Skipped,
        ControlAction::SetVolume => set_int(device, kind::TV, parameter, |d, v| {
            d.volume = Some(v)
        }),
        ControlAction::SetChannel => set_int(device, kind::TV, parameter, |d, v| {
            d.channel = Some(v)
        }),
        ControlAction::SetHumidity => set_int(device, kind::HUMIDIFIER, parameter, |d, v| {
            d.humidity = Some(v)
        }),
        ControlAction::SetSpeed => set_text(device, kind::FAN, parameter, |d, v| {
            d.speed = Some(v)
        }),
        ControlAction::Unsupported(verb) => {
            tracing::warn!("Unsupported action: {}", verb);
            ControlOutcome::Unsupported
        }
    };

    if outcome == ControlOutcome::Skipped {
        tracing::debug!(
            "Action {} not applicable to {} ({}) with parameter {}",
            action,
            device.id,
            device.device_type,
            parameter
        );
    }
    outcome
}

fn set_int(
    device: &mut Device,
    required_type: &str,
    parameter: &Parameter,
    set: impl FnOnce(&mut Device, i32),
) -> ControlOutcome {
    if !device.is_type(required_type) {
        return ControlOutcome::Skipped;
    }
    match parameter.as_integer().and_then(|v| i32::try_from(v).ok()) {
        Some(value) => {
            set(device, value);
            ControlOutcome::Applied
        }
        None => ControlOutcome::Skipped,
    }
}

fn set_text(
    device: &mut Device,
    required_type: &str,
    parameter: &Parameter,
    set: impl FnOnce(&mut Device, String),
) -> ControlOutcome {
    if !device.is_type(required_type) {
        return ControlOutcome::Skipped;
    }
    match parameter.as_text() {
        Some(value) => {
            set(device, value.to_string());
            ControlOutcome::Applied
        }
        None => ControlOutcome::Skipped,
    }
}
