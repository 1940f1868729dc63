//! Typed device model.
//!
//! A [`DeviceSnapshot`] is a point-in-time view of one accessory as
//! reported by the gateway, already normalized by the gateway crate
//! (buggy firmware representations fixed, numeric IPSO keys resolved).
//! All attribute fields are optional; absence renders as the empty
//! string downstream.

/// Accessory categories reported by the gateway.
///
/// The numeric codes are the ones the gateway puts in IPSO key `5750`.
/// Codes without a known mapping are carried verbatim so new device
/// categories still get a topic, just without type-specific attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceType {
    /// Handheld remote control (code 0)
    Remote,
    /// Secondary remote paired to another remote (code 1)
    SlaveRemote,
    /// Light bulb or driver (code 2)
    Lightbulb,
    /// Smart plug (code 3)
    Plug,
    /// Motion sensor (code 4)
    MotionSensor,
    /// Signal repeater (code 6)
    SignalRepeater,
    /// Roller blind (code 7)
    Blind,
    /// Sound remote / Symfonisk controller (code 8)
    SoundRemote,
    /// Air purifier (code 10)
    AirPurifier,
    /// Unmapped category, raw token preserved
    Unknown(String),
}

impl DeviceType {
    /// Resolve a gateway type code to a device type.
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Remote,
            1 => Self::SlaveRemote,
            2 => Self::Lightbulb,
            3 => Self::Plug,
            4 => Self::MotionSensor,
            6 => Self::SignalRepeater,
            7 => Self::Blind,
            8 => Self::SoundRemote,
            10 => Self::AirPurifier,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The topic path segment for this device type.
    ///
    /// Known types map to a fixed human-readable token; unknown types
    /// fall back to their raw form.
    #[must_use]
    pub fn topic_segment(&self) -> &str {
        match self {
            Self::Remote => "remote",
            Self::SlaveRemote => "slaveRemote",
            Self::Lightbulb => "lightbulb",
            Self::Plug => "plug",
            Self::MotionSensor => "motionSensor",
            Self::SignalRepeater => "signalRepeater",
            Self::Blind => "blind",
            Self::SoundRemote => "soundRemote",
            Self::AirPurifier => "airPurifier",
            Self::Unknown(raw) => raw,
        }
    }
}

/// Shared device information block (IPSO object `3`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceInfo {
    /// Battery level in percent
    pub battery: Option<u32>,
    /// Firmware version string
    pub firmware_version: Option<String>,
    /// Model number string
    pub model_number: Option<String>,
    /// Power source code
    pub power: Option<u32>,
}

/// Light attributes (IPSO object `3311`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Light {
    /// On/off state
    pub on_off: Option<bool>,
    /// Power factor
    pub power_factor: Option<f64>,
    /// Color temperature in mireds
    pub color_temperature: Option<u32>,
    /// Dimmer level (0-254)
    pub dimmer: Option<u32>,
}

/// Smart plug attributes (IPSO object `3312`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plug {
    /// On/off state
    pub on_off: Option<bool>,
    /// Power factor
    pub power_factor: Option<f64>,
    /// Dimmer level, present on dimmable plugs
    pub dimmer: Option<u32>,
}

/// Blind attributes (IPSO object `15015`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blind {
    /// Current position in percent (0 = open, 100 = closed)
    pub position: Option<f64>,
    /// Trigger value
    pub trigger: Option<f64>,
}

/// Air purifier attributes (IPSO object `15025`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirPurifier {
    /// Measured air quality (PM2.5)
    pub air_quality: Option<u32>,
    /// Whether the physical controls are locked
    pub controls_locked: Option<bool>,
    /// Fan mode (0 = off, 1 = auto, 10-50 = manual levels)
    pub fan_mode: Option<u32>,
    /// Current fan speed
    pub fan_speed: Option<u32>,
    /// Total filter lifetime in minutes
    pub total_filter_lifetime: Option<u32>,
    /// Current filter runtime in minutes
    pub filter_runtime: Option<u32>,
    /// Remaining filter lifetime in minutes
    pub filter_remaining_lifetime: Option<u32>,
    /// Filter status code
    pub filter_status: Option<u32>,
    /// Whether the status LEDs are enabled
    pub status_leds: Option<bool>,
    /// Total motor runtime in minutes
    pub total_motor_runtime: Option<u32>,
}

/// Sensor attributes (IPSO object `3300`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sensor {
    /// Sensor application type
    pub sensor_type: Option<String>,
    /// Minimum measured value since last reset
    pub min_measured_value: Option<f64>,
    /// Maximum measured value since last reset
    pub max_measured_value: Option<f64>,
    /// Lower bound of the measurable range
    pub min_range_value: Option<f64>,
    /// Upper bound of the measurable range
    pub max_range_value: Option<f64>,
    /// Reset flag for the min/max measured values
    pub reset_min_max_measured: Option<bool>,
    /// Last measured value
    pub sensor_value: Option<f64>,
}

/// The type-specific attribute lists of a snapshot.
///
/// The gateway reports at most one of these per accessory; the variant
/// is chosen by the accessory's type code.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedAttributes {
    /// Light sub-list
    Lights(Vec<Light>),
    /// Plug sub-list
    Plugs(Vec<Plug>),
    /// Blind sub-list
    Blinds(Vec<Blind>),
    /// Air purifier sub-list
    AirPurifiers(Vec<AirPurifier>),
    /// Sensor sub-list
    Sensors(Vec<Sensor>),
    /// No type-specific attributes (remotes, repeaters, unknown types)
    None,
}

/// Immutable point-in-time view of one accessory.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    /// Stable instance identifier assigned by the gateway
    pub instance_id: u32,
    /// Accessory category
    pub device_type: DeviceType,
    /// Human-readable name
    pub name: Option<String>,
    /// Whether the gateway currently considers the device reachable
    pub alive: Option<bool>,
    /// Firmware OTA update state code
    pub ota_update_state: Option<u32>,
    /// Last contact, seconds since the Unix epoch
    pub last_seen: Option<u64>,
    /// Shared device information block
    pub info: DeviceInfo,
    /// Type-specific attribute lists
    pub attributes: TypedAttributes,
}

/// One event on the device observation stream.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// A device was added or one of its attributes may have changed
    Updated(DeviceSnapshot),
    /// A device was unregistered from the gateway
    Removed(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_type_codes() {
        assert_eq!(DeviceType::from_code(2), DeviceType::Lightbulb);
        assert_eq!(DeviceType::from_code(3), DeviceType::Plug);
        assert_eq!(DeviceType::from_code(7), DeviceType::Blind);
        assert_eq!(DeviceType::from_code(10), DeviceType::AirPurifier);
    }

    #[test]
    fn unknown_type_code_keeps_raw_token() {
        let ty = DeviceType::from_code(99);
        assert_eq!(ty, DeviceType::Unknown("99".to_string()));
        assert_eq!(ty.topic_segment(), "99");
    }

    #[test]
    fn segments_are_stable() {
        assert_eq!(DeviceType::Lightbulb.topic_segment(), "lightbulb");
        assert_eq!(DeviceType::MotionSensor.topic_segment(), "motionSensor");
        assert_eq!(DeviceType::SlaveRemote.topic_segment(), "slaveRemote");
    }
}
