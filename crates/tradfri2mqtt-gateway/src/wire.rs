//! Accessory wire format decoding.
//!
//! The gateway reports accessories as JSON objects keyed by numeric
//! IPSO identifiers:
//!
//! ```json
//! {
//!   "9003": 65537, "9001": "Hallway", "9019": 1, "9020": 1700000000,
//!   "9054": 0, "5750": 2,
//!   "3": { "1": "TRADFRI bulb E27", "3": "2.3.095", "6": 1, "9": 87 },
//!   "3311": [ { "5850": 1, "5851": 128, "5711": 370 } ]
//! }
//! ```
//!
//! Decoding is lenient about scalar shapes (see crate docs) but strict
//! about the mandatory identity fields: an accessory without `9003`
//! (instance id) or `5750` (type) is malformed and rejected, which
//! abandons that one accessory only.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use tradfri2mqtt_core::{
    AirPurifier, Blind, DeviceInfo, DeviceSnapshot, DeviceType, Light, Plug, Sensor,
    TypedAttributes,
};

/// Errors produced while decoding an accessory payload.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WireError {
    /// Payload was not valid accessory JSON
    #[error("invalid accessory JSON: {0}")]
    Json(String),
    /// A mandatory identity field was missing
    #[error("accessory missing mandatory field {0}")]
    MissingField(&'static str),
}

/// Decode a raw accessory payload into a typed snapshot.
///
/// # Errors
///
/// Returns [`WireError`] if the payload is not valid JSON or lacks the
/// mandatory instance id / type fields.
pub fn decode_accessory(payload: &[u8]) -> Result<DeviceSnapshot, WireError> {
    let raw: RawAccessory =
        serde_json::from_slice(payload).map_err(|e| WireError::Json(e.to_string()))?;
    raw.into_snapshot()
}

#[derive(Debug, Deserialize)]
struct RawAccessory {
    #[serde(rename = "9003", default, deserialize_with = "lenient_u32")]
    instance_id: Option<u32>,
    #[serde(rename = "9001", default)]
    name: Option<String>,
    #[serde(rename = "9019", default, deserialize_with = "lenient_bool")]
    alive: Option<bool>,
    #[serde(rename = "9054", default, deserialize_with = "lenient_u32")]
    ota_update_state: Option<u32>,
    #[serde(rename = "9020", default, deserialize_with = "lenient_u64")]
    last_seen: Option<u64>,
    #[serde(rename = "5750", default, deserialize_with = "lenient_type")]
    device_type: Option<DeviceType>,
    #[serde(rename = "3", default)]
    info: Option<RawDeviceInfo>,
    #[serde(rename = "3311", default)]
    lights: Option<Vec<RawLight>>,
    #[serde(rename = "3312", default)]
    plugs: Option<Vec<RawPlug>>,
    #[serde(rename = "3300", default)]
    sensors: Option<Vec<RawSensor>>,
    #[serde(rename = "15015", default)]
    blinds: Option<Vec<RawBlind>>,
    #[serde(rename = "15025", default)]
    air_purifiers: Option<Vec<RawAirPurifier>>,
}

impl RawAccessory {
    fn into_snapshot(self) -> Result<DeviceSnapshot, WireError> {
        let instance_id = self.instance_id.ok_or(WireError::MissingField("9003"))?;
        let device_type = self.device_type.ok_or(WireError::MissingField("5750"))?;

        // Only the sub-list matching the reported type is projected;
        // anything else the payload carries is ignored.
        let attributes = match device_type {
            DeviceType::Lightbulb => TypedAttributes::Lights(convert(self.lights)),
            DeviceType::Plug => TypedAttributes::Plugs(convert(self.plugs)),
            DeviceType::Blind => TypedAttributes::Blinds(convert(self.blinds)),
            DeviceType::AirPurifier => TypedAttributes::AirPurifiers(convert(self.air_purifiers)),
            DeviceType::MotionSensor => TypedAttributes::Sensors(convert(self.sensors)),
            _ => TypedAttributes::None,
        };

        Ok(DeviceSnapshot {
            instance_id,
            device_type,
            name: self.name,
            alive: self.alive,
            ota_update_state: self.ota_update_state,
            last_seen: self.last_seen,
            info: self.info.map(RawDeviceInfo::into_info).unwrap_or_default(),
            attributes,
        })
    }
}

fn convert<R, T: From<R>>(list: Option<Vec<R>>) -> Vec<T> {
    list.unwrap_or_default().into_iter().map(T::from).collect()
}

#[derive(Debug, Deserialize)]
struct RawDeviceInfo {
    #[serde(rename = "1", default)]
    model_number: Option<String>,
    #[serde(rename = "3", default)]
    firmware_version: Option<String>,
    #[serde(rename = "6", default, deserialize_with = "lenient_u32")]
    power: Option<u32>,
    #[serde(rename = "9", default, deserialize_with = "lenient_u32")]
    battery: Option<u32>,
}

impl RawDeviceInfo {
    fn into_info(self) -> DeviceInfo {
        DeviceInfo {
            battery: self.battery,
            firmware_version: self.firmware_version,
            model_number: self.model_number,
            power: self.power,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawLight {
    #[serde(rename = "5850", default, deserialize_with = "lenient_bool")]
    on_off: Option<bool>,
    #[serde(rename = "5820", default, deserialize_with = "lenient_f64")]
    power_factor: Option<f64>,
    #[serde(rename = "5711", default, deserialize_with = "lenient_u32")]
    color_temperature: Option<u32>,
    #[serde(rename = "5851", default, deserialize_with = "lenient_u32")]
    dimmer: Option<u32>,
}

impl From<RawLight> for Light {
    fn from(raw: RawLight) -> Self {
        Self {
            on_off: raw.on_off,
            power_factor: raw.power_factor,
            color_temperature: raw.color_temperature,
            dimmer: raw.dimmer,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPlug {
    #[serde(rename = "5850", default, deserialize_with = "lenient_bool")]
    on_off: Option<bool>,
    #[serde(rename = "5820", default, deserialize_with = "lenient_f64")]
    power_factor: Option<f64>,
    #[serde(rename = "5851", default, deserialize_with = "lenient_u32")]
    dimmer: Option<u32>,
}

impl From<RawPlug> for Plug {
    fn from(raw: RawPlug) -> Self {
        Self {
            on_off: raw.on_off,
            power_factor: raw.power_factor,
            dimmer: raw.dimmer,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBlind {
    #[serde(rename = "5536", default, deserialize_with = "lenient_f64")]
    position: Option<f64>,
    #[serde(rename = "5523", default, deserialize_with = "lenient_f64")]
    trigger: Option<f64>,
}

impl From<RawBlind> for Blind {
    fn from(raw: RawBlind) -> Self {
        Self {
            position: raw.position,
            trigger: raw.trigger,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAirPurifier {
    #[serde(rename = "5907", default, deserialize_with = "lenient_u32")]
    air_quality: Option<u32>,
    #[serde(rename = "5905", default, deserialize_with = "lenient_bool")]
    controls_locked: Option<bool>,
    #[serde(rename = "5900", default, deserialize_with = "lenient_u32")]
    fan_mode: Option<u32>,
    #[serde(rename = "5908", default, deserialize_with = "lenient_u32")]
    fan_speed: Option<u32>,
    #[serde(rename = "5904", default, deserialize_with = "lenient_u32")]
    total_filter_lifetime: Option<u32>,
    #[serde(rename = "5902", default, deserialize_with = "lenient_u32")]
    filter_runtime: Option<u32>,
    #[serde(rename = "5910", default, deserialize_with = "lenient_u32")]
    filter_remaining_lifetime: Option<u32>,
    #[serde(rename = "5903", default, deserialize_with = "lenient_u32")]
    filter_status: Option<u32>,
    #[serde(rename = "5906", default, deserialize_with = "lenient_bool")]
    status_leds: Option<bool>,
    #[serde(rename = "5909", default, deserialize_with = "lenient_u32")]
    total_motor_runtime: Option<u32>,
}

impl From<RawAirPurifier> for AirPurifier {
    fn from(raw: RawAirPurifier) -> Self {
        Self {
            air_quality: raw.air_quality,
            controls_locked: raw.controls_locked,
            fan_mode: raw.fan_mode,
            fan_speed: raw.fan_speed,
            total_filter_lifetime: raw.total_filter_lifetime,
            filter_runtime: raw.filter_runtime,
            filter_remaining_lifetime: raw.filter_remaining_lifetime,
            filter_status: raw.filter_status,
            status_leds: raw.status_leds,
            total_motor_runtime: raw.total_motor_runtime,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSensor {
    #[serde(rename = "5751", default)]
    sensor_type: Option<String>,
    #[serde(rename = "5601", default, deserialize_with = "lenient_f64")]
    min_measured_value: Option<f64>,
    #[serde(rename = "5602", default, deserialize_with = "lenient_f64")]
    max_measured_value: Option<f64>,
    #[serde(rename = "5603", default, deserialize_with = "lenient_f64")]
    min_range_value: Option<f64>,
    #[serde(rename = "5604", default, deserialize_with = "lenient_f64")]
    max_range_value: Option<f64>,
    #[serde(rename = "5605", default, deserialize_with = "lenient_bool")]
    reset_min_max_measured: Option<bool>,
    #[serde(rename = "5700", default, deserialize_with = "lenient_f64")]
    sensor_value: Option<f64>,
}

impl From<RawSensor> for Sensor {
    fn from(raw: RawSensor) -> Self {
        Self {
            sensor_type: raw.sensor_type,
            min_measured_value: raw.min_measured_value,
            max_measured_value: raw.max_measured_value,
            min_range_value: raw.min_range_value,
            max_range_value: raw.max_range_value,
            reset_min_max_measured: raw.reset_min_max_measured,
            sensor_value: raw.sensor_value,
        }
    }
}

/// One scalar as it may appear on the wire, firmware quirks included.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Flag(bool),
    Num(f64),
    Text(String),
}

fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<Option<bool>, D::Error> {
    Option::<Scalar>::deserialize(de)?
        .map(|scalar| match scalar {
            Scalar::Flag(flag) => Ok(flag),
            Scalar::Num(n) => Ok(n != 0.0),
            Scalar::Text(text) => match text.trim() {
                "1" | "true" => Ok(true),
                "0" | "false" => Ok(false),
                other => Err(D::Error::custom(format!("not a boolean: {other}"))),
            },
        })
        .transpose()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_type<'de, D: Deserializer<'de>>(de: D) -> Result<Option<DeviceType>, D::Error> {
    Ok(Option::<Scalar>::deserialize(de)?.map(|scalar| match scalar {
        Scalar::Num(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => {
            DeviceType::from_code(n as u32)
        }
        Scalar::Num(n) => DeviceType::Unknown(n.to_string()),
        Scalar::Text(text) => match text.trim().parse::<u32>() {
            Ok(code) => DeviceType::from_code(code),
            Err(_) => DeviceType::Unknown(text),
        },
        Scalar::Flag(flag) => DeviceType::Unknown(flag.to_string()),
    }))
}

fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    Option::<Scalar>::deserialize(de)?
        .map(|scalar| match scalar {
            Scalar::Num(n) => Ok(n),
            Scalar::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("not a number: {text}"))),
            Scalar::Flag(_) => Err(D::Error::custom("expected a number, got a boolean")),
        })
        .transpose()
}

fn lenient_u64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
    match lenient_f64(de)? {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(n) if n >= 0.0 => Ok(Some(n as u64)),
        Some(n) => Err(D::Error::custom(format!("negative value: {n}"))),
        None => Ok(None),
    }
}

fn lenient_u32<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u32>, D::Error> {
    match lenient_u64(de)? {
        Some(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("value out of range: {n}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_full_lightbulb() {
        let payload = br#"{
            "9003": 65537,
            "9001": "Hallway",
            "9019": 1,
            "9020": 1700000000,
            "9054": 0,
            "5750": 2,
            "3": { "1": "TRADFRI bulb E27", "3": "2.3.095", "6": 1, "9": 87 },
            "3311": [ { "5850": 1, "5851": 128, "5711": 370 } ]
        }"#;

        let snapshot = decode_accessory(payload).unwrap();
        assert_eq!(snapshot.instance_id, 65537);
        assert_eq!(snapshot.device_type, DeviceType::Lightbulb);
        assert_eq!(snapshot.name.as_deref(), Some("Hallway"));
        assert_eq!(snapshot.alive, Some(true));
        assert_eq!(snapshot.last_seen, Some(1_700_000_000));
        assert_eq!(snapshot.info.battery, Some(87));
        assert_eq!(snapshot.info.model_number.as_deref(), Some("TRADFRI bulb E27"));

        let TypedAttributes::Lights(lights) = &snapshot.attributes else {
            panic!("expected light sub-list");
        };
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].on_off, Some(true));
        assert_eq!(lights[0].dimmer, Some(128));
        assert_eq!(lights[0].color_temperature, Some(370));
    }

    #[test]
    fn decode_tolerates_stringly_numbers_and_flags() {
        let payload = br#"{
            "9003": "65538",
            "9019": true,
            "5750": "3",
            "3312": [ { "5850": "1", "5851": "50", "5820": "0.8" } ]
        }"#;

        let snapshot = decode_accessory(payload).unwrap();
        assert_eq!(snapshot.instance_id, 65538);
        assert_eq!(snapshot.device_type, DeviceType::Plug);
        assert_eq!(snapshot.alive, Some(true));

        let TypedAttributes::Plugs(plugs) = &snapshot.attributes else {
            panic!("expected plug sub-list");
        };
        assert_eq!(plugs[0].on_off, Some(true));
        assert_eq!(plugs[0].dimmer, Some(50));
        assert_eq!(plugs[0].power_factor, Some(0.8));
    }

    #[test]
    fn unknown_type_code_is_not_an_error() {
        let payload = br#"{ "9003": 3, "5750": 99 }"#;
        let snapshot = decode_accessory(payload).unwrap();
        assert_eq!(snapshot.device_type, DeviceType::Unknown("99".to_string()));
        assert_eq!(snapshot.attributes, TypedAttributes::None);
    }

    #[test]
    fn unknown_type_token_is_preserved() {
        let payload = br#"{ "9003": 3, "5750": "customType99" }"#;
        let snapshot = decode_accessory(payload).unwrap();
        assert_eq!(
            snapshot.device_type,
            DeviceType::Unknown("customType99".to_string())
        );
    }

    #[test]
    fn missing_instance_id_is_rejected() {
        let payload = br#"{ "9001": "nameless", "5750": 2 }"#;
        let err = decode_accessory(payload).unwrap_err();
        assert!(matches!(err, WireError::MissingField("9003")));
    }

    #[test]
    fn missing_type_is_rejected() {
        let payload = br#"{ "9003": 1 }"#;
        let err = decode_accessory(payload).unwrap_err();
        assert!(matches!(err, WireError::MissingField("5750")));
    }

    #[test]
    fn sublist_not_matching_type_is_ignored() {
        // Type says remote; a stray light sub-list must not leak through.
        let payload = br#"{ "9003": 4, "5750": 0, "3311": [ { "5850": 1 } ] }"#;
        let snapshot = decode_accessory(payload).unwrap();
        assert_eq!(snapshot.attributes, TypedAttributes::None);
    }

    #[test]
    fn garbage_payload_is_a_json_error() {
        let err = decode_accessory(b"not json").unwrap_err();
        assert!(matches!(err, WireError::Json(_)));
    }
}
