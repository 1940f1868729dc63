//! Snapshot projection.
//!
//! Flattens a [`DeviceSnapshot`] into an ordered list of
//! (attribute key, rendered value) pairs. The order is fixed: core
//! identity fields, then last-seen, then the shared device-info block,
//! then the type-specific interest list applied to each sub-list entry.
//!
//! The per-type interest lists are lookup tables of (key, accessor)
//! pairs so that supporting a new device category is a data change,
//! not a new conditional branch.

use crate::device::{
    AirPurifier, Blind, DeviceSnapshot, DeviceType, Light, Plug, Sensor, TypedAttributes,
};
use crate::render::FieldValue;

type Accessor<T> = fn(&T) -> FieldValue;

const LIGHT_FIELDS: &[(&str, Accessor<Light>)] = &[
    ("onOff", |l| FieldValue::Bool(l.on_off)),
    ("powerFactor", |l| FieldValue::Float(l.power_factor)),
    ("colorTemperature", |l| {
        FieldValue::Uint(l.color_temperature.map(u64::from))
    }),
    ("dimmer", |l| FieldValue::Uint(l.dimmer.map(u64::from))),
];

const PLUG_FIELDS: &[(&str, Accessor<Plug>)] = &[
    ("onOff", |p| FieldValue::Bool(p.on_off)),
    ("powerFactor", |p| FieldValue::Float(p.power_factor)),
    ("dimmer", |p| FieldValue::Uint(p.dimmer.map(u64::from))),
];

const BLIND_FIELDS: &[(&str, Accessor<Blind>)] = &[
    ("position", |b| FieldValue::Float(b.position)),
    ("trigger", |b| FieldValue::Float(b.trigger)),
];

const AIR_PURIFIER_FIELDS: &[(&str, Accessor<AirPurifier>)] = &[
    ("airQuality", |a| {
        FieldValue::Uint(a.air_quality.map(u64::from))
    }),
    ("controlsLocked", |a| FieldValue::Bool(a.controls_locked)),
    ("fanMode", |a| FieldValue::Uint(a.fan_mode.map(u64::from))),
    ("fanSpeed", |a| FieldValue::Uint(a.fan_speed.map(u64::from))),
    ("totalFilterLifetime", |a| {
        FieldValue::Uint(a.total_filter_lifetime.map(u64::from))
    }),
    ("filterRuntime", |a| {
        FieldValue::Uint(a.filter_runtime.map(u64::from))
    }),
    ("filterRemainingLifetime", |a| {
        FieldValue::Uint(a.filter_remaining_lifetime.map(u64::from))
    }),
    ("filterStatus", |a| {
        FieldValue::Uint(a.filter_status.map(u64::from))
    }),
    ("statusLEDs", |a| FieldValue::Bool(a.status_leds)),
    ("totalMotorRuntime", |a| {
        FieldValue::Uint(a.total_motor_runtime.map(u64::from))
    }),
];

const SENSOR_FIELDS: &[(&str, Accessor<Sensor>)] = &[
    ("sensorType", |s| FieldValue::Text(s.sensor_type.clone())),
    ("minMeasuredValue", |s| {
        FieldValue::Float(s.min_measured_value)
    }),
    ("maxMeasuredValue", |s| {
        FieldValue::Float(s.max_measured_value)
    }),
    ("minRangeValue", |s| FieldValue::Float(s.min_range_value)),
    ("maxRangeValue", |s| FieldValue::Float(s.max_range_value)),
    ("resetMinMaxMeasureValue", |s| {
        FieldValue::Bool(s.reset_min_max_measured)
    }),
    ("sensorValue", |s| FieldValue::Float(s.sensor_value)),
];

/// Flatten a snapshot into (key, rendered value) pairs in publish order.
///
/// Unknown device types project the core and device-info fields only;
/// an informational event notes the unmapped token so the mapping table
/// can be extended.
#[must_use]
pub fn project(snapshot: &DeviceSnapshot) -> Vec<(String, String)> {
    let mut out = Vec::new();

    push(&mut out, "instanceId", &FieldValue::Uint(Some(u64::from(snapshot.instance_id))));
    push(&mut out, "name", &FieldValue::Text(snapshot.name.clone()));
    push(&mut out, "alive", &FieldValue::Bool(snapshot.alive));
    push(
        &mut out,
        "otaUpdateState",
        &FieldValue::Uint(snapshot.ota_update_state.map(u64::from)),
    );
    push(
        &mut out,
        "type",
        &FieldValue::Text(Some(snapshot.device_type.topic_segment().to_string())),
    );
    push(&mut out, "lastSeen", &FieldValue::Timestamp(snapshot.last_seen));

    push(
        &mut out,
        "battery",
        &FieldValue::Uint(snapshot.info.battery.map(u64::from)),
    );
    push(
        &mut out,
        "firmwareVersion",
        &FieldValue::Text(snapshot.info.firmware_version.clone()),
    );
    push(
        &mut out,
        "modelNumber",
        &FieldValue::Text(snapshot.info.model_number.clone()),
    );
    push(
        &mut out,
        "power",
        &FieldValue::Uint(snapshot.info.power.map(u64::from)),
    );

    match &snapshot.attributes {
        TypedAttributes::Lights(list) => push_list(&mut out, list, LIGHT_FIELDS),
        TypedAttributes::Plugs(list) => push_list(&mut out, list, PLUG_FIELDS),
        TypedAttributes::Blinds(list) => push_list(&mut out, list, BLIND_FIELDS),
        TypedAttributes::AirPurifiers(list) => push_list(&mut out, list, AIR_PURIFIER_FIELDS),
        TypedAttributes::Sensors(list) => push_list(&mut out, list, SENSOR_FIELDS),
        TypedAttributes::None => {}
    }

    if let DeviceType::Unknown(raw) = &snapshot.device_type {
        tracing::info!(
            device_id = snapshot.instance_id,
            raw_type = %raw,
            "Unmapped device type, projecting core attributes only"
        );
    }

    out
}

fn push(out: &mut Vec<(String, String)>, key: &str, value: &FieldValue) {
    out.push((key.to_string(), value.render()));
}

fn push_list<T>(out: &mut Vec<(String, String)>, list: &[T], fields: &[(&str, Accessor<T>)]) {
    for entry in list {
        for (key, accessor) in fields {
            out.push(((*key).to_string(), accessor(entry).render()));
        }
    }
}
