//! # tradfri2mqtt Core
//!
//! Pure data model and decision logic for the Trådfri-to-MQTT bridge.
//!
//! This crate provides:
//! - Typed device snapshots as delivered by the gateway observer
//! - Canonical string rendering for attribute values
//! - The per-device attribute cache that gates republication
//! - The MQTT topic scheme
//! - The projector flattening a snapshot into (key, value) pairs
//!
//! Everything here is synchronous and I/O-free; the gateway and bridge
//! crates own the network edges.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod device;
pub mod project;
pub mod render;
pub mod topics;

pub use cache::{AttributeCache, CacheEntry};
pub use device::{
    AirPurifier, Blind, DeviceEvent, DeviceInfo, DeviceSnapshot, DeviceType, Light, Plug, Sensor,
    TypedAttributes,
};
pub use project::project;
pub use render::FieldValue;
pub use topics::{attribute_path, TopicScheme, DEFAULT_TOPIC_PREFIX};
