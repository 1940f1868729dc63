//! # Trådfri Gateway Adapter
//!
//! Device observation stream for the Trådfri gateway, consumed through
//! a CoAP-to-HTTP proxy that owns the DTLS session.
//!
//! ## Observation Model
//!
//! The gateway exposes the device roster at `/15001` and each accessory
//! at `/15001/{id}`, as JSON objects keyed by numeric IPSO identifiers.
//! The adapter polls the roster, decodes every accessory into a typed
//! [`tradfri2mqtt_core::DeviceSnapshot`], and emits `Updated` events for
//! present devices and `Removed` events for devices that vanished from
//! the roster. Change suppression is not this crate's job; the bridge
//! core dedupes against its attribute cache.
//!
//! ## Normalization
//!
//! Gateway firmwares are known to deliver booleans as `0`/`1` integers
//! and numbers as strings depending on version. The wire decoder
//! accepts both shapes so downstream code only ever sees typed values.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod observer;
pub mod wire;

pub use client::{ClientError, GatewayClient, GatewayClientConfig};
pub use observer::GatewayObserver;
pub use wire::{decode_accessory, WireError};
