//! # tradfri2mqtt
//!
//! Bridge from an IKEA Trådfri lighting gateway to an MQTT broker.
//!
//! ## Architecture
//!
//! 1. **Observation**: the gateway crate polls the gateway proxy and
//!    emits typed device events over a channel
//! 2. **Projection**: each snapshot is flattened into an ordered list
//!    of (attribute key, rendered value) pairs
//! 3. **Publishing**: values that differ from the last published one go
//!    to the broker under `{prefix}/{type}/{id}/{key}`
//!
//! The bridge is publish-only; it never subscribes to broker topics and
//! never writes state back to devices.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod bridge;
mod config;
mod mqtt;
mod publisher;

use bridge::Bridge;
use config::BridgeConfig;
use mqtt::MqttSink;
use publisher::{ChangePublisher, LogReporter};
use tradfri2mqtt_core::TopicScheme;
use tradfri2mqtt_gateway::{GatewayClient, GatewayClientConfig, GatewayObserver};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting tradfri2mqtt"
    );

    let config = BridgeConfig::from_env()?;

    let (sink, mut eventloop) = MqttSink::connect(&config.mqtt).context("MQTT setup failed")?;
    let broker = sink.clone();
    tracing::info!(address = %config.mqtt.address, "Connecting to MQTT broker");

    // The event loop must be pumped for the client to make progress.
    tokio::spawn(async move {
        loop {
            if let Err(e) = eventloop.poll().await {
                tracing::error!(error = %e, "MQTT connection error");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        }
    });

    let gateway = GatewayClient::new(GatewayClientConfig {
        base_url: config.gateway.url.clone(),
        psk: config.gateway.psk.clone(),
        timeout: config.poll_interval,
    })
    .context("Gateway client setup failed")?;

    tracing::info!(
        gateway = %config.gateway.url,
        poll_interval_secs = config.poll_interval.as_secs(),
        "Observing gateway devices"
    );
    let events = GatewayObserver::new(gateway, config.poll_interval).start();

    let mut bridge = Bridge::new(
        TopicScheme::new(config.topic_prefix),
        ChangePublisher::new(sink, LogReporter),
    );

    tokio::select! {
        () = bridge.run(events) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    // Two-phase shutdown: the select above dropped the event stream,
    // which stops observation; then close the broker side.
    if let Err(e) = broker.disconnect().await {
        tracing::warn!(error = %e, "MQTT disconnect failed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
