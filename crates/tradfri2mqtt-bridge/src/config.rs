//! Bridge configuration.

use anyhow::{bail, Context, Result};
use std::time::Duration;
use tradfri2mqtt_core::DEFAULT_TOPIC_PREFIX;

/// Bridge configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// MQTT broker settings
    pub mqtt: MqttConfig,

    /// Gateway proxy settings
    pub gateway: GatewayConfig,

    /// Topic prefix for published attributes
    pub topic_prefix: String,

    /// Gateway poll interval
    pub poll_interval: Duration,
}

/// MQTT broker settings.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    /// Broker address (host, host:port, or tcp:// URL)
    pub address: String,

    /// Username, paired with `password`
    pub username: Option<String>,

    /// Password, paired with `username`
    pub password: Option<String>,
}

/// Gateway proxy settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway proxy
    pub url: String,

    /// Pre-shared key forwarded to the proxy
    pub psk: Option<String>,
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MQTT_ADDRESS`: broker address (required)
    /// - `MQTT_USER` / `MQTT_PASSWORD`: broker credentials (optional pair)
    /// - `TRADFRI_GATEWAY`: gateway proxy base URL (required)
    /// - `TRADFRI_PSK`: pre-shared key for the proxy (optional)
    /// - `TRADFRI_TOPIC_PREFIX`: topic prefix (default: "tradfri")
    /// - `TRADFRI_POLL_INTERVAL_SECS`: poll interval (default: 30)
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or empty, if the
    /// credentials are only half-set, or if the poll interval does not
    /// parse.
    pub fn from_env() -> Result<Self> {
        let username = optional("MQTT_USER");
        let password = optional("MQTT_PASSWORD");
        if username.is_some() != password.is_some() {
            bail!("MQTT_USER and MQTT_PASSWORD must be set together");
        }

        let poll_secs = match optional("TRADFRI_POLL_INTERVAL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("Invalid TRADFRI_POLL_INTERVAL_SECS")?,
            None => 30,
        };

        Ok(Self {
            mqtt: MqttConfig {
                address: required("MQTT_ADDRESS")?,
                username,
                password,
            },
            gateway: GatewayConfig {
                url: required("TRADFRI_GATEWAY")?,
                psk: optional("TRADFRI_PSK"),
            },
            topic_prefix: optional("TRADFRI_TOPIC_PREFIX")
                .unwrap_or_else(|| DEFAULT_TOPIC_PREFIX.to_string()),
            poll_interval: Duration::from_secs(poll_secs),
        })
    }
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("Missing parameter {key}"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
