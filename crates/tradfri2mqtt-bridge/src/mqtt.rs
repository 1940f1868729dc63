//! MQTT publish sink backed by rumqttc.

use crate::config::MqttConfig;
use crate::publisher::{PublishError, PublishSink};
use async_trait::async_trait;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use std::time::Duration;
use url::Url;

/// Client id announced to the broker.
pub const CLIENT_ID: &str = "tradfri2mqtt";

/// MQTT sink publishing attribute values as retained-off messages.
///
/// Cheap to clone; clones share the same connection.
#[derive(Clone)]
pub struct MqttSink {
    client: AsyncClient,
}

impl MqttSink {
    /// Create the sink and its event loop.
    ///
    /// The returned [`EventLoop`] must be polled by the caller for the
    /// connection to make progress.
    ///
    /// # Errors
    ///
    /// Returns error if the broker address cannot be parsed.
    pub fn connect(config: &MqttConfig) -> Result<(Self, EventLoop), MqttError> {
        let (host, port) = parse_mqtt_url(&config.address)?;

        let mut options = MqttOptions::new(CLIENT_ID, host, port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(user), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(user, password);
        }

        let (client, eventloop) = AsyncClient::new(options, 100);

        Ok((Self { client }, eventloop))
    }

    /// Ask the broker for a clean disconnect.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), MqttError> {
        self.client
            .disconnect()
            .await
            .map_err(|e| MqttError::Disconnect(e.to_string()))
    }
}

#[async_trait]
impl PublishSink for MqttSink {
    async fn publish(&self, topic: &str, value: &str) -> Result<(), PublishError> {
        // rumqttc does not surface the broker's packet id; the delivery
        // identifier is discarded here.
        self.client
            .publish(topic, QoS::AtLeastOnce, false, value)
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))
    }
}

/// Parse an MQTT broker address into host and port.
///
/// Accepts `tcp://` and `mqtt://` URLs as well as bare `host` or
/// `host:port` forms; the port defaults to 1883.
fn parse_mqtt_url(input: &str) -> Result<(String, u16), MqttError> {
    if input.contains("://") {
        let url = Url::parse(input)
            .map_err(|e| MqttError::InvalidBrokerUrl(format!("{input}: {e}")))?;

        match url.scheme() {
            "tcp" | "mqtt" => {}
            scheme => {
                return Err(MqttError::InvalidBrokerUrl(format!(
                    "{input}: unsupported scheme '{scheme}'"
                )));
            }
        }

        let host = url
            .host_str()
            .ok_or_else(|| MqttError::InvalidBrokerUrl(format!("{input}: missing host")))?;
        let port = url.port().unwrap_or(1883);

        return Ok((host.to_string(), port));
    }

    let mut parts = input.split(':');
    let host = parts
        .next()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| MqttError::InvalidBrokerUrl(format!("{input}: missing host")))?;
    let port = match parts.next() {
        None => 1883,
        Some(port) => port.parse().map_err(|_| {
            MqttError::InvalidBrokerUrl(format!("{input}: invalid port '{port}'"))
        })?,
    };
    if parts.next().is_some() {
        return Err(MqttError::InvalidBrokerUrl(format!(
            "{input}: too many ':' separators"
        )));
    }

    Ok((host.to_string(), port))
}

/// Errors for MQTT sink setup and teardown.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MqttError {
    /// Invalid broker address
    #[error("invalid MQTT broker address: {0}")]
    InvalidBrokerUrl(String),
    /// Disconnect request failed
    #[error("disconnect error: {0}")]
    Disconnect(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_host() {
        assert_eq!(
            parse_mqtt_url("broker.local").unwrap(),
            ("broker.local".to_string(), 1883)
        );
    }

    #[test]
    fn parses_host_and_port() {
        assert_eq!(
            parse_mqtt_url("broker.local:1884").unwrap(),
            ("broker.local".to_string(), 1884)
        );
    }

    #[test]
    fn parses_tcp_url() {
        assert_eq!(
            parse_mqtt_url("tcp://broker.local:1884").unwrap(),
            ("broker.local".to_string(), 1884)
        );
        assert_eq!(
            parse_mqtt_url("mqtt://broker.local").unwrap(),
            ("broker.local".to_string(), 1883)
        );
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(matches!(
            parse_mqtt_url("http://broker.local"),
            Err(MqttError::InvalidBrokerUrl(_))
        ));
    }

    #[test]
    fn rejects_bad_port() {
        assert!(matches!(
            parse_mqtt_url("broker.local:abc"),
            Err(MqttError::InvalidBrokerUrl(_))
        ));
        assert!(matches!(
            parse_mqtt_url("a:1:2"),
            Err(MqttError::InvalidBrokerUrl(_))
        ));
    }
}
