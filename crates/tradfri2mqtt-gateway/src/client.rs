//! HTTP client for the gateway proxy.
//!
//! Talks to a CoAP-to-HTTP proxy in front of the Trådfri gateway. The
//! proxy owns device discovery and the DTLS session; this client only
//! reads the roster and individual accessories.

use crate::wire::{decode_accessory, WireError};
use reqwest::Client;
use std::time::Duration;
use tradfri2mqtt_core::DeviceSnapshot;

/// Gateway client configuration.
#[derive(Debug, Clone)]
pub struct GatewayClientConfig {
    /// Base URL of the gateway proxy (e.g., <http://localhost:8080>)
    pub base_url: String,
    /// Pre-shared key forwarded to the proxy as a bearer token
    pub psk: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GatewayClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            psk: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for gateway roster and accessory reads.
pub struct GatewayClient {
    http: Client,
    config: GatewayClientConfig,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: GatewayClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Fetch the roster of registered device instance ids (`/15001`).
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status.
    pub async fn device_ids(&self) -> Result<Vec<u32>, ClientError> {
        let url = format!("{}/15001", self.config.base_url);
        let response = self.get(&url).await?;

        response
            .json::<Vec<u32>>()
            .await
            .map_err(|e| ClientError::Body(e.to_string()))
    }

    /// Fetch and decode one accessory (`/15001/{id}`).
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, a non-success status, or a
    /// malformed accessory payload.
    pub async fn device(&self, instance_id: u32) -> Result<DeviceSnapshot, ClientError> {
        let url = format!("{}/15001/{}", self.config.base_url, instance_id);
        let response = self.get(&url).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Body(e.to_string()))?;

        Ok(decode_accessory(&body)?)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ClientError> {
        let mut request = self.http.get(url);
        if let Some(psk) = &self.config.psk {
            request = request.bearer_auth(psk);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        Ok(response)
    }
}

/// Errors for gateway client operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),
    /// Transport-level failure
    #[error("gateway request error: {0}")]
    Http(String),
    /// Gateway answered with a non-success status
    #[error("gateway returned status {0}")]
    Status(u16),
    /// Response body could not be read or parsed
    #[error("gateway response error: {0}")]
    Body(String),
    /// Accessory payload was malformed
    #[error(transparent)]
    Wire(#[from] WireError),
}
