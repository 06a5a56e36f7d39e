//! HTTP client for the ledgate-service REST API.
//!
//! Lets scripts and other programs drive the light through a running gateway
//! instead of talking BLE themselves.
//!
//! # Example
//!
//! ```no_run
//! use ledgate_core::service_client::LightClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LightClient::new("http://raspberrypi.local:5000", "s3cret")?;
//!
//! client.power_on().await?;
//! client.set_color("#FF8800").await?;
//!
//! Ok(())
//! # }
//! ```

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use ledgate_types::Color;

use crate::metrics::SessionMetricsSnapshot;
use crate::session::SessionState;

/// HTTP client for the ledgate-service API.
#[derive(Clone)]
pub struct LightClient {
    client: Client,
    base_url: String,
    password: String,
}

impl std::fmt::Debug for LightClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Error type for service client operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceClientError {
    /// The service is not reachable.
    #[error("Service not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The color was rejected before sending.
    #[error(transparent)]
    InvalidColor(#[from] ledgate_types::ParseError),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Result type for service client operations.
pub type Result<T> = std::result::Result<T, ServiceClientError>;

/// Response to a power command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
}

/// Response to a color command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorResponse {
    pub status: String,
    /// The color exactly as it was sent.
    pub color: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Device session status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub state: SessionState,
    pub address: String,
    pub metrics: SessionMetricsSnapshot,
}

impl LightClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The gateway URL (e.g., "http://localhost:5000")
    /// * `password` - Sent verbatim in the `Authorization` header
    pub fn new(base_url: &str, password: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(ServiceClientError::Request)?;

        Self::with_client(base_url, password, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(
        base_url: &str,
        password: impl Into<String>,
        client: Client,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ServiceClientError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            password: password.into(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the service is reachable.
    pub async fn is_reachable(&self) -> bool {
        self.health().await.is_ok()
    }

    /// Get service health. Does not need the password.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        self.send(self.client.get(&url), &url).await
    }

    /// Get the device session status.
    pub async fn status(&self) -> Result<DeviceStatus> {
        let url = format!("{}/status", self.base_url);
        self.send(self.authorized(self.client.get(&url)), &url).await
    }

    /// Turn the light on.
    pub async fn power_on(&self) -> Result<CommandResponse> {
        let url = format!("{}/power_on", self.base_url);
        self.send(self.authorized(self.client.post(&url)), &url)
            .await
    }

    /// Turn the light off.
    pub async fn power_off(&self) -> Result<CommandResponse> {
        let url = format!("{}/power_off", self.base_url);
        self.send(self.authorized(self.client.post(&url)), &url)
            .await
    }

    /// Set the light color from a `#RRGGBB` or `#RGB` string.
    pub async fn set_color(&self, hex: &str) -> Result<ColorResponse> {
        Color::from_hex(hex)?;

        let url = format!("{}/set_color", self.base_url);
        let body = serde_json::json!({ "color": hex });
        self.send(self.authorized(self.client.post(&url)).json(&body), &url)
            .await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, self.password.as_str())
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceClientError::NotReachable {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(ServiceClientError::Request)
        } else {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());

            Err(ServiceClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
