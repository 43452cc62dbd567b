//! REST API client for the messaging gateway.
//!
//! Wraps the gateway HTTP API (text sends, instance listing, connection
//! state, number checks) using [`reqwest`]. Every request carries the
//! `apikey` header from [`GatewayConfig`].

use async_trait::async_trait;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::messages::{
    CheckNumbersRequest, ConnectionStateResponse, InstanceEntry, NumberCheck, OneOrMany,
    SendReceipt, SendTextRequest,
};
use crate::MessageGateway;

/// Name of the authentication header expected by the gateway.
const API_KEY_HEADER: &str = "apikey";

/// HTTP client for the messaging gateway.
///
/// No request timeout is configured: a gateway call that never answers
/// blocks its caller until the connection drops.
pub struct GatewayApi {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayApi {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: GatewayConfig) -> Self {
        Self { client, config }
    }

    /// Send a text message.
    ///
    /// `POST /message/sendText/{instance}`. Any 2xx status is a success;
    /// the response body is returned as-is.
    pub async fn send_text_message(
        &self,
        instance: &str,
        recipient: &str,
        text: &str,
        delay_hint_secs: u64,
    ) -> Result<SendReceipt, GatewayError> {
        let body = SendTextRequest::new(recipient, text, delay_hint_secs);

        let response = self
            .client
            .post(self.url(&format!("message/sendText/{instance}")))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let status_code = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        tracing::debug!(instance, recipient, status_code, "Gateway accepted message");

        Ok(SendReceipt { status_code, body })
    }

    /// List the instances configured on the gateway.
    ///
    /// `GET /instance/fetchInstances`. A single-object or `null` answer is
    /// normalized to a list.
    pub async fn fetch_instances(&self) -> Result<Vec<InstanceEntry>, GatewayError> {
        let response = self
            .client
            .get(self.url("instance/fetchInstances"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        let entries: Option<OneOrMany<InstanceEntry>> = Self::parse_response(response).await?;
        Ok(entries.map(OneOrMany::into_vec).unwrap_or_default())
    }

    /// Fetch the connection state of one instance.
    ///
    /// `GET /instance/connectionState/{instance}`.
    pub async fn connection_state(
        &self,
        instance: &str,
    ) -> Result<ConnectionStateResponse, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("instance/connectionState/{instance}")))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Ask the gateway which numbers have an account.
    ///
    /// `POST /chat/whatsappNumbers/{instance}`.
    pub async fn check_numbers(
        &self,
        instance: &str,
        numbers: &[String],
    ) -> Result<Vec<NumberCheck>, GatewayError> {
        let response = self
            .client
            .post(self.url(&format!("chat/whatsappNumbers/{instance}")))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&CheckNumbersRequest { numbers })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GatewayError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MessageGateway for GatewayApi {
    async fn send_text(
        &self,
        instance: &str,
        recipient: &str,
        text: &str,
        delay_hint_secs: u64,
    ) -> Result<SendReceipt, GatewayError> {
        self.send_text_message(instance, recipient, text, delay_hint_secs)
            .await
    }
}
