//! Client for the external messaging gateway.
//!
//! Wraps the gateway's HTTP API (text sends, instance listing, connection
//! state, number checks) using [`reqwest`], and exposes the
//! [`MessageGateway`] seam the dispatch engine sends through.

pub mod api;
pub mod config;
pub mod error;
pub mod messages;
pub mod status;

use async_trait::async_trait;

pub use api::GatewayApi;
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use messages::SendReceipt;

/// The single operation the dispatch engine needs from a gateway.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Send `text` to `recipient` through `instance`.
    ///
    /// `delay_hint_secs` is forwarded to the gateway as a presence
    /// ("composing") delay. Any 2xx answer is a success; everything else
    /// is a [`GatewayError`].
    async fn send_text(
        &self,
        instance: &str,
        recipient: &str,
        text: &str,
        delay_hint_secs: u64,
    ) -> Result<SendReceipt, GatewayError>;
}
