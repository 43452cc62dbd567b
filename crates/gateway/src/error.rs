use bulkline_core::dispatch::DispatchError;

/// Errors from the gateway REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("gateway returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl GatewayError {
    /// Collapse into the structured failure recorded on a dispatch outcome.
    pub fn to_dispatch_error(&self) -> DispatchError {
        match self {
            Self::Request(_) => DispatchError::transport(self.to_string()),
            Self::Api { .. } => DispatchError::gateway(self.to_string()),
        }
    }
}
