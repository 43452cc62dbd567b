/// Connection settings for the messaging gateway.
///
/// Loaded once at startup and handed to [`GatewayApi::new`](crate::GatewayApi::new);
/// nothing in the client reads the environment on its own.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL including scheme, without trailing slash.
    pub base_url: String,
    /// Value of the `apikey` header sent with every request.
    pub api_key: String,
}

/// A required gateway setting was missing.
#[derive(Debug, thiserror::Error)]
#[error("{0} must be set")]
pub struct MissingSetting(pub &'static str);

impl GatewayConfig {
    /// Build a config, normalizing the base URL.
    ///
    /// A bare host (`api.example.com`) is assumed to be HTTPS and trailing
    /// slashes are dropped.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        Self {
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var           | Default  |
    /// |-------------------|----------|
    /// | `GATEWAY_URL`     | required |
    /// | `GATEWAY_API_KEY` | required |
    pub fn from_env() -> Result<Self, MissingSetting> {
        let base_url = std::env::var("GATEWAY_URL").map_err(|_| MissingSetting("GATEWAY_URL"))?;
        let api_key =
            std::env::var("GATEWAY_API_KEY").map_err(|_| MissingSetting("GATEWAY_API_KEY"))?;
        Ok(Self::new(base_url, api_key))
    }
}
