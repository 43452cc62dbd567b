//! Wire types for the gateway HTTP API.

use serde::{Deserialize, Serialize};

/// Presence shown to the recipient while the gateway waits out the delay.
pub const PRESENCE_COMPOSING: &str = "composing";

// ---------------------------------------------------------------------------
// Text send
// ---------------------------------------------------------------------------

/// Body of `POST /message/sendText/{instance}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest<'a> {
    pub number: &'a str,
    pub options: SendOptions,
    pub text_message: TextMessage<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOptions {
    /// Presence delay in milliseconds.
    pub delay: u64,
    pub presence: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextMessage<'a> {
    pub text: &'a str,
}

impl<'a> SendTextRequest<'a> {
    pub fn new(recipient: &'a str, text: &'a str, delay_hint_secs: u64) -> Self {
        Self {
            number: recipient,
            options: SendOptions {
                delay: delay_hint_secs.saturating_mul(1000),
                presence: PRESENCE_COMPOSING,
            },
            text_message: TextMessage { text },
        }
    }
}

/// A 2xx answer to a text send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub status_code: u16,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

/// One element of the `GET /instance/fetchInstances` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceEntry {
    pub instance: InstanceInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    pub instance_name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, alias = "name")]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// The gateway answers `fetchInstances` with either a list or a single
/// object (or `null` when there is nothing configured).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// Response of `GET /instance/connectionState/{instance}`.
///
/// Older gateway versions put `state` at the top level, newer ones nest it
/// under `instance`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionStateResponse {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub instance: Option<ConnectionStateInner>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionStateInner {
    #[serde(default)]
    pub state: Option<String>,
}

impl ConnectionStateResponse {
    pub fn state(&self) -> Option<&str> {
        self.state
            .as_deref()
            .or_else(|| self.instance.as_ref().and_then(|i| i.state.as_deref()))
    }
}

// ---------------------------------------------------------------------------
// Number checks
// ---------------------------------------------------------------------------

/// Body of `POST /chat/whatsappNumbers/{instance}`.
#[derive(Debug, Serialize)]
pub struct CheckNumbersRequest<'a> {
    pub numbers: &'a [String],
}

/// One element of the number check response.
#[derive(Debug, Clone, Deserialize)]
pub struct NumberCheck {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub jid: String,
}
