//! Instance connection status resolution.
//!
//! The gateway reports two loosely-related signals: the instance record's
//! own `status` and a separate connection `state`. The dashboard shows a
//! single status derived from both.

use serde::Serialize;

use crate::messages::InstanceInfo;

/// Status shown for an instance on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Connected,
    Connecting,
    Disconnected,
}

/// Resolved status plus the raw signals it came from.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceStatusReport {
    pub status: InstanceStatus,
    pub owner: Option<String>,
    pub profile_name: Option<String>,
    pub connection_state: String,
    pub instance_status: String,
}

/// Resolve the dashboard status.
///
/// The instance record wins when it says `open` or `connecting`; otherwise
/// a `connected` connection state still counts as connected.
pub fn resolve_status(instance_status: &str, connection_state: &str) -> InstanceStatus {
    if instance_status.eq_ignore_ascii_case("open") {
        InstanceStatus::Connected
    } else if instance_status.eq_ignore_ascii_case("connecting") {
        InstanceStatus::Connecting
    } else if connection_state.eq_ignore_ascii_case("connected") {
        InstanceStatus::Connected
    } else {
        InstanceStatus::Disconnected
    }
}

/// Build the full report for `info` given its connection state.
pub fn build_report(info: &InstanceInfo, connection_state: Option<&str>) -> InstanceStatusReport {
    let instance_status = info.status.as_deref().unwrap_or("unknown").to_uppercase();
    let connection_state = connection_state.unwrap_or("unknown").to_uppercase();

    InstanceStatusReport {
        status: resolve_status(&instance_status, &connection_state),
        owner: info.owner.clone(),
        profile_name: info.profile_name.clone(),
        connection_state,
        instance_status,
    }
}
