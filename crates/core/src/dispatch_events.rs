//! WebSocket message type constants for bulk dispatch runs.
//!
//! The orchestrator publishes events under these names on the event bus,
//! and the API relay forwards them verbatim as the `"type"` field of the
//! JSON frame sent to every connected dashboard.

/// One recipient has been processed (`current` of `total`).
pub const MSG_TYPE_SEND_PROGRESS: &str = "send_progress";

/// Per-recipient outcome (status, error, delay, elapsed time).
pub const MSG_TYPE_SEND_RESULT: &str = "send_result";

/// The run finished; carries the final run statistics.
pub const MSG_TYPE_SEND_COMPLETE: &str = "send_complete";

/// All dispatch message types, used by the relay to filter bus traffic.
pub const DISPATCH_MSG_TYPES: &[&str] = &[
    MSG_TYPE_SEND_PROGRESS,
    MSG_TYPE_SEND_RESULT,
    MSG_TYPE_SEND_COMPLETE,
];

/// Whether `event_type` is one of the dispatch message types.
pub fn is_dispatch_event(event_type: &str) -> bool {
    DISPATCH_MSG_TYPES.contains(&event_type)
}
