//! Bulkline event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope published by dispatch runs and
//!   relayed to dashboard clients.

pub mod bus;

pub use bus::{EventBus, PlatformEvent};
