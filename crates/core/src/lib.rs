//! Domain types shared by every bulkline crate.
//!
//! Nothing in here performs I/O: the dispatch model, error type, input
//! validators and the WebSocket message-type names live here so the
//! gateway, database, dispatch and API crates agree on them.

pub mod dispatch;
pub mod dispatch_events;
pub mod error;
pub mod templates;
pub mod types;
