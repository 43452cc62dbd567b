//! Bulk dispatch engine.
//!
//! [`DispatchOrchestrator`] walks a [`DispatchJob`](bulkline_core::dispatch::DispatchJob)
//! one recipient at a time: it sends through a
//! [`MessageGateway`](bulkline_gateway::MessageGateway), appends the outcome
//! through an [`OutcomeRecorder`], publishes progress through an
//! [`EventEmitter`] and waits out a randomized pacing delay before moving on.

pub mod emitter;
pub mod orchestrator;
pub mod pacing;
pub mod recorder;

pub use emitter::EventEmitter;
pub use orchestrator::{DispatchHandle, DispatchOrchestrator};
pub use recorder::{OutcomeRecorder, PgOutcomeRecorder, RecorderError};
