//! Bulk dispatch domain model.
//!
//! A [`DispatchJob`] is the unit of work handed to the orchestrator; each
//! recipient it contains yields exactly one [`DispatchOutcome`], and the
//! outcomes of a run fold into a single [`RunStatistics`] at completion.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lower bound of the default pacing delay, in seconds.
pub const DEFAULT_DELAY_MIN_SECS: u64 = 10;

/// Upper bound of the default pacing delay, in seconds.
pub const DEFAULT_DELAY_MAX_SECS: u64 = 30;

/// Outcome succeeded.
pub const STATUS_SUCCESS: &str = "success";
/// Outcome failed.
pub const STATUS_FAILURE: &str = "failure";

/// The gateway answered with a non-2xx status.
pub const ERROR_KIND_GATEWAY: &str = "gateway_error";
/// The request never produced a response (connect, DNS, TLS, body read).
pub const ERROR_KIND_TRANSPORT: &str = "transport_error";

// ---------------------------------------------------------------------------
// DelayRange
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` bounds, in whole seconds, for the pacing delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelayRange {
    min_secs: u64,
    max_secs: u64,
}

impl DelayRange {
    /// Build a range, rejecting `min > max`.
    pub fn new(min_secs: u64, max_secs: u64) -> Result<Self, CoreError> {
        if min_secs > max_secs {
            return Err(CoreError::Validation(format!(
                "delay_range minimum ({min_secs}) must not exceed maximum ({max_secs})"
            )));
        }
        Ok(Self { min_secs, max_secs })
    }

    /// A degenerate range that always yields `secs`.
    pub fn fixed(secs: u64) -> Self {
        Self {
            min_secs: secs,
            max_secs: secs,
        }
    }

    pub fn min_secs(&self) -> u64 {
        self.min_secs
    }

    pub fn max_secs(&self) -> u64 {
        self.max_secs
    }

    /// Whether `secs` lies within the inclusive bounds.
    pub fn contains(&self, secs: u64) -> bool {
        (self.min_secs..=self.max_secs).contains(&secs)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min_secs: DEFAULT_DELAY_MIN_SECS,
            max_secs: DEFAULT_DELAY_MAX_SECS,
        }
    }
}

impl TryFrom<[u64; 2]> for DelayRange {
    type Error = CoreError;

    fn try_from([min, max]: [u64; 2]) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

// ---------------------------------------------------------------------------
// DispatchJob
// ---------------------------------------------------------------------------

/// A validated bulk send request. Immutable once built.
#[derive(Debug, Clone)]
pub struct DispatchJob {
    run_id: Uuid,
    instance_id: String,
    message: String,
    recipients: Vec<String>,
    delay_range: DelayRange,
}

impl DispatchJob {
    /// Build a job with a fresh run id.
    ///
    /// Rejects an empty instance id, an empty message, an empty recipient
    /// list and blank recipient entries. Recipients are otherwise taken as
    /// given: order is preserved and duplicates are kept.
    pub fn new(
        instance_id: impl Into<String>,
        message: impl Into<String>,
        recipients: Vec<String>,
        delay_range: DelayRange,
    ) -> Result<Self, CoreError> {
        let instance_id = instance_id.into();
        let message = message.into();

        if instance_id.trim().is_empty() {
            return Err(CoreError::Validation("instance is required".to_string()));
        }
        if message.trim().is_empty() {
            return Err(CoreError::Validation("message is required".to_string()));
        }
        if recipients.is_empty() {
            return Err(CoreError::Validation(
                "at least one recipient is required".to_string(),
            ));
        }
        if let Some(pos) = recipients.iter().position(|r| r.trim().is_empty()) {
            return Err(CoreError::Validation(format!(
                "recipient at position {pos} is blank"
            )));
        }

        Ok(Self {
            run_id: Uuid::new_v4(),
            instance_id,
            message,
            recipients,
            delay_range,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn delay_range(&self) -> DelayRange {
        self.delay_range
    }

    /// Number of recipients, i.e. the number of outcomes the run produces.
    pub fn total(&self) -> usize {
        self.recipients.len()
    }
}

// ---------------------------------------------------------------------------
// Status and error
// ---------------------------------------------------------------------------

/// Result of a single send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Success,
    Failure,
}

impl DispatchStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => STATUS_SUCCESS,
            Self::Failure => STATUS_FAILURE,
        }
    }

    /// Parse from a string, returning an error for unknown statuses.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_SUCCESS => Ok(Self::Success),
            STATUS_FAILURE => Ok(Self::Failure),
            other => Err(CoreError::Validation(format!(
                "Unknown dispatch status: '{other}'"
            ))),
        }
    }
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchErrorKind {
    GatewayError,
    TransportError,
}

impl DispatchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GatewayError => ERROR_KIND_GATEWAY,
            Self::TransportError => ERROR_KIND_TRANSPORT,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            ERROR_KIND_GATEWAY => Ok(Self::GatewayError),
            ERROR_KIND_TRANSPORT => Ok(Self::TransportError),
            other => Err(CoreError::Validation(format!(
                "Unknown dispatch error kind: '{other}'"
            ))),
        }
    }
}

/// Why a send failed: a category plus the human-readable cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchError {
    pub kind: DispatchErrorKind,
    pub message: String,
}

impl DispatchError {
    pub fn gateway(message: impl Into<String>) -> Self {
        Self {
            kind: DispatchErrorKind::GatewayError,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: DispatchErrorKind::TransportError,
            message: message.into(),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

// ---------------------------------------------------------------------------
// DispatchOutcome
// ---------------------------------------------------------------------------

/// The recorded result of sending to one recipient.
///
/// `error` is `Some` exactly when `status` is [`DispatchStatus::Failure`];
/// use [`DispatchOutcome::success`] / [`DispatchOutcome::failure`] to keep
/// that invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub run_id: Uuid,
    pub instance_id: String,
    pub recipient: String,
    pub message: String,
    pub status: DispatchStatus,
    pub error: Option<DispatchError>,
    pub delay_secs: u64,
    /// Seconds since the run started when this outcome was recorded.
    pub elapsed_secs: f64,
}

impl DispatchOutcome {
    pub fn success(job: &DispatchJob, recipient: &str, delay_secs: u64, elapsed_secs: f64) -> Self {
        Self {
            run_id: job.run_id(),
            instance_id: job.instance_id().to_string(),
            recipient: recipient.to_string(),
            message: job.message().to_string(),
            status: DispatchStatus::Success,
            error: None,
            delay_secs,
            elapsed_secs,
        }
    }

    pub fn failure(
        job: &DispatchJob,
        recipient: &str,
        error: DispatchError,
        delay_secs: u64,
        elapsed_secs: f64,
    ) -> Self {
        Self {
            run_id: job.run_id(),
            instance_id: job.instance_id().to_string(),
            recipient: recipient.to_string(),
            message: job.message().to_string(),
            status: DispatchStatus::Failure,
            error: Some(error),
            delay_secs,
            elapsed_secs,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DispatchStatus::Success
    }
}

// ---------------------------------------------------------------------------
// RunStatistics
// ---------------------------------------------------------------------------

/// Aggregate figures for a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub total_processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    #[serde(rename = "total_elapsed_seconds")]
    pub total_elapsed_secs: f64,
    #[serde(rename = "average_seconds_per_message")]
    pub average_secs_per_message: f64,
    /// Percentage of successful sends, rounded to one decimal.
    #[serde(rename = "success_rate")]
    pub success_rate_percent: f64,
}

impl RunStatistics {
    /// Derive the statistics from the success/error counts of a run.
    ///
    /// Averages and rates are zero when nothing was processed.
    pub fn compute(success_count: usize, error_count: usize, total_elapsed_secs: f64) -> Self {
        let total_processed = success_count + error_count;
        let (average_secs_per_message, success_rate_percent) = if total_processed == 0 {
            (0.0, 0.0)
        } else {
            let total = total_processed as f64;
            (
                total_elapsed_secs / total,
                round_one_decimal(success_count as f64 / total * 100.0),
            )
        };

        Self {
            total_processed,
            success_count,
            error_count,
            total_elapsed_secs,
            average_secs_per_message,
            success_rate_percent,
        }
    }
}

/// Running success/error counters for an in-flight run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunTally {
    success_count: usize,
    error_count: usize,
}

impl RunTally {
    pub fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome.status {
            DispatchStatus::Success => self.success_count += 1,
            DispatchStatus::Failure => self.error_count += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.success_count + self.error_count
    }

    pub fn finish(self, total_elapsed_secs: f64) -> RunStatistics {
        RunStatistics::compute(self.success_count, self.error_count, total_elapsed_secs)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
