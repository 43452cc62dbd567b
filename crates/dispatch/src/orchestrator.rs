//! Bulk dispatch orchestrator.
//!
//! One run walks a job's recipients strictly in order. For each recipient
//! it draws a pacing delay, sends through the gateway, records the outcome,
//! emits `send_result` then `send_progress`, and sleeps for the drawn delay
//! before touching the next recipient. The sleep happens after failures and
//! after the last recipient too. When the list is exhausted it emits
//! `send_complete` with the run statistics.
//!
//! Send failures, recorder failures and emitter drops never end a run. A
//! started run cannot be cancelled; only server shutdown interrupts it, at
//! its next pacing pause.

use std::sync::Arc;

use bulkline_core::dispatch::{DispatchJob, DispatchOutcome, RunStatistics, RunTally};
use bulkline_core::dispatch_events::{
    MSG_TYPE_SEND_COMPLETE, MSG_TYPE_SEND_PROGRESS, MSG_TYPE_SEND_RESULT,
};
use bulkline_gateway::MessageGateway;
use serde_json::json;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::emitter::EventEmitter;
use crate::pacing::{draw_delay, pause_for};
use crate::recorder::OutcomeRecorder;

/// Drives dispatch runs against a gateway, recorder and emitter.
///
/// Cheap to share: wrap in `Arc` and call [`spawn`](Self::spawn) per job.
pub struct DispatchOrchestrator {
    gateway: Arc<dyn MessageGateway>,
    recorder: Arc<dyn OutcomeRecorder>,
    emitter: Arc<dyn EventEmitter>,
    /// Cancelled on server shutdown.
    shutdown: CancellationToken,
}

/// Handle to a spawned run.
///
/// Dropping the handle detaches the run; it keeps going to completion.
/// The inner `JoinHandle` stays private so a run cannot be aborted
/// through its handle.
pub struct DispatchHandle {
    run_id: Uuid,
    join: JoinHandle<RunStatistics>,
}

impl DispatchHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the run to finish and return its statistics.
    pub async fn wait(self) -> Result<RunStatistics, JoinError> {
        self.join.await
    }
}

impl DispatchOrchestrator {
    pub fn new(
        gateway: Arc<dyn MessageGateway>,
        recorder: Arc<dyn OutcomeRecorder>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            gateway,
            recorder,
            emitter,
            shutdown: CancellationToken::new(),
        }
    }

    /// Tie every run to `shutdown`: cancelling it stops all runs at their
    /// next pacing pause. The in-flight send (if any) completes first.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Start a run on a background task and return immediately.
    pub fn spawn(self: &Arc<Self>, job: DispatchJob) -> DispatchHandle {
        let run_id = job.run_id();
        let orchestrator = Arc::clone(self);
        let shutdown = self.shutdown.clone();

        let join = tokio::spawn(async move { orchestrator.run(job, shutdown).await });

        DispatchHandle { run_id, join }
    }

    /// Execute a run to completion on the current task.
    ///
    /// `shutdown` is only observed during pacing pauses. Cancelling it in
    /// the pause after the last recipient cuts the pause short but does
    /// not mark the run as interrupted.
    pub async fn run(&self, job: DispatchJob, shutdown: CancellationToken) -> RunStatistics {
        let run_id = job.run_id();
        let total = job.total();
        let range = job.delay_range();
        let started = Instant::now();
        let mut tally = RunTally::default();
        let mut interrupted = false;

        tracing::info!(
            %run_id,
            instance = job.instance_id(),
            total,
            delay_min_secs = range.min_secs(),
            delay_max_secs = range.max_secs(),
            "Dispatch run started",
        );

        for (index, recipient) in job.recipients().iter().enumerate() {
            let delay_secs = draw_delay(range, &mut rand::rng());

            let outcome = self.send_one(&job, recipient, delay_secs, started).await;

            if let Err(e) = self.recorder.append(&outcome).await {
                tracing::error!(
                    %run_id,
                    recipient = %recipient,
                    error = %e,
                    "Failed to record dispatch outcome",
                );
            }
            tally.record(&outcome);

            self.emitter.emit(
                MSG_TYPE_SEND_RESULT,
                run_id,
                json!({
                    "run_id": run_id,
                    "recipient": outcome.recipient,
                    "status": outcome.status,
                    "error": outcome.error,
                    "delay": outcome.delay_secs,
                    "elapsed_seconds": outcome.elapsed_secs,
                }),
            );
            self.emitter.emit(
                MSG_TYPE_SEND_PROGRESS,
                run_id,
                json!({
                    "run_id": run_id,
                    "current": index + 1,
                    "total": total,
                    "recipient": outcome.recipient,
                    "elapsed_seconds": outcome.elapsed_secs,
                }),
            );

            tokio::select! {
                () = tokio::time::sleep(pause_for(delay_secs)) => {}
                () = shutdown.cancelled() => {
                    if tally.processed() == total {
                        break;
                    }
                    tracing::warn!(
                        %run_id,
                        processed = tally.processed(),
                        total,
                        "Dispatch run interrupted by shutdown",
                    );
                    interrupted = true;
                    break;
                }
            }
        }

        let stats = tally.finish(started.elapsed().as_secs_f64());

        tracing::info!(
            %run_id,
            total_processed = stats.total_processed,
            success_count = stats.success_count,
            error_count = stats.error_count,
            total_elapsed_secs = stats.total_elapsed_secs,
            success_rate = stats.success_rate_percent,
            "Dispatch run complete",
        );

        let mut payload = json!(stats);
        if let Some(fields) = payload.as_object_mut() {
            fields.insert("run_id".into(), json!(run_id));
            fields.insert("total".into(), json!(total));
            fields.insert("interrupted".into(), json!(interrupted));
        }
        self.emitter.emit(MSG_TYPE_SEND_COMPLETE, run_id, payload);

        stats
    }

    /// Send to one recipient and classify the result.
    async fn send_one(
        &self,
        job: &DispatchJob,
        recipient: &str,
        delay_secs: u64,
        started: Instant,
    ) -> DispatchOutcome {
        let result = self
            .gateway
            .send_text(job.instance_id(), recipient, job.message(), delay_secs)
            .await;
        let elapsed_secs = started.elapsed().as_secs_f64();

        match result {
            Ok(receipt) => {
                tracing::debug!(
                    run_id = %job.run_id(),
                    recipient,
                    status_code = receipt.status_code,
                    delay_secs,
                    "Message sent",
                );
                DispatchOutcome::success(job, recipient, delay_secs, elapsed_secs)
            }
            Err(e) => {
                let error = e.to_dispatch_error();
                tracing::warn!(
                    run_id = %job.run_id(),
                    recipient,
                    kind = error.kind.as_str(),
                    error = %e,
                    "Message send failed",
                );
                DispatchOutcome::failure(job, recipient, error, delay_secs, elapsed_secs)
            }
        }
    }
}
