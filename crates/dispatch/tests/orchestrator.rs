//! Behavioural tests for `DispatchOrchestrator`.
//!
//! The gateway and recorder are replaced with in-memory fakes; events go
//! through a real `EventBus`. Most tests run on a paused Tokio clock so the
//! pacing sleeps complete instantly and elapsed times are exact.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use bulkline_core::dispatch::{
    DelayRange, DispatchError, DispatchErrorKind, DispatchJob, DispatchOutcome, DispatchStatus,
};
use bulkline_dispatch::{DispatchOrchestrator, OutcomeRecorder, RecorderError};
use bulkline_events::{EventBus, PlatformEvent};
use bulkline_gateway::{GatewayApi, GatewayConfig, GatewayError, MessageGateway, SendReceipt};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// A send observed by the fake gateway.
#[derive(Debug, Clone)]
struct SentCall {
    recipient: String,
    delay_hint_secs: u64,
    at: Instant,
}

/// Gateway that succeeds unless a recipient is scripted to fail with a
/// given HTTP status.
#[derive(Default)]
struct ScriptedGateway {
    failures: HashMap<String, u16>,
    calls: Mutex<Vec<SentCall>>,
}

impl ScriptedGateway {
    fn failing(recipient: &str, status: u16) -> Self {
        let mut failures = HashMap::new();
        failures.insert(recipient.to_string(), status);
        Self {
            failures,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<SentCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageGateway for ScriptedGateway {
    async fn send_text(
        &self,
        _instance: &str,
        recipient: &str,
        _text: &str,
        delay_hint_secs: u64,
    ) -> Result<SendReceipt, GatewayError> {
        self.calls.lock().unwrap().push(SentCall {
            recipient: recipient.to_string(),
            delay_hint_secs,
            at: Instant::now(),
        });

        match self.failures.get(recipient) {
            Some(&status) => Err(GatewayError::Api {
                status,
                body: "internal error".to_string(),
            }),
            None => Ok(SendReceipt {
                status_code: 201,
                body: "{}".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct MemoryRecorder {
    outcomes: Mutex<Vec<DispatchOutcome>>,
}

impl MemoryRecorder {
    fn outcomes(&self) -> Vec<DispatchOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutcomeRecorder for MemoryRecorder {
    async fn append(&self, outcome: &DispatchOutcome) -> Result<(), RecorderError> {
        self.outcomes.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}

/// Recorder whose storage is always down.
struct BrokenRecorder;

#[async_trait]
impl OutcomeRecorder for BrokenRecorder {
    async fn append(&self, _outcome: &DispatchOutcome) -> Result<(), RecorderError> {
        Err(RecorderError::Database(sqlx::Error::PoolClosed))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    gateway: Arc<ScriptedGateway>,
    recorder: Arc<MemoryRecorder>,
    bus: Arc<EventBus>,
    orchestrator: Arc<DispatchOrchestrator>,
}

fn harness(gateway: ScriptedGateway) -> Harness {
    let gateway = Arc::new(gateway);
    let recorder = Arc::new(MemoryRecorder::default());
    let bus = Arc::new(EventBus::default());
    let orchestrator = Arc::new(DispatchOrchestrator::new(
        gateway.clone(),
        recorder.clone(),
        bus.clone(),
    ));
    Harness {
        gateway,
        recorder,
        bus,
        orchestrator,
    }
}

fn job(recipients: &[&str], range: DelayRange) -> DispatchJob {
    DispatchJob::new(
        "main",
        "Hello from the shop!",
        recipients.iter().map(|r| r.to_string()).collect(),
        range,
    )
    .unwrap()
}

fn numbers(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("55119999{i:05}")).collect()
}

fn drain(rx: &mut broadcast::Receiver<PlatformEvent>) -> Vec<PlatformEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn of_type<'a>(events: &'a [PlatformEvent], kind: &str) -> Vec<&'a PlatformEvent> {
    events.iter().filter(|e| e.event_type == kind).collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn all_successful_run_reports_full_statistics() {
    let h = harness(ScriptedGateway::default());
    let mut rx = h.bus.subscribe();
    let job = job(&["5511999990000", "5511999990001"], DelayRange::fixed(1));
    let run_id = job.run_id();

    let stats = h.orchestrator.run(job, CancellationToken::new()).await;

    let outcomes = h.recorder.outcomes();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == DispatchStatus::Success));
    assert_eq!(stats.success_count, 2);
    assert_eq!(stats.error_count, 0);
    assert_eq!(stats.success_rate_percent, 100.0);
    assert!((stats.total_elapsed_secs - 2.0).abs() < 0.01);
    assert!((stats.average_secs_per_message - 1.0).abs() < 0.01);

    let events = drain(&mut rx);
    let progress = of_type(&events, "send_progress");
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].payload["current"], 1);
    assert_eq!(progress[1].payload["current"], 2);
    assert_eq!(progress[1].payload["total"], 2);
    assert_eq!(progress[1].payload["recipient"], "5511999990001");

    let complete = of_type(&events, "send_complete");
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].run_id, Some(run_id));
    assert_eq!(complete[0].payload["success_count"], 2);
    assert_eq!(complete[0].payload["error_count"], 0);
    assert_eq!(complete[0].payload["success_rate"], 100.0);
    assert_eq!(complete[0].payload["interrupted"], false);
}

#[tokio::test(start_paused = true)]
async fn gateway_500_on_second_recipient_is_recorded_as_failure() {
    let h = harness(ScriptedGateway::failing("5511999990001", 500));
    let mut rx = h.bus.subscribe();
    let job = job(&["5511999990000", "5511999990001"], DelayRange::fixed(1));

    let stats = h.orchestrator.run(job, CancellationToken::new()).await;

    let outcomes = h.recorder.outcomes();
    assert_eq!(outcomes[0].status, DispatchStatus::Success);
    assert!(outcomes[0].error.is_none());
    assert_eq!(outcomes[1].status, DispatchStatus::Failure);
    assert_matches!(
        &outcomes[1].error,
        Some(DispatchError {
            kind: DispatchErrorKind::GatewayError,
            message,
        }) if message.contains("500")
    );

    assert_eq!(stats.success_count, 1);
    assert_eq!(stats.error_count, 1);
    assert_eq!(stats.success_rate_percent, 50.0);

    let events = drain(&mut rx);
    let results = of_type(&events, "send_result");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].payload["status"], "success");
    assert!(results[0].payload["error"].is_null());
    assert_eq!(results[1].payload["status"], "failure");
    assert_eq!(results[1].payload["error"]["kind"], "gateway_error");

    let complete = of_type(&events, "send_complete");
    assert_eq!(complete[0].payload["success_count"], 1);
    assert_eq!(complete[0].payload["error_count"], 1);
    assert_eq!(complete[0].payload["success_rate"], 50.0);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn one_outcome_per_recipient_in_order_despite_early_failure() {
    let recipients = numbers(5);
    let h = harness(ScriptedGateway::failing(&recipients[0], 429));
    let job = DispatchJob::new("main", "hi", recipients.clone(), DelayRange::fixed(0)).unwrap();

    let stats = h.orchestrator.run(job, CancellationToken::new()).await;

    let recorded: Vec<String> = h
        .recorder
        .outcomes()
        .into_iter()
        .map(|o| o.recipient)
        .collect();
    assert_eq!(recorded, recipients);
    assert_eq!(stats.total_processed, 5);
    assert_eq!(stats.error_count, 1);
    assert_eq!(stats.success_count + stats.error_count, stats.total_processed);
}

#[tokio::test(start_paused = true)]
async fn delays_stay_in_range_and_elapsed_never_decreases() {
    let range = DelayRange::new(0, 3).unwrap();
    let h = harness(ScriptedGateway::default());
    let job = DispatchJob::new("main", "hi", numbers(25), range).unwrap();

    h.orchestrator.run(job, CancellationToken::new()).await;

    let outcomes = h.recorder.outcomes();
    assert_eq!(outcomes.len(), 25);
    assert!(outcomes.iter().all(|o| range.contains(o.delay_secs)));
    assert!(outcomes
        .windows(2)
        .all(|pair| pair[0].elapsed_secs <= pair[1].elapsed_secs));

    // The drawn delay is also what the gateway was told.
    let hints: Vec<u64> = h.gateway.calls().iter().map(|c| c.delay_hint_secs).collect();
    let delays: Vec<u64> = outcomes.iter().map(|o| o.delay_secs).collect();
    assert_eq!(hints, delays);
}

#[tokio::test(start_paused = true)]
async fn next_send_waits_for_previous_delay() {
    let h = harness(ScriptedGateway::failing("b", 500));
    let job = job(&["a", "b", "c"], DelayRange::fixed(2));

    let stats = h.orchestrator.run(job, CancellationToken::new()).await;

    let calls = h.gateway.calls();
    assert_eq!(
        calls.iter().map(|c| c.recipient.as_str()).collect::<Vec<_>>(),
        ["a", "b", "c"]
    );
    for pair in calls.windows(2) {
        assert!(pair[1].at.duration_since(pair[0].at).as_secs_f64() >= 2.0);
    }
    // Pacing also follows the final recipient.
    assert!(stats.total_elapsed_secs >= 6.0);
}

#[tokio::test(start_paused = true)]
async fn recorder_failures_do_not_stop_the_run() {
    let gateway = Arc::new(ScriptedGateway::default());
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let orchestrator =
        DispatchOrchestrator::new(gateway.clone(), Arc::new(BrokenRecorder), bus.clone());

    let stats = orchestrator
        .run(job(&["a", "b", "c"], DelayRange::fixed(1)), CancellationToken::new())
        .await;

    assert_eq!(gateway.calls().len(), 3);
    assert_eq!(stats.total_processed, 3);
    let events = drain(&mut rx);
    assert_eq!(of_type(&events, "send_result").len(), 3);
    assert_eq!(of_type(&events, "send_complete").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn run_without_subscribers_still_completes() {
    let h = harness(ScriptedGateway::default());
    let stats = h
        .orchestrator
        .run(job(&["a", "b"], DelayRange::fixed(1)), CancellationToken::new())
        .await;
    assert_eq!(stats.total_processed, 2);
}

#[tokio::test(start_paused = true)]
async fn result_event_precedes_progress_event_for_each_recipient() {
    let h = harness(ScriptedGateway::default());
    let mut rx = h.bus.subscribe();

    h.orchestrator
        .run(job(&["a", "b"], DelayRange::fixed(0)), CancellationToken::new())
        .await;

    let kinds: Vec<String> = drain(&mut rx).into_iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        [
            "send_result",
            "send_progress",
            "send_result",
            "send_progress",
            "send_complete"
        ]
    );
}

// ---------------------------------------------------------------------------
// Spawned runs
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn spawn_returns_before_any_recipient_is_processed() {
    let h = harness(ScriptedGateway::default());
    let job = job(&["a", "b"], DelayRange::fixed(5));
    let run_id = job.run_id();

    let handle = h.orchestrator.spawn(job);

    assert_eq!(handle.run_id(), run_id);
    assert!(!handle.is_finished());
    assert!(h.recorder.outcomes().is_empty());

    let stats = handle.wait().await.unwrap();
    assert_eq!(stats.total_processed, 2);
    assert_eq!(h.recorder.outcomes().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_spawned_runs_at_next_pause() {
    let shutdown = CancellationToken::new();
    let gateway = Arc::new(ScriptedGateway::default());
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let orchestrator = Arc::new(
        DispatchOrchestrator::new(
            gateway.clone(),
            Arc::new(MemoryRecorder::default()),
            bus.clone(),
        )
        .with_shutdown(shutdown.clone()),
    );

    let handle = orchestrator.spawn(job(&["a", "b", "c"], DelayRange::fixed(30)));

    // Let the first recipient go through, then shut down during its pause.
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    shutdown.cancel();

    let stats = handle.wait().await.unwrap();
    assert_eq!(stats.total_processed, 1);
    assert_eq!(gateway.calls().len(), 1);

    let events = drain(&mut rx);
    let complete = of_type(&events, "send_complete");
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].payload["interrupted"], true);
    assert_eq!(complete[0].payload["total"], 3);
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_final_pause_is_not_an_interruption() {
    let shutdown = CancellationToken::new();
    let gateway = Arc::new(ScriptedGateway::default());
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let orchestrator = Arc::new(
        DispatchOrchestrator::new(
            gateway.clone(),
            Arc::new(MemoryRecorder::default()),
            bus.clone(),
        )
        .with_shutdown(shutdown.clone()),
    );

    let handle = orchestrator.spawn(job(&["a", "b"], DelayRange::fixed(30)));

    // Both sends are done by t=30; cancel inside the pause that follows "b".
    tokio::time::sleep(std::time::Duration::from_secs(45)).await;
    shutdown.cancel();

    let stats = handle.wait().await.unwrap();
    assert_eq!(stats.total_processed, 2);
    assert_eq!(gateway.calls().len(), 2);
    assert!(stats.total_elapsed_secs < 60.0);

    let events = drain(&mut rx);
    let complete = of_type(&events, "send_complete");
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].payload["interrupted"], false);
    assert_eq!(complete[0].payload["total_processed"], 2);
}

// ---------------------------------------------------------------------------
// Transport failures through the real HTTP client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_gateway_records_transport_errors_for_every_recipient() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let gateway = Arc::new(GatewayApi::new(GatewayConfig::new(
        format!("http://127.0.0.1:{port}"),
        "key",
    )));
    let recorder = Arc::new(MemoryRecorder::default());
    let orchestrator =
        DispatchOrchestrator::new(gateway, recorder.clone(), Arc::new(EventBus::default()));

    let stats = orchestrator
        .run(job(&["a", "b"], DelayRange::fixed(0)), CancellationToken::new())
        .await;

    assert_eq!(stats.error_count, 2);
    assert_eq!(stats.success_rate_percent, 0.0);
    assert!(recorder.outcomes().iter().all(|o| {
        o.error
            .as_ref()
            .is_some_and(|e| e.kind == DispatchErrorKind::TransportError)
    }));
}
