//! Tests for `WsManager` and the event relay that feeds it.
//!
//! No HTTP upgrades happen here: connections are registered directly and
//! their outbound channels inspected.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::ws::Message;
use bulkline_api::relay::EventRelay;
use bulkline_api::ws::WsManager;
use bulkline_events::{EventBus, PlatformEvent};
use serde_json::json;

fn text(msg: &Message) -> &str {
    match msg {
        Message::Text(t) => t.as_str(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Connection bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx1 = manager.add("conn-1".to_string()).await;
    let _rx2 = manager.add("conn-2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

#[tokio::test]
async fn remove_reports_how_long_the_connection_was_open() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string()).await;

    let open_for = manager.remove("conn-1").await;
    assert_matches!(open_for, Some(d) if d >= chrono::Duration::zero());

    assert!(manager.remove("conn-1").await.is_none());
}

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();

    let _rx_old = manager.add("conn-1".to_string()).await;
    let mut rx_new = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.broadcast(Message::Text("replaced".into())).await;
    let msg = rx_new.recv().await.expect("new rx should receive message");
    assert_eq!(text(&msg), "replaced");
}

// ---------------------------------------------------------------------------
// Broadcast / shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_reaches_open_connections_and_skips_closed_ones() {
    let manager = WsManager::new();

    let rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;
    let mut rx3 = manager.add("conn-3".to_string()).await;
    drop(rx1);

    let delivered = manager.broadcast(Message::Text("hello".into())).await;

    assert_eq!(delivered, 2);
    assert_eq!(text(&rx2.recv().await.unwrap()), "hello");
    assert_eq!(text(&rx3.recv().await.unwrap()), "hello");
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert_matches!(rx1.recv().await, Some(Message::Close(None)));
    assert_matches!(rx2.recv().await, Some(Message::Close(None)));
    assert!(
        rx1.recv().await.is_none(),
        "channel should be closed after shutdown"
    );
}

#[tokio::test]
async fn ping_all_sends_ping_frames() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.ping_all().await;

    assert_matches!(rx.recv().await, Some(Message::Ping(_)));
}

// ---------------------------------------------------------------------------
// EventRelay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relay_forwards_dispatch_events_and_stops_when_bus_closes() {
    let manager = Arc::new(WsManager::new());
    let mut rx = manager.add("dashboard".to_string()).await;

    let bus = EventBus::default();
    let relay = tokio::spawn(EventRelay::new(Arc::clone(&manager)).run(bus.subscribe()));

    bus.publish(PlatformEvent::new("template_created"));
    bus.publish(
        PlatformEvent::new("send_result")
            .with_payload(json!({"recipient": "5511999990000", "status": "success"})),
    );
    drop(bus);

    tokio::time::timeout(Duration::from_secs(5), relay)
        .await
        .expect("relay should stop once the bus is dropped")
        .unwrap();

    // Only the dispatch event made it through.
    let msg = rx.recv().await.expect("dashboard should receive the event");
    let frame: serde_json::Value = serde_json::from_str(text(&msg)).unwrap();
    assert_eq!(frame["type"], "send_result");
    assert_eq!(frame["recipient"], "5511999990000");
    assert_eq!(frame["status"], "success");
    assert!(rx.try_recv().is_err());
}
