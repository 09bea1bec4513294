use serde_json::json;
use tokio::time::{Duration, timeout};

use super::*;

async fn recv(rx: &mut mpsc::Receiver<String>) -> String {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("message receive timed out")
        .expect("channel closed")
}

fn assert_empty(rx: &mut mpsc::Receiver<String>) {
    assert!(rx.try_recv().is_err(), "expected channel to remain empty");
}

#[tokio::test]
async fn broadcast_skips_excluded_client() {
    let state = RelayState::new();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    let (tx_c, mut rx_c) = mpsc::channel(8);
    join(&state, "c1", a, tx_a).await;
    join(&state, "c1", b, tx_b).await;
    assert_eq!(join(&state, "c1", c, tx_c).await, 3);

    assert_eq!(broadcast(&state, "c1", "hello", Some(a)).await, 2);
    assert_eq!(recv(&mut rx_b).await, "hello");
    assert_eq!(recv(&mut rx_c).await, "hello");
    assert_empty(&mut rx_a);
}

#[tokio::test]
async fn broadcast_stays_within_canvas() {
    let state = RelayState::new();
    let (tx_a, _rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    join(&state, "c1", Uuid::new_v4(), tx_a).await;
    join(&state, "c2", Uuid::new_v4(), tx_b).await;

    broadcast(&state, "c1", "hello", None).await;
    assert_empty(&mut rx_b);
}

#[tokio::test]
async fn broadcast_skips_full_and_closed_peers() {
    let state = RelayState::new();
    let (tx_full, _rx_full) = mpsc::channel(1);
    let (tx_closed, rx_closed) = mpsc::channel(8);
    let (tx_ok, mut rx_ok) = mpsc::channel(8);
    tx_full.try_send("backlog".to_owned()).expect("fill queue");
    drop(rx_closed);
    join(&state, "c1", Uuid::new_v4(), tx_full).await;
    join(&state, "c1", Uuid::new_v4(), tx_closed).await;
    join(&state, "c1", Uuid::new_v4(), tx_ok).await;

    assert_eq!(broadcast(&state, "c1", "hello", None).await, 1);
    assert_eq!(recv(&mut rx_ok).await, "hello");
}

#[tokio::test]
async fn broadcast_to_unknown_canvas_is_noop() {
    let state = RelayState::new();
    assert_eq!(broadcast(&state, "missing", "hello", None).await, 0);
}

#[tokio::test]
async fn last_part_evicts_room_without_content() {
    let state = RelayState::new();
    let client = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel(8);
    join(&state, "c1", client, tx).await;

    part(&state, "c1", client).await;
    assert!(state.canvases.read().await.get("c1").is_none());
}

#[tokio::test]
async fn last_part_keeps_stored_content() {
    let state = RelayState::new();
    let client = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel(8);
    join(&state, "c1", client, tx).await;
    save_content(&state, "c1", json!({ "objects": [], "strokes": [] })).await;

    part(&state, "c1", client).await;
    assert_eq!(load_content(&state, "c1").await, json!({ "objects": [], "strokes": [] }));
}

#[tokio::test]
async fn part_of_unknown_canvas_is_noop() {
    let state = RelayState::new();
    part(&state, "missing", Uuid::new_v4()).await;
    assert!(state.canvases.read().await.is_empty());
}

#[tokio::test]
async fn load_content_defaults_to_null() {
    let state = RelayState::new();
    assert_eq!(load_content(&state, "c1").await, Value::Null);
}

#[tokio::test]
async fn save_content_replaces_previous_snapshot() {
    let state = RelayState::new();
    save_content(&state, "c1", json!({ "objects": [1] })).await;
    save_content(&state, "c1", json!({ "objects": [2] })).await;
    assert_eq!(load_content(&state, "c1").await, json!({ "objects": [2] }));
}
