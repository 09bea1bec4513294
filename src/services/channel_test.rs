use std::sync::{Arc, Mutex};
use std::time::Duration;

use frames::MessageKind;
use serde_json::json;

use super::*;
use crate::config::SyncConfig;
use crate::test_support::spawn_relay;

const WAIT: Duration = Duration::from_secs(5);

fn ws_url(base: &str, canvas_id: &str) -> String {
    SyncConfig::default().with_base_url(base).ws_url(canvas_id, "tok").expect("http base url")
}

async fn open(base: &str, canvas_id: &str) -> SyncChannel {
    let channel = SyncChannel::open(ws_url(base, canvas_id));
    channel.wait_open().await.expect("channel opens");
    channel
}

/// Give the relay time to register freshly upgraded sockets.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

fn delete(id: &str) -> Message {
    Message::new(MessageKind::ObjectDelete, json!({ "id": id }))
}

#[tokio::test]
async fn open_reaches_open_state() {
    let base = spawn_relay().await.expect("relay");
    let channel = SyncChannel::open(ws_url(&base, "c1"));
    assert_eq!(channel.state(), ChannelState::Connecting);
    channel.wait_open().await.expect("open");
    assert_eq!(channel.state(), ChannelState::Open);
}

#[tokio::test]
async fn messages_reach_other_peers_only() {
    let base = spawn_relay().await.expect("relay");
    let mut a = open(&base, "c1").await;
    let mut b = open(&base, "c1").await;
    settle().await;

    a.send(&delete("x"));
    let received = tokio::time::timeout(WAIT, b.recv()).await.expect("in time").expect("message");
    assert_eq!(received, delete("x"));

    let echoed = tokio::time::timeout(Duration::from_millis(200), a.recv()).await;
    assert!(echoed.is_err(), "sender must not receive its own message");
}

#[tokio::test]
async fn rooms_are_isolated() {
    let base = spawn_relay().await.expect("relay");
    let a = open(&base, "c1").await;
    let mut other = open(&base, "c2").await;
    settle().await;

    a.send(&delete("x"));
    let received = tokio::time::timeout(Duration::from_millis(200), other.recv()).await;
    assert!(received.is_err());
}

#[tokio::test]
async fn sends_before_open_are_queued() {
    let base = spawn_relay().await.expect("relay");
    let mut b = open(&base, "c1").await;
    settle().await;

    let a = SyncChannel::open(ws_url(&base, "c1"));
    a.send(&delete("early"));
    a.wait_open().await.expect("open");

    let received = tokio::time::timeout(WAIT, b.recv()).await.expect("in time").expect("message");
    assert_eq!(received, delete("early"));
}

#[tokio::test]
async fn connect_failure_closes() {
    let channel = SyncChannel::open("ws://127.0.0.1:1/ws/canvas/c1?token=tok".to_owned());
    assert!(matches!(channel.wait_open().await, Err(ChannelError::Closed)));
    assert_eq!(channel.state(), ChannelState::Closed);
}

#[tokio::test]
async fn missing_token_is_refused() {
    let base = spawn_relay().await.expect("relay");
    let url = format!("{}/ws/canvas/c1", base.replacen("http://", "ws://", 1));
    let channel = SyncChannel::open(url);
    assert!(channel.wait_open().await.is_err());
}

#[tokio::test]
async fn close_moves_to_closed_and_drops_later_sends() {
    let base = spawn_relay().await.expect("relay");
    let mut channel = open(&base, "c1").await;
    let mut state = channel.watch_state();

    channel.close();
    tokio::time::timeout(WAIT, state.wait_for(|s| *s == ChannelState::Closed))
        .await
        .expect("in time")
        .expect("state sender alive until closed");
    channel.send(&delete("late"));
    channel.close();
    assert_eq!(tokio::time::timeout(WAIT, channel.recv()).await.expect("in time"), None);
}

#[tokio::test]
async fn on_message_handler_receives_messages() {
    let base = spawn_relay().await.expect("relay");
    let a = open(&base, "c1").await;
    let mut b = open(&base, "c1").await;
    settle().await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    assert!(b.on_message(move |message| sink.lock().expect("lock").push(message)));
    assert!(!b.on_message(|_| {}));
    assert_eq!(b.recv().await, None);

    a.send(&delete("h"));
    tokio::time::timeout(WAIT, async {
        while seen.lock().expect("lock").is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("handler called");
    assert_eq!(seen.lock().expect("lock")[0], delete("h"));
}

#[tokio::test]
async fn garbage_from_a_peer_does_not_disrupt_the_channel() {
    use futures_util::SinkExt;
    use tokio_tungstenite::connect_async;

    let base = spawn_relay().await.expect("relay");
    let mut b = open(&base, "c1").await;
    let (mut raw, _) = connect_async(ws_url(&base, "c1")).await.expect("raw connect");
    settle().await;

    raw.send(WsMessage::Text("{not json".into())).await.expect("send garbage");
    raw.send(WsMessage::Text(r#"{"type":"object-delete","payload":{"id":"ok"}}"#.into())).await.expect("send valid");

    let received = tokio::time::timeout(WAIT, b.recv()).await.expect("in time").expect("message");
    assert_eq!(received, delete("ok"));
}
