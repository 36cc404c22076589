use futures::executor::block_on;
use serde_json::json;

use super::*;

fn frame(event: &str, payload: Value) -> String {
    json!({ "topic": channel_topic(), "event": event, "payload": payload, "ref": null }).to_string()
}

fn change_frame(kind: &str, record: Value) -> String {
    frame("postgres_changes", json!({ "data": { "type": kind, "schema": "public", "table": "bricks", "record": record }, "ids": [1] }))
}

// =============================================================
// Outgoing messages
// =============================================================

#[test]
fn join_message_subscribes_to_bricks_table() {
    let msg: PhxMessage = serde_json::from_str(&join_message("1", "anon")).unwrap();
    assert_eq!(msg.topic, "realtime:bricks-realtime-wall");
    assert_eq!(msg.event, "phx_join");
    assert_eq!(msg.msg_ref.as_deref(), Some("1"));
    let changes = &msg.payload["config"]["postgres_changes"][0];
    assert_eq!(changes["schema"], "public");
    assert_eq!(changes["table"], "bricks");
    assert_eq!(changes["event"], "*");
    assert_eq!(msg.payload["access_token"], "anon");
}

#[test]
fn heartbeat_goes_to_phoenix_topic() {
    let msg: PhxMessage = serde_json::from_str(&heartbeat_message("7")).unwrap();
    assert_eq!(msg.topic, "phoenix");
    assert_eq!(msg.event, "heartbeat");
    assert_eq!(msg.msg_ref.as_deref(), Some("7"));
}

#[test]
fn backoff_doubles_up_to_cap() {
    let mut delays = vec![INITIAL_BACKOFF_MS];
    for _ in 0..5 {
        let next = next_backoff(*delays.last().unwrap());
        delays.push(next);
    }
    assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10_000, 10_000]);
}

// =============================================================
// Incoming messages
// =============================================================

#[test]
fn insert_change_is_validated() {
    let text = change_frame("INSERT", json!({ "brick_index": 5000, "color": "#ABC", "status": "sold" }));
    let change = parse_change_message(&text).unwrap().unwrap();
    assert_eq!(change.kind, ChangeKind::Insert);
    assert_eq!(change.index, 5000);
}

#[test]
fn update_change_is_validated() {
    let text = change_frame("UPDATE", json!({ "brick_index": 3, "status": "sold", "message": "hi" }));
    let change = parse_change_message(&text).unwrap().unwrap();
    assert_eq!(change.kind, ChangeKind::Update);
    assert_eq!(change.fields.message.as_deref(), Some("hi"));
}

#[test]
fn delete_and_unsold_rows_are_ignored() {
    let delete = change_frame("DELETE", json!({ "brick_index": 3 }));
    assert_eq!(parse_change_message(&delete).unwrap(), None);
    let reserved = change_frame("UPDATE", json!({ "brick_index": 3, "status": "reserved" }));
    assert_eq!(parse_change_message(&reserved).unwrap(), None);
}

#[test]
fn malformed_change_row_is_an_error() {
    let text = change_frame("INSERT", json!({ "color": "#fff" }));
    assert_eq!(parse_change_message(&text).unwrap_err(), RealtimeError::Change(ChangeError::MissingIndex));
    let no_record = frame("postgres_changes", json!({ "data": { "type": "INSERT" } }));
    assert_eq!(parse_change_message(&no_record).unwrap_err(), RealtimeError::MissingRecord);
}

#[test]
fn flat_payload_shape_is_accepted() {
    let text = frame("postgres_changes", json!({ "eventType": "INSERT", "new": { "brick_index": 8 } }));
    assert_eq!(parse_change_message(&text).unwrap().map(|c| c.index), Some(8));
}

#[test]
fn join_reply_status() {
    assert_eq!(parse_message(&frame("phx_reply", json!({ "status": "ok", "response": {} }))).unwrap(), Incoming::Joined);
    let rejected = frame("phx_reply", json!({ "status": "error", "response": { "reason": "unauthorized" } }));
    assert_eq!(parse_message(&rejected).unwrap(), Incoming::Closed("unauthorized".to_owned()));
}

#[test]
fn channel_errors_close() {
    assert!(matches!(parse_message(&frame("phx_error", json!({}))).unwrap(), Incoming::Closed(_)));
    assert!(matches!(parse_message(&frame("phx_close", json!({}))).unwrap(), Incoming::Closed(_)));
    let system = frame("system", json!({ "status": "error", "message": "bad filter" }));
    assert_eq!(parse_message(&system).unwrap(), Incoming::Closed("bad filter".to_owned()));
    let ok = frame("system", json!({ "status": "ok", "message": "Subscribed to PostgreSQL" }));
    assert_eq!(parse_message(&ok).unwrap(), Incoming::Ignored);
}

#[test]
fn other_topics_are_ignored() {
    let reply = json!({ "topic": "phoenix", "event": "phx_reply", "payload": { "status": "ok" }, "ref": "2" });
    assert_eq!(parse_message(&reply.to_string()).unwrap(), Incoming::Ignored);
}

#[test]
fn invalid_json_is_an_error() {
    assert!(matches!(parse_message("not json"), Err(RealtimeError::Json(_))));
}

// =============================================================
// Subscription lifecycle
// =============================================================

#[test]
fn dropping_subscription_aborts_task() {
    let (subscription, task) = Subscription::wrap(futures::future::pending::<()>());
    assert!(subscription.is_active());
    drop(subscription);
    block_on(task);
}

#[test]
fn live_subscription_lets_task_finish() {
    let ran = std::cell::Cell::new(false);
    let (subscription, task) = Subscription::wrap(async { ran.set(true) });
    block_on(task);
    assert!(ran.get());
    assert!(subscription.is_active());
}
