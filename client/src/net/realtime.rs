//! Realtime change feed for the `bricks` table.
//!
//! The hosted realtime service speaks the Phoenix channel protocol over a
//! websocket: JSON envelopes of `{topic, event, payload, ref}`. We join one
//! channel configured for `postgres_changes` on `public.bricks`, send a
//! heartbeat every 30 s, and turn INSERT/UPDATE rows into validated
//! [`BrickChange`]s.
//!
//! LIFECYCLE
//! =========
//! [`subscribe`] spawns the socket task and returns a [`Subscription`].
//! Dropping the subscription aborts the task, which closes the socket; the
//! wall page ties it to its own cleanup. Disconnects reconnect with
//! exponential backoff from 1 s up to 10 s, reset once a join succeeds.

#[cfg(test)]
#[path = "realtime_test.rs"]
mod realtime_test;

use std::future::Future;

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wall::sold::{BrickChange, ChangeError, ChangeKind};

/// Channel name shared by every wall client.
pub const CHANNEL: &str = "bricks-realtime-wall";
pub const HEARTBEAT_INTERVAL_MS: u32 = 30_000;
pub const INITIAL_BACKOFF_MS: u32 = 1000;
pub const MAX_BACKOFF_MS: u32 = 10_000;

const PHOENIX_TOPIC: &str = "phoenix";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RealtimeError {
    #[error("realtime message is not valid JSON: {0}")]
    Json(String),
    #[error("change message has no record")]
    MissingRecord,
    #[error(transparent)]
    Change(#[from] ChangeError),
    #[error("channel error: {0}")]
    Channel(String),
    #[error("socket error: {0}")]
    Socket(String),
}

/// One Phoenix protocol envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhxMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub msg_ref: Option<String>,
}

/// What an incoming message means to the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// The server accepted our channel join.
    Joined,
    /// A sold brick was inserted or updated.
    Change(BrickChange),
    /// The server refused or closed the channel.
    Closed(String),
    /// Heartbeat replies, presence, deletes and other traffic.
    Ignored,
}

/// Events delivered to the [`subscribe`] callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    Joined,
    Change(BrickChange),
    Disconnected,
}

pub fn channel_topic() -> String {
    format!("realtime:{CHANNEL}")
}

/// Serialized `phx_join` for the bricks channel.
pub fn join_message(msg_ref: &str, access_token: &str) -> String {
    let message = PhxMessage {
        topic: channel_topic(),
        event: "phx_join".to_owned(),
        payload: serde_json::json!({
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{ "event": "*", "schema": "public", "table": "bricks" }]
            },
            "access_token": access_token
        }),
        msg_ref: Some(msg_ref.to_owned()),
    };
    serde_json::to_string(&message).unwrap_or_default()
}

pub fn heartbeat_message(msg_ref: &str) -> String {
    let message = PhxMessage {
        topic: PHOENIX_TOPIC.to_owned(),
        event: "heartbeat".to_owned(),
        payload: serde_json::json!({}),
        msg_ref: Some(msg_ref.to_owned()),
    };
    serde_json::to_string(&message).unwrap_or_default()
}

/// Next reconnect delay: doubled, capped at [`MAX_BACKOFF_MS`].
pub fn next_backoff(current_ms: u32) -> u32 {
    current_ms.saturating_mul(2).min(MAX_BACKOFF_MS)
}

/// Classify one incoming text frame.
///
/// # Errors
///
/// Returns [`RealtimeError`] for malformed envelopes or change rows that
/// fail validation.
pub fn parse_message(text: &str) -> Result<Incoming, RealtimeError> {
    let message: PhxMessage = serde_json::from_str(text).map_err(|e| RealtimeError::Json(e.to_string()))?;
    if message.topic != channel_topic() {
        return Ok(Incoming::Ignored);
    }
    match message.event.as_str() {
        "phx_reply" => {
            let status = message.payload.get("status").and_then(Value::as_str).unwrap_or_default();
            if status == "ok" {
                Ok(Incoming::Joined)
            } else {
                Ok(Incoming::Closed(reply_reason(&message.payload)))
            }
        }
        "phx_error" => Ok(Incoming::Closed("channel crashed".to_owned())),
        "phx_close" => Ok(Incoming::Closed("channel closed".to_owned())),
        "system" => {
            let status = message.payload.get("status").and_then(Value::as_str).unwrap_or("ok");
            if status == "error" {
                Ok(Incoming::Closed(reply_reason(&message.payload)))
            } else {
                Ok(Incoming::Ignored)
            }
        }
        "postgres_changes" => parse_change_payload(&message.payload),
        _ => Ok(Incoming::Ignored),
    }
}

/// Extract a validated change from a text frame, if it carries one.
///
/// Non-change traffic and DELETE events yield `Ok(None)`.
///
/// # Errors
///
/// See [`parse_message`].
pub fn parse_change_message(text: &str) -> Result<Option<BrickChange>, RealtimeError> {
    match parse_message(text)? {
        Incoming::Change(change) => Ok(Some(change)),
        Incoming::Joined | Incoming::Closed(_) | Incoming::Ignored => Ok(None),
    }
}

fn parse_change_payload(payload: &Value) -> Result<Incoming, RealtimeError> {
    let data = payload.get("data").unwrap_or(payload);
    let kind = match data.get("type").or_else(|| data.get("eventType")).and_then(Value::as_str) {
        Some("INSERT") => ChangeKind::Insert,
        Some("UPDATE") => ChangeKind::Update,
        _ => return Ok(Incoming::Ignored),
    };
    let record = data.get("record").or_else(|| data.get("new")).ok_or(RealtimeError::MissingRecord)?;
    Ok(BrickChange::from_record(kind, record)?.map_or(Incoming::Ignored, Incoming::Change))
}

fn reply_reason(payload: &Value) -> String {
    payload
        .pointer("/response/reason")
        .or_else(|| payload.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("join rejected")
        .to_owned()
}

/// Handle to a running feed. Dropping it stops the feed.
#[derive(Debug)]
pub struct Subscription {
    handle: AbortHandle,
}

impl Subscription {
    /// Pair `task` with a handle that aborts it when dropped.
    pub fn wrap<F>(task: F) -> (Self, impl Future<Output = ()>)
    where
        F: Future<Output = ()>,
    {
        let (handle, registration) = AbortHandle::new_pair();
        (Self { handle }, Abortable::new(task, registration).map(|_| ()))
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_aborted()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        log::debug!("realtime subscription dropped");
        self.handle.abort();
    }
}

/// Start the change feed for `store`, delivering events to `on_event`.
#[cfg(feature = "csr")]
pub fn subscribe<F>(store: &super::store::StoreClient, on_event: F) -> Subscription
where
    F: Fn(RealtimeEvent) + 'static,
{
    let url = store.realtime_url();
    let token = store.bearer().to_owned();
    let (subscription, task) = Subscription::wrap(run_feed(url, token, on_event));
    leptos::task::spawn_local(task);
    subscription
}

#[cfg(feature = "csr")]
async fn run_feed<F>(url: String, token: String, on_event: F)
where
    F: Fn(RealtimeEvent),
{
    let mut backoff_ms = INITIAL_BACKOFF_MS;
    loop {
        match connect_and_listen(&url, &token, &on_event, &mut backoff_ms).await {
            Ok(()) => log::debug!("realtime socket closed"),
            Err(e) => log::warn!("realtime socket error: {e}"),
        }
        on_event(RealtimeEvent::Disconnected);
        gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(backoff_ms))).await;
        backoff_ms = next_backoff(backoff_ms);
    }
}

#[cfg(feature = "csr")]
async fn connect_and_listen<F>(url: &str, token: &str, on_event: &F, backoff_ms: &mut u32) -> Result<(), RealtimeError>
where
    F: Fn(RealtimeEvent),
{
    use futures::channel::mpsc;
    use futures::future::{Either, select};
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;
    use gloo_net::websocket::futures::WebSocket;

    let ws = WebSocket::open(url).map_err(|e| RealtimeError::Socket(e.to_string()))?;
    let (mut ws_write, mut ws_read) = ws.split();
    let (tx, mut rx) = mpsc::unbounded::<String>();
    tx.unbounded_send(join_message("1", token)).map_err(|e| RealtimeError::Socket(e.to_string()))?;

    let send_task = async {
        while let Some(text) = rx.next().await {
            if ws_write.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    };

    let heartbeat_task = async {
        let mut seq: u64 = 1;
        loop {
            gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(HEARTBEAT_INTERVAL_MS))).await;
            seq += 1;
            if tx.unbounded_send(heartbeat_message(&seq.to_string())).is_err() {
                break;
            }
        }
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Bytes(_)) => continue,
                Err(e) => return Err(RealtimeError::Socket(e.to_string())),
            };
            match parse_message(&text) {
                Ok(Incoming::Joined) => {
                    log::debug!("joined realtime channel {CHANNEL}");
                    *backoff_ms = INITIAL_BACKOFF_MS;
                    on_event(RealtimeEvent::Joined);
                }
                Ok(Incoming::Change(change)) => on_event(RealtimeEvent::Change(change)),
                Ok(Incoming::Closed(reason)) => return Err(RealtimeError::Channel(reason)),
                Ok(Incoming::Ignored) => {}
                Err(e) => log::warn!("dropping realtime message: {e}"),
            }
        }
        Ok(())
    };

    let writers = select(Box::pin(send_task), Box::pin(heartbeat_task));
    match select(Box::pin(recv_task), writers).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => Err(RealtimeError::Socket("socket writer stopped".to_owned())),
    }
}
