//! Client for the hosted brick store (REST tables, RPC, counts).
//!
//! Client-side (csr): real HTTP calls via `gloo-net`.
//! Native builds (tests): the async calls return [`StoreError::Unavailable`];
//! the URL builders and response classifiers are plain functions and are
//! tested directly.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<_, StoreError>`. Callers turn errors into a
//! user-visible message; nothing here panics on a bad response.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use uuid::Uuid;
use wall::sold::{BrickRecord, SOLD_STATUS};

use super::types::StoreErrorBody;
#[cfg(feature = "csr")]
use super::types::{LikeRow, ReserveResponse};
use super::types::ReserveRequest;
use crate::config::ClientConfig;

/// Table holding brick rows.
pub const BRICKS_TABLE: &str = "bricks";
/// Table holding one row per (brick, user) like.
pub const LIKES_TABLE: &str = "brick_likes";
/// Procedure that reserves a brick and records the order atomically.
pub const RESERVE_PROCEDURE: &str = "reserve_brick_and_create_order";
/// Upper bound on rows fetched by the initial wall load.
pub const SOLD_LOAD_LIMIT: u32 = 20_000;

const BRICK_COLUMNS: &str =
    "id,brick_index,color,message,facebook_url,instagram_url,youtube_url,tiktok_url,x_url,owner_id,status";

const CONFLICT_MARKERS: [&str; 5] = ["already sold", "already taken", "already reserved", "duplicate key", "not available"];

/// Store failures, classified for the UI.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Someone else holds the brick.
    #[error("this brick was just claimed by someone else")]
    Conflict,
    #[error("not signed in or session expired")]
    Unauthorized,
    #[error("store request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected store response: {0}")]
    Decode(String),
    #[error("store is not available in this build")]
    Unavailable,
}

/// Handle to the store, provided to components through Leptos context.
///
/// Requests carry the anon key, plus the user's access token when signed
/// in (see [`StoreClient::with_token`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreClient {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl StoreClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.store_url.trim_end_matches('/').to_owned(),
            anon_key: config.store_anon_key.clone(),
            access_token: None,
        }
    }

    /// Copy of this client that authenticates as the given session token.
    #[must_use]
    pub fn with_token(&self, token: Option<&str>) -> Self {
        Self { access_token: token.map(str::to_owned), ..self.clone() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Bearer credential: the session token, else the anon key.
    pub fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    pub fn table_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{table}", self.base_url)
        } else {
            format!("{}/rest/v1/{table}?{query}", self.base_url)
        }
    }

    pub fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rest/v1/rpc/{procedure}", self.base_url)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Websocket endpoint of the realtime service.
    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0", self.anon_key)
    }

    #[cfg(feature = "csr")]
    fn authorize(&self, builder: gloo_net::http::RequestBuilder) -> gloo_net::http::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", &format!("Bearer {}", self.bearer()))
    }

    /// Load every sold brick for the wall, ordered by index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport, status or decode failure.
    pub async fn fetch_sold(&self) -> Result<Vec<BrickRecord>, StoreError> {
        #[cfg(feature = "csr")]
        {
            let url = self.table_url(BRICKS_TABLE, &sold_query());
            let resp = self.authorize(gloo_net::http::Request::get(&url)).send().await.map_err(network_error)?;
            read_json(resp).await
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(StoreError::Unavailable)
        }
    }

    /// Load the sold bricks owned by `owner`, ordered by index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport, status or decode failure.
    pub async fn fetch_owned(&self, owner: Uuid) -> Result<Vec<BrickRecord>, StoreError> {
        #[cfg(feature = "csr")]
        {
            let url = self.table_url(BRICKS_TABLE, &owned_query(owner));
            let resp = self.authorize(gloo_net::http::Request::get(&url)).send().await.map_err(network_error)?;
            read_json(resp).await
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = owner;
            Err(StoreError::Unavailable)
        }
    }

    /// The most recently sold brick, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport, status or decode failure.
    pub async fn fetch_featured(&self) -> Result<Option<BrickRecord>, StoreError> {
        #[cfg(feature = "csr")]
        {
            let url = self.table_url(BRICKS_TABLE, &featured_query());
            let resp = self.authorize(gloo_net::http::Request::get(&url)).send().await.map_err(network_error)?;
            let rows: Vec<BrickRecord> = read_json(resp).await?;
            Ok(rows.into_iter().next())
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(StoreError::Unavailable)
        }
    }

    /// Exact number of sold bricks, independent of the load limit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on failure or when the count header is missing.
    pub async fn count_sold(&self) -> Result<u64, StoreError> {
        self.count(BRICKS_TABLE, &count_sold_query()).await
    }

    /// Reserve a brick after payment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the brick is already held, or
    /// another [`StoreError`] on failure.
    pub async fn reserve(&self, request: &ReserveRequest) -> Result<BrickRecord, StoreError> {
        #[cfg(feature = "csr")]
        {
            let url = self.rpc_url(RESERVE_PROCEDURE);
            let resp = self
                .authorize(gloo_net::http::Request::post(&url))
                .json(request)
                .map_err(|e| StoreError::Decode(e.to_string()))?
                .send()
                .await
                .map_err(network_error)?;
            let body: ReserveResponse = read_json(resp).await?;
            body.brick.ok_or_else(|| StoreError::Decode("No brick returned from server.".to_owned()))
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = request;
            Err(StoreError::Unavailable)
        }
    }

    /// Number of likes on a brick.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on failure.
    pub async fn like_count(&self, index: u32) -> Result<u64, StoreError> {
        self.count(LIKES_TABLE, &like_count_query(index)).await
    }

    /// Whether `user` has liked the brick.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on failure.
    pub async fn has_liked(&self, index: u32, user: Uuid) -> Result<bool, StoreError> {
        #[cfg(feature = "csr")]
        {
            let url = self.table_url(LIKES_TABLE, &user_like_query(index, user));
            let resp = self.authorize(gloo_net::http::Request::get(&url)).send().await.map_err(network_error)?;
            let rows: Vec<serde_json::Value> = read_json(resp).await?;
            Ok(!rows.is_empty())
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (index, user);
            Err(StoreError::Unavailable)
        }
    }

    /// Record a like by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on failure.
    pub async fn like(&self, index: u32, user: Uuid) -> Result<(), StoreError> {
        #[cfg(feature = "csr")]
        {
            let url = self.table_url(LIKES_TABLE, "");
            let resp = self
                .authorize(gloo_net::http::Request::post(&url))
                .header("Prefer", "return=minimal")
                .json(&LikeRow { brick_index: index, user_id: user })
                .map_err(|e| StoreError::Decode(e.to_string()))?
                .send()
                .await
                .map_err(network_error)?;
            expect_success(resp).await
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (index, user);
            Err(StoreError::Unavailable)
        }
    }

    /// Remove the like by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on failure.
    pub async fn unlike(&self, index: u32, user: Uuid) -> Result<(), StoreError> {
        #[cfg(feature = "csr")]
        {
            let url = self.table_url(LIKES_TABLE, &user_like_filter(index, user));
            let resp = self.authorize(gloo_net::http::Request::delete(&url)).send().await.map_err(network_error)?;
            expect_success(resp).await
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (index, user);
            Err(StoreError::Unavailable)
        }
    }

    async fn count(&self, table: &str, query: &str) -> Result<u64, StoreError> {
        #[cfg(feature = "csr")]
        {
            let url = self.table_url(table, query);
            let resp = self
                .authorize(gloo_net::http::Request::get(&url))
                .header("Prefer", "count=exact")
                .header("Range-Unit", "items")
                .header("Range", "0-0")
                .send()
                .await
                .map_err(network_error)?;
            if !resp.ok() {
                return Err(failure_from_response(resp).await);
            }
            let header = resp.headers().get("content-range").unwrap_or_default();
            parse_content_range_total(&header)
                .ok_or_else(|| StoreError::Decode(format!("missing count in content-range {header:?}")))
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (table, query);
            Err(StoreError::Unavailable)
        }
    }
}

#[cfg(feature = "csr")]
fn network_error(err: gloo_net::Error) -> StoreError {
    StoreError::Network(err.to_string())
}

#[cfg(feature = "csr")]
async fn failure_from_response(resp: gloo_net::http::Response) -> StoreError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    classify_failure(status, &body)
}

#[cfg(feature = "csr")]
async fn read_json<T: serde::de::DeserializeOwned>(resp: gloo_net::http::Response) -> Result<T, StoreError> {
    if !resp.ok() {
        return Err(failure_from_response(resp).await);
    }
    resp.json::<T>().await.map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(feature = "csr")]
async fn expect_success(resp: gloo_net::http::Response) -> Result<(), StoreError> {
    if resp.ok() { Ok(()) } else { Err(failure_from_response(resp).await) }
}

/// Query for the initial wall load.
pub fn sold_query() -> String {
    format!("select={BRICK_COLUMNS}&status=eq.{SOLD_STATUS}&order=brick_index.asc&limit={SOLD_LOAD_LIMIT}")
}

/// Query for one owner's bricks.
pub fn owned_query(owner: Uuid) -> String {
    format!("select={BRICK_COLUMNS}&owner_id=eq.{owner}&status=eq.{SOLD_STATUS}&order=brick_index.asc")
}

/// Query for the latest sold brick, newest row first.
pub fn featured_query() -> String {
    format!("select={BRICK_COLUMNS}&status=eq.{SOLD_STATUS}&order=id.desc&limit=1")
}

pub fn count_sold_query() -> String {
    format!("select=brick_index&status=eq.{SOLD_STATUS}")
}

pub fn like_count_query(index: u32) -> String {
    format!("select=brick_index&brick_index=eq.{index}")
}

fn user_like_filter(index: u32, user: Uuid) -> String {
    format!("brick_index=eq.{index}&user_id=eq.{user}")
}

pub fn user_like_query(index: u32, user: Uuid) -> String {
    format!("select=brick_index&{}&limit=1", user_like_filter(index, user))
}

/// Total from a `Content-Range` header such as `0-0/1234` or `*/0`.
///
/// Returns `None` when the total is unknown (`*`) or the header is malformed.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}

/// Map a failed response to a [`StoreError`].
///
/// HTTP 409, unique-violation code `23505`, and messages saying the brick
/// is already held are conflicts. 401/403 mean the session is missing or
/// expired.
pub fn classify_failure(status: u16, body: &str) -> StoreError {
    let parsed: StoreErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| if body.trim().is_empty() { format!("HTTP {status}") } else { body.trim().to_owned() });

    if status == 409 || parsed.code.as_deref() == Some("23505") || is_conflict_message(&message) {
        return StoreError::Conflict;
    }
    if status == 401 || status == 403 {
        return StoreError::Unauthorized;
    }
    StoreError::Http { status, message }
}

fn is_conflict_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    CONFLICT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Public link to a brick on the wall.
pub fn share_target_url(origin: &str, index: u32) -> String {
    format!("{}/wall?brick={index}", origin.trim_end_matches('/'))
}

/// Tweet text for sharing a brick, quoting its message when there is one.
pub fn share_text(index: u32, message: Option<&str>) -> String {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) => format!("Check out Brick #{index} on the 1,000,000-brick wall: \"{message}\""),
        None => format!("Check out Brick #{index} on the 1,000,000-brick wall"),
    }
}

/// Tweet-intent URL for sharing a brick on X.
#[cfg(feature = "csr")]
pub fn share_on_x_url(origin: &str, index: u32, message: Option<&str>) -> String {
    let text = String::from(js_sys::encode_uri_component(&share_text(index, message)));
    let url = String::from(js_sys::encode_uri_component(&share_target_url(origin, index)));
    format!("https://twitter.com/intent/tweet?text={text}&url={url}")
}
