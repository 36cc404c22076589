//! Wire DTOs for the hosted store's REST, RPC and auth endpoints.
//!
//! DESIGN
//! ======
//! Brick rows themselves are `wall::sold::BrickRecord`; this module only
//! holds the request/response envelopes around them.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wall::sold::BrickRecord;

/// Access token plus refresh metadata returned by the auth service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds from issue.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// The signed-in user as reported by `GET /auth/v1/user`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Error body shape shared by the REST and RPC endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct StoreErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// Arguments of the `reserve_brick_and_create_order` procedure.
///
/// Field names are the procedure's parameter names. The payment signature
/// and token travel with the claim so the store can verify the transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReserveRequest {
    pub p_brick_index: u32,
    pub p_x: u32,
    pub p_y: u32,
    pub p_color: String,
    pub p_message: Option<String>,
    pub p_facebook_url: Option<String>,
    pub p_instagram_url: Option<String>,
    pub p_youtube_url: Option<String>,
    pub p_tiktok_url: Option<String>,
    pub p_x_url: Option<String>,
    pub p_is_gift: bool,
    pub p_recipient_name: Option<String>,
    pub p_recipient_email: Option<String>,
    pub p_gift_note: Option<String>,
    pub p_tx_signature: String,
    pub p_payment_token: String,
}

/// Result of the reserve procedure. A missing `brick` is a server fault.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ReserveResponse {
    #[serde(default)]
    pub brick: Option<BrickRecord>,
}

/// Row inserted into `brick_likes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LikeRow {
    pub brick_index: u32,
    pub user_id: Uuid,
}
