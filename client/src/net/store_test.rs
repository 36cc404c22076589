use super::*;

fn client() -> StoreClient {
    StoreClient {
        base_url: "https://abc.store.example".to_owned(),
        anon_key: "anon-key".to_owned(),
        access_token: None,
    }
}

// =============================================================
// URLs
// =============================================================

#[test]
fn new_strips_trailing_slash() {
    let config = ClientConfig {
        store_url: "https://abc.store.example/".to_owned(),
        store_anon_key: "k".to_owned(),
        merchant_wallet: None,
        usdc_mint: None,
        price_usd: 1.0,
    };
    assert_eq!(StoreClient::new(&config).base_url(), "https://abc.store.example");
}

#[test]
fn table_and_rpc_urls() {
    let c = client();
    assert_eq!(c.table_url("bricks", "select=id"), "https://abc.store.example/rest/v1/bricks?select=id");
    assert_eq!(c.table_url("brick_likes", ""), "https://abc.store.example/rest/v1/brick_likes");
    assert_eq!(
        c.rpc_url(RESERVE_PROCEDURE),
        "https://abc.store.example/rest/v1/rpc/reserve_brick_and_create_order"
    );
    assert_eq!(c.auth_url("/user"), "https://abc.store.example/auth/v1/user");
}

#[test]
fn realtime_url_switches_scheme() {
    assert_eq!(
        client().realtime_url(),
        "wss://abc.store.example/realtime/v1/websocket?apikey=anon-key&vsn=1.0.0"
    );
}

#[test]
fn bearer_prefers_session_token() {
    let c = client();
    assert_eq!(c.bearer(), "anon-key");
    let signed_in = c.with_token(Some("jwt"));
    assert_eq!(signed_in.bearer(), "jwt");
    assert_eq!(signed_in.with_token(None).bearer(), "anon-key");
}

// =============================================================
// Queries
// =============================================================

#[test]
fn sold_query_filters_orders_and_limits() {
    let q = sold_query();
    assert!(q.starts_with("select=id,brick_index,color,message,"));
    assert!(q.contains("owner_id,status"));
    assert!(q.contains("&status=eq.sold"));
    assert!(q.contains("&order=brick_index.asc"));
    assert!(q.ends_with("&limit=20000"));
}

#[test]
fn featured_query_takes_newest_sold_row() {
    let q = featured_query();
    assert!(q.starts_with("select=id,brick_index,color,message,"));
    assert!(q.contains("&status=eq.sold"));
    assert!(q.contains("&order=id.desc"));
    assert!(q.ends_with("&limit=1"));
}

#[test]
fn owned_query_filters_on_owner() {
    let owner = Uuid::from_u128(1);
    let q = owned_query(owner);
    assert!(q.contains(&format!("owner_id=eq.{owner}")));
    assert!(q.contains("status=eq.sold"));
}

#[test]
fn like_queries() {
    let user = Uuid::from_u128(2);
    assert_eq!(like_count_query(5), "select=brick_index&brick_index=eq.5");
    assert_eq!(user_like_query(5, user), format!("select=brick_index&brick_index=eq.5&user_id=eq.{user}&limit=1"));
}

// =============================================================
// parse_content_range_total
// =============================================================

#[test]
fn content_range_total() {
    assert_eq!(parse_content_range_total("0-0/1234"), Some(1234));
    assert_eq!(parse_content_range_total("*/0"), Some(0));
    assert_eq!(parse_content_range_total(" 0-24/25 "), Some(25));
}

#[test]
fn content_range_without_total() {
    assert_eq!(parse_content_range_total("0-0/*"), None);
    assert_eq!(parse_content_range_total(""), None);
    assert_eq!(parse_content_range_total("items 0-0"), None);
}

// =============================================================
// classify_failure
// =============================================================

#[test]
fn http_409_is_conflict() {
    assert_eq!(classify_failure(409, ""), StoreError::Conflict);
}

#[test]
fn unique_violation_is_conflict() {
    let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
    assert_eq!(classify_failure(400, body), StoreError::Conflict);
}

#[test]
fn already_sold_message_is_conflict() {
    let body = r#"{"message":"Brick 12 is already sold"}"#;
    assert_eq!(classify_failure(400, body), StoreError::Conflict);
}

#[test]
fn auth_failures_are_unauthorized() {
    assert_eq!(classify_failure(401, r#"{"message":"JWT expired"}"#), StoreError::Unauthorized);
    assert_eq!(classify_failure(403, ""), StoreError::Unauthorized);
}

#[test]
fn other_failures_keep_status_and_message() {
    assert_eq!(
        classify_failure(500, r#"{"message":"boom"}"#),
        StoreError::Http { status: 500, message: "boom".to_owned() }
    );
    assert_eq!(
        classify_failure(502, "Bad Gateway"),
        StoreError::Http { status: 502, message: "Bad Gateway".to_owned() }
    );
    assert_eq!(classify_failure(500, "  "), StoreError::Http { status: 500, message: "HTTP 500".to_owned() });
}

#[cfg(not(feature = "csr"))]
#[test]
fn native_build_reports_unavailable() {
    let result = futures::executor::block_on(client().fetch_sold());
    assert_eq!(result, Err(StoreError::Unavailable));
    let featured = futures::executor::block_on(client().fetch_featured());
    assert_eq!(featured, Err(StoreError::Unavailable));
}

// =============================================================
// Sharing
// =============================================================

#[test]
fn share_target_points_at_brick_query() {
    assert_eq!(share_target_url("https://wall.example/", 2384), "https://wall.example/wall?brick=2384");
}

#[test]
fn share_text_quotes_trimmed_message() {
    assert_eq!(
        share_text(12, Some("  gm  ")),
        "Check out Brick #12 on the 1,000,000-brick wall: \"gm\""
    );
    assert_eq!(share_text(12, Some("   ")), "Check out Brick #12 on the 1,000,000-brick wall");
    assert_eq!(share_text(12, None), "Check out Brick #12 on the 1,000,000-brick wall");
}
