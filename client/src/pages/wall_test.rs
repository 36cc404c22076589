use super::*;
use crate::net::types::{Session, SessionUser};

fn signed_in() -> AuthState {
    let session = Session { access_token: "token".to_owned(), refresh_token: None, expires_in: None, token_type: None };
    AuthState::signed_in(session, SessionUser { id: uuid::Uuid::from_u128(5), email: None })
}

#[test]
fn wall_paths() {
    assert_eq!(brick_path(2384), "/wall?brick=2384");
    assert_eq!(buy_path(), "/wall#buy");
}

#[test]
fn login_path_keeps_fragment_inside_redirect() {
    assert_eq!(login_path(&buy_path()), "/login?redirect=/wall%23buy");
    assert_eq!(login_path(WALL_PATH), "/login?redirect=/wall");
}

#[test]
fn buy_fragment_waits_for_session_then_routes() {
    assert_eq!(buy_request("#buy", &AuthState::resolving()), BuyRequest::Pending);
    assert_eq!(buy_request("#buy", &AuthState::default()), BuyRequest::Login);
    assert_eq!(buy_request("#buy", &signed_in()), BuyRequest::PickBrick);
    assert_eq!(buy_request("buy", &signed_in()), BuyRequest::PickBrick);
}

#[test]
fn other_fragments_are_ignored() {
    assert_eq!(buy_request("", &signed_in()), BuyRequest::None);
    assert_eq!(buy_request("#help", &AuthState::default()), BuyRequest::None);
}

#[test]
fn shared_brick_parses_index_on_the_wall() {
    assert_eq!(shared_brick(Some("2384"), Grid::MILLION), Some(Target { index: 2384, x: 384, y: 2 }));
    assert_eq!(shared_brick(Some(" 7 "), Grid::MILLION).map(|t| t.index), Some(7));
}

#[test]
fn shared_brick_ignores_missing_or_bad_values() {
    assert_eq!(shared_brick(None, Grid::MILLION), None);
    assert_eq!(shared_brick(Some("abc"), Grid::MILLION), None);
    assert_eq!(shared_brick(Some("-3"), Grid::MILLION), None);
    assert_eq!(shared_brick(Some("1000000"), Grid::MILLION), None);
}

#[cfg(not(feature = "csr"))]
#[test]
fn load_wall_reports_unavailable_store_without_a_browser() {
    use crate::config::ClientConfig;

    let owner = Owner::new();
    owner.with(|| {
        let config = ClientConfig::from_lookup(|key| match key {
            "BRICKWALL_STORE_URL" => Some("https://store.example".to_owned()),
            "BRICKWALL_STORE_ANON_KEY" => Some("anon".to_owned()),
            _ => None,
        })
        .unwrap();
        let wall = RwSignal::new(WallState::new(Grid::MILLION));
        futures::executor::block_on(load_wall(StoreClient::new(&config), wall, CancelFlag::new()));
        wall.with_untracked(|w| {
            assert!(!w.loading);
            assert!(w.error.is_some());
            assert_eq!(w.claimed_total, None);
        });
    });
}

#[cfg(not(feature = "csr"))]
#[test]
fn load_wall_skips_commit_after_cancel() {
    use crate::config::ClientConfig;

    let owner = Owner::new();
    owner.with(|| {
        let config = ClientConfig::from_lookup(|key| match key {
            "BRICKWALL_STORE_URL" => Some("https://store.example".to_owned()),
            "BRICKWALL_STORE_ANON_KEY" => Some("anon".to_owned()),
            _ => None,
        })
        .unwrap();
        let wall = RwSignal::new(WallState::new(Grid::MILLION));
        let cancel = CancelFlag::new();
        cancel.cancel();
        futures::executor::block_on(load_wall(StoreClient::new(&config), wall, cancel));
        wall.with_untracked(|w| {
            assert!(w.loading);
            assert!(w.error.is_none());
        });
    });
}
