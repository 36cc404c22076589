use super::*;
use crate::config::ClientConfig;

fn session() -> Session {
    Session { access_token: "jwt".to_owned(), refresh_token: None, expires_in: Some(3600), token_type: None }
}

fn user() -> SessionUser {
    SessionUser { id: Uuid::from_u128(42), email: Some("me@example.com".to_owned()) }
}

#[test]
fn default_is_signed_out() {
    let state = AuthState::default();
    assert_eq!(state.user_id(), None);
    assert_eq!(state.access_token(), None);
    assert!(!state.loading);
    assert!(AuthState::resolving().loading);
}

#[test]
fn signed_in_exposes_user_and_token() {
    let state = AuthState::signed_in(session(), user());
    assert_eq!(state.user_id(), Some(Uuid::from_u128(42)));
    assert_eq!(state.access_token(), Some("jwt"));
}

#[test]
fn store_uses_session_token() {
    let config = ClientConfig {
        store_url: "https://s.example".to_owned(),
        store_anon_key: "anon".to_owned(),
        merchant_wallet: None,
        usdc_mint: None,
        price_usd: 1.0,
    };
    let base = StoreClient::new(&config);
    assert_eq!(AuthState::default().store(&base).bearer(), "anon");
    assert_eq!(AuthState::signed_in(session(), user()).store(&base).bearer(), "jwt");
}
