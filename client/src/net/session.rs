//! Sign-in session adapter for the hosted auth service.
//!
//! Authentication is owned by the auth service. The client requests a
//! magic link, picks the access token out of the redirect fragment, keeps
//! it in localStorage, and asks the service who the token belongs to.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use super::store::{StoreClient, StoreError};
use super::types::{Session, SessionUser};
use crate::util::storage;

/// Extract a session from a redirect fragment such as
/// `#access_token=...&refresh_token=...&expires_in=3600&token_type=bearer`.
///
/// Returns `None` when no non-empty `access_token` is present.
pub fn parse_session_fragment(fragment: &str) -> Option<Session> {
    let mut session = Session { access_token: String::new(), refresh_token: None, expires_in: None, token_type: None };
    for pair in fragment.trim_start_matches('#').split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "access_token" => value.clone_into(&mut session.access_token),
            "refresh_token" if !value.is_empty() => session.refresh_token = Some(value.to_owned()),
            "expires_in" => session.expires_in = value.parse().ok(),
            "token_type" if !value.is_empty() => session.token_type = Some(value.to_owned()),
            _ => {}
        }
    }
    (!session.access_token.is_empty()).then_some(session)
}

/// Loose email shape check before asking the service to send a link.
pub fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') && !email.contains(' ')
}

/// Body of the magic-link request.
pub fn otp_body(email: &str) -> serde_json::Value {
    serde_json::json!({ "email": email.trim(), "create_user": true })
}

/// Ask the auth service to email a sign-in link that redirects to `redirect_to`.
///
/// # Errors
///
/// Returns [`StoreError`] when the request fails.
pub async fn send_magic_link(store: &StoreClient, email: &str, redirect_to: &str) -> Result<(), StoreError> {
    #[cfg(feature = "csr")]
    {
        let redirect = String::from(js_sys::encode_uri_component(redirect_to));
        let url = format!("{}?redirect_to={redirect}", store.auth_url("otp"));
        let resp = gloo_net::http::Request::post(&url)
            .header("apikey", store.anon_key())
            .json(&otp_body(email))
            .map_err(|e| StoreError::Decode(e.to_string()))?
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        if resp.ok() {
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(super::store::classify_failure(status, &body))
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (store, email, redirect_to);
        Err(StoreError::Unavailable)
    }
}

/// Resolve the user that owns `token`.
///
/// # Errors
///
/// Returns [`StoreError::Unauthorized`] for a rejected token, or another
/// [`StoreError`] on failure.
pub async fn fetch_user(store: &StoreClient, token: &str) -> Result<SessionUser, StoreError> {
    #[cfg(feature = "csr")]
    {
        let resp = gloo_net::http::Request::get(&store.auth_url("user"))
            .header("apikey", store.anon_key())
            .header("Authorization", &format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        if !resp.ok() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(super::store::classify_failure(status, &body));
        }
        resp.json::<SessionUser>().await.map_err(|e| StoreError::Decode(e.to_string()))
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (store, token);
        Err(StoreError::Unavailable)
    }
}

/// Revoke the token server-side (best effort) and forget it locally.
pub async fn sign_out(store: &StoreClient, token: &str) {
    #[cfg(feature = "csr")]
    {
        let sent = gloo_net::http::Request::post(&store.auth_url("logout"))
            .header("apikey", store.anon_key())
            .header("Authorization", &format!("Bearer {token}"))
            .send()
            .await;
        if let Err(e) = sent {
            log::warn!("sign-out request failed: {e}");
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (store, token);
    }
    forget();
}

/// Session persisted by an earlier visit.
pub fn stored() -> Option<Session> {
    storage::load_json(storage::SESSION_KEY)
}

pub fn remember(session: &Session) {
    storage::save_json(storage::SESSION_KEY, session);
}

pub fn forget() {
    storage::remove(storage::SESSION_KEY);
}

/// Consume a session delivered in the current URL fragment, if any.
///
/// The fragment is cleared from the address bar so the token is not left
/// in history or shared links.
pub fn take_from_location() -> Option<Session> {
    #[cfg(feature = "csr")]
    {
        let window = web_sys::window()?;
        let hash = window.location().hash().ok()?;
        let session = parse_session_fragment(&hash)?;
        remember(&session);
        let path = window.location().pathname().unwrap_or_else(|_| "/".to_owned());
        let search = window.location().search().unwrap_or_default();
        if let Ok(history) = window.history() {
            let cleaned = format!("{path}{search}");
            if history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&cleaned)).is_err() {
                log::warn!("could not clear session fragment from the address bar");
            }
        }
        Some(session)
    }
    #[cfg(not(feature = "csr"))]
    {
        None
    }
}

/// Restore the session from the redirect fragment or storage and resolve
/// its user. A token the service rejects is forgotten.
pub async fn restore(store: &StoreClient) -> Option<(Session, SessionUser)> {
    let session = take_from_location().or_else(stored)?;
    match fetch_user(store, &session.access_token).await {
        Ok(user) => Some((session, user)),
        Err(StoreError::Unauthorized) => {
            log::debug!("stored session was rejected; signing out");
            forget();
            None
        }
        Err(e) => {
            log::warn!("could not resolve session user: {e}");
            None
        }
    }
}
