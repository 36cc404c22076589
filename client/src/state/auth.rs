//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Provided as `RwSignal<AuthState>` context. Buying, highlighting, likes
//! and the my-bricks page read the user from here.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use uuid::Uuid;

use crate::net::store::StoreClient;
use crate::net::types::{Session, SessionUser};

/// Current user, their session, and whether the session is still resolving.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub session: Option<Session>,
    pub loading: bool,
}

impl AuthState {
    pub fn resolving() -> Self {
        Self { loading: true, ..Self::default() }
    }

    pub fn signed_in(session: Session, user: SessionUser) -> Self {
        Self { user: Some(user), session: Some(session), loading: false }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    /// Store client that acts as this user when signed in.
    pub fn store(&self, base: &StoreClient) -> StoreClient {
        base.with_token(self.access_token())
    }
}
