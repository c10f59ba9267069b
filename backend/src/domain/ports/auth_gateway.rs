//! Driven port for the hosted authentication service.
//!
//! The adapter owns token exchange and user lookup over the network; the
//! domain only sees validated credentials, opaque tokens, and
//! [`BackendError`] outcomes.

use async_trait::async_trait;

use crate::domain::{AccessToken, AuthSession, AuthUser, RefreshToken, SignInCredentials};

use super::BackendError;

/// Port for session retrieval, refresh, and sign-out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange an email and password for a session.
    async fn sign_in_with_password(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<AuthSession, BackendError>;

    /// Resolve the account behind an access token.
    async fn fetch_user(&self, access_token: &AccessToken) -> Result<AuthUser, BackendError>;

    /// Mint a fresh session from a refresh token.
    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<AuthSession, BackendError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &AccessToken) -> Result<(), BackendError>;
}
