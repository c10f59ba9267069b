//! Session use-cases on top of the hosted authentication service.
//!
//! A token the hosted service rejects means "not signed in" and is reported
//! as `None`; an unreachable service is still an error so callers can tell
//! an outage from a signed-out visitor.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::backend_failure::map_backend_error;
use crate::domain::ports::{AuthGateway, BackendError};
use crate::domain::{
    AccessToken, AuthSession, AuthUser, Caller, Error, RefreshToken, SignInCredentials,
};

/// Session use-cases backed by an [`AuthGateway`].
#[derive(Clone)]
pub struct SessionService {
    auth: Arc<dyn AuthGateway>,
}

impl SessionService {
    /// Create a new service with the given gateway.
    pub fn new(auth: Arc<dyn AuthGateway>) -> Self {
        Self { auth }
    }

    fn is_rejection(error: &BackendError) -> bool {
        matches!(
            error,
            BackendError::Unauthorized { .. } | BackendError::Rejected { .. } | BackendError::NotFound
        )
    }

    /// Exchange credentials for a hosted session.
    pub async fn sign_in(&self, credentials: &SignInCredentials) -> Result<AuthSession, Error> {
        self.auth
            .sign_in_with_password(credentials)
            .await
            .map_err(|error| {
                if Self::is_rejection(&error) {
                    debug!(error = %error, "sign-in rejected");
                    Error::unauthorized("invalid credentials")
                } else {
                    map_backend_error(error)
                }
            })
    }

    /// Resolve the signed-in user, or `None` when there is no valid session.
    pub async fn current_user(&self, caller: &Caller) -> Result<Option<AuthUser>, Error> {
        let Some(access_token) = caller.access_token() else {
            return Ok(None);
        };
        match self.auth.fetch_user(access_token).await {
            Ok(user) => Ok(Some(user)),
            Err(error) if Self::is_rejection(&error) => {
                debug!(error = %error, "session token rejected");
                Ok(None)
            }
            Err(error) => Err(map_backend_error(error)),
        }
    }

    /// Mint a fresh session, or `None` when the refresh token is rejected.
    pub async fn refresh(&self, refresh_token: &RefreshToken) -> Result<Option<AuthSession>, Error> {
        match self.auth.refresh_session(refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(error) if Self::is_rejection(&error) => {
                debug!(error = %error, "refresh token rejected");
                Ok(None)
            }
            Err(error) => Err(map_backend_error(error)),
        }
    }

    /// Revoke the session at the hosted service.
    ///
    /// Failures are logged and swallowed; the caller clears its local
    /// session regardless.
    pub async fn sign_out(&self, access_token: &AccessToken) {
        if let Err(error) = self.auth.sign_out(access_token).await {
            warn!(error = %error, "failed to revoke hosted session");
        }
    }
}
