//! Adapter for the hosted authentication API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use tracing::debug;

use super::HostedClient;
use super::dto::{AuthSessionDto, AuthUserDto, PasswordGrantDto, RefreshGrantDto};
use super::error_mapping::decode_json;
use crate::domain::ports::{AuthGateway, BackendError};
use crate::domain::{AccessToken, AuthSession, AuthUser, RefreshToken, SignInCredentials};

/// [`AuthGateway`] backed by the hosted authentication API.
#[derive(Debug, Clone)]
pub struct HostedAuthGateway {
    client: HostedClient,
}

impl HostedAuthGateway {
    /// Create a gateway sharing `client`.
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    fn token_request<B: serde::Serialize>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .client
            .auth(Method::POST, "token", None)?
            .query(&[("grant_type", grant_type)])
            .json(body))
    }

    async fn token_grant<B: serde::Serialize + Sync>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<AuthSession, BackendError> {
        let body = self
            .client
            .send(self.token_request(grant_type, body)?)
            .await?;
        decode_json::<AuthSessionDto>(&body)?.into_domain()
    }
}

#[async_trait]
impl AuthGateway for HostedAuthGateway {
    async fn sign_in_with_password(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<AuthSession, BackendError> {
        let grant = PasswordGrantDto {
            email: credentials.email(),
            password: credentials.password(),
        };
        let session = self.token_grant("password", &grant).await?;
        debug!(user_id = %session.user.id, "password grant accepted");
        Ok(session)
    }

    async fn fetch_user(&self, access_token: &AccessToken) -> Result<AuthUser, BackendError> {
        let request = self
            .client
            .auth(Method::GET, "user", Some(access_token.expose()))?;
        let body = self.client.send(request).await?;
        decode_json::<AuthUserDto>(&body)?.into_domain()
    }

    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<AuthSession, BackendError> {
        let grant = RefreshGrantDto {
            refresh_token: refresh_token.expose(),
        };
        self.token_grant("refresh_token", &grant).await
    }

    async fn sign_out(&self, access_token: &AccessToken) -> Result<(), BackendError> {
        let request = self
            .client
            .auth(Method::POST, "logout", Some(access_token.expose()))?;
        self.client.send(request).await?;
        Ok(())
    }
}
