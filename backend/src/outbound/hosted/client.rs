//! Shared reqwest handle for the hosted authentication and REST APIs.
//!
//! The client owns the base URL, the public API key, and one connection
//! pool with an explicit request timeout. Adapters borrow it to build
//! requests; every response passes through [`HostedClient::send`] so status
//! and transport failures are translated in one place.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use zeroize::Zeroizing;

use super::error_mapping::{map_status_error, map_transport_error};
use crate::domain::{Caller, TraceId};
use crate::domain::ports::BackendError;

const REST_PREFIX: &str = "rest/v1";
const AUTH_PREFIX: &str = "auth/v1";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Public (anonymous) API key issued by the hosted backend.
///
/// The key is sent on every request; its value never appears in `Debug`
/// output.
#[derive(Clone)]
pub struct PublicKey(Zeroizing<String>);

impl PublicKey {
    /// Wrap a raw key.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PublicKey(<redacted>)")
    }
}

/// Connection handle shared by the hosted adapters.
#[derive(Clone)]
pub struct HostedClient {
    http: Client,
    base_url: Url,
    public_key: Arc<PublicKey>,
}

impl fmt::Debug for HostedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedClient")
            .field("base_url", &self.base_url.as_str())
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl HostedClient {
    /// Build a client using a reqwest connection pool with an explicit
    /// request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        public_key: PublicKey,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            public_key: Arc::new(public_key),
        })
    }

    /// Base URL of the hosted project.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, prefix: &str, path: &str) -> Result<Url, BackendError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let raw = format!("{base}/{prefix}/{}", path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|error| {
            BackendError::transport(format!("invalid hosted backend url {raw}: {error}"))
        })
    }

    pub(crate) fn rest_url(&self, table: &str) -> Result<Url, BackendError> {
        self.endpoint(REST_PREFIX, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> Result<Url, BackendError> {
        self.endpoint(AUTH_PREFIX, path)
    }

    fn request(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header("apikey", self.public_key.expose())
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json");
        match TraceId::current() {
            Some(trace_id) => builder.header(REQUEST_ID_HEADER, trace_id.to_string()),
            None => builder,
        }
    }

    /// Start a REST request against `table` on behalf of `caller`.
    ///
    /// Signed-in callers forward their access token so row-level policies
    /// apply; anonymous callers use the public key as the bearer.
    pub(crate) fn rest(
        &self,
        method: Method,
        table: &str,
        caller: &Caller,
    ) -> Result<RequestBuilder, BackendError> {
        let bearer = caller
            .access_token()
            .map_or_else(|| self.public_key.expose(), |token| token.expose());
        Ok(self.request(method, self.rest_url(table)?, bearer))
    }

    /// Start an authentication API request.
    ///
    /// `bearer` defaults to the public key when no user token is supplied.
    pub(crate) fn auth(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<RequestBuilder, BackendError> {
        let bearer = bearer.unwrap_or_else(|| self.public_key.expose());
        Ok(self.request(method, self.auth_url(path)?, bearer))
    }

    /// Send a request and return the body of a successful response.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, BackendError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}
