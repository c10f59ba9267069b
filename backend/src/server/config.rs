//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite, time::Duration};
use blog_backend::config::HostedSettings;
use blog_backend::inbound::http::session_config::SessionSettings;
use blog_backend::outbound::hosted::HostedClient;

/// Everything `create_server` needs, gathered at startup.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl: Duration,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) client: HostedClient,
}

impl ServerConfig {
    /// Combine validated session and hosted backend settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be built.
    pub fn new(session: SessionSettings, hosted: HostedSettings) -> Result<Self, reqwest::Error> {
        let HostedSettings {
            backend_url,
            backend_key,
            bind_addr,
            request_timeout,
        } = hosted;
        let client = HostedClient::new(backend_url, backend_key, request_timeout)?;
        Ok(Self {
            key: session.key,
            cookie_secure: session.cookie_secure,
            same_site: session.same_site,
            session_ttl: session.ttl,
            bind_addr,
            client,
        })
    }
}
