//! Application settings loaded via OrthoConfig from CLI flags, `BLOG_*`
//! environment variables, or a configuration file.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::outbound::hosted::PublicKey;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Raw settings as supplied by the operator.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOG")]
pub struct AppSettings {
    /// Base URL of the hosted backend project.
    pub backend_url: Option<String>,
    /// Public (anonymous) API key for the hosted backend.
    pub backend_key: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Timeout applied to every hosted backend request.
    pub request_timeout_secs: Option<u64>,
}

/// Settings after validation, ready for server construction.
#[derive(Debug)]
pub struct HostedSettings {
    pub backend_url: Url,
    pub backend_key: PublicKey,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
}

/// Reasons the supplied settings cannot start the server.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{name} is required")]
    Missing { name: &'static str },
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl AppSettings {
    /// Validate the raw settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the backend URL or key is absent, when
    /// a value cannot be parsed, or when the timeout is zero.
    pub fn validate(&self) -> Result<HostedSettings, SettingsError> {
        let raw_url = required(self.backend_url.as_deref(), "BLOG_BACKEND_URL")?;
        let backend_url = Url::parse(raw_url).map_err(|err| SettingsError::Invalid {
            name: "BLOG_BACKEND_URL",
            reason: err.to_string(),
        })?;
        let backend_key = PublicKey::new(required(
            self.backend_key.as_deref(),
            "BLOG_BACKEND_KEY",
        )?);

        let bind_addr = self
            .bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|err| SettingsError::Invalid {
                name: "BLOG_BIND_ADDR",
                reason: err.to_string(),
            })?;

        let secs = self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if secs == 0 {
            return Err(SettingsError::Invalid {
                name: "BLOG_REQUEST_TIMEOUT_SECS",
                reason: "must be at least one second".to_owned(),
            });
        }

        Ok(HostedSettings {
            backend_url,
            backend_key,
            bind_addr,
            request_timeout: Duration::from_secs(secs),
        })
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, SettingsError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SettingsError::Missing { name })
}
