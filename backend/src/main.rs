//! Backend entry point: loads settings, installs tracing, and serves the
//! blog API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use blog_backend::config::AppSettings;
use blog_backend::inbound::http::health::HealthState;
use blog_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .context("load BLOG_* settings")?
        .validate()
        .context("validate BLOG_* settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .context("load SESSION_* settings")?;
    let config = ServerConfig::new(session, settings).context("build hosted backend client")?;

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?
        .await
        .context("http server")?;
    Ok(())
}
