//! Service entry-point: loads settings, wires stores and serves the list API.

mod server;

use std::env;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{BuildMode, key_fingerprint, load_session_key};

use server::{ServerConfig, ServerSettings, build_http_state, create_server};

/// Application bootstrap.
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

    let settings = ServerSettings::load_from_iter(env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;

    let key = load_session_key(
        settings.session_key_file.as_deref(),
        BuildMode::from_debug_assertions(),
    )
    .wrap_err("failed to load session key")?;
    let fingerprint = key_fingerprint(&key);

    let http_state = build_http_state(&settings)
        .await
        .wrap_err("failed to prepare list stores")?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        http_state,
        ServerConfig::new(key, settings.cookie_secure(), bind_addr),
    )
    .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;

    info!(%bind_addr, session_key = %fingerprint, "listening");
    server.await.wrap_err("server terminated abnormally")
}
