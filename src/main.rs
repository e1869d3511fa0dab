//! Onboarding Edge Gateway - Main Entry Point
//!
//! Loads configuration, wires the token service, credential backend and
//! upstream client into the router, and serves with graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{info, warn};

use onboarding_edge::config::Config;
use onboarding_edge::credentials;
use onboarding_edge::gateway::{self, GatewayState};
use onboarding_edge::observability::init_logging;
use onboarding_edge::shutdown::wait_for_signal;
use onboarding_edge::token::SessionTokenService;
use onboarding_edge::upstream::UpstreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_logging();

    info!(
        upstream = config.upstream_url_str(),
        backend = ?config.credential_backend,
        "Starting onboarding edge gateway"
    );

    let upstream = Arc::new(UpstreamClient::new(
        config.upstream_url.clone(),
        Duration::from_secs(config.upstream_timeout_secs),
    )?);
    let tokens = Arc::new(SessionTokenService::new(
        config.token_secret.clone(),
        config.token_ttl_seconds,
    ));
    let credentials = credentials::from_config(&config, Arc::clone(&upstream));

    let state = GatewayState {
        tokens,
        credentials,
        upstream,
    };
    let app = gateway::router(
        state,
        &config.allowed_origin,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Gateway listening");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            joined??;
            info!("Gateway stopped");
            return Ok(());
        }
        () = wait_for_signal() => {
            info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(());
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(joined) => {
            joined??;
            info!("Gateway stopped");
        }
        Err(_) => {
            warn!("Shutdown timeout reached, abandoning open connections");
        }
    }

    Ok(())
}
