use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use party_server::{
    config::Config, create_routes, groups::GroupManager, websocket::ConnectionRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting party games server...");

    let config = Arc::new(Config::from_env().context("invalid server configuration")?);
    info!(
        "Rounds last {}s, votes {}s, {} games enabled",
        config.round_seconds,
        config.vote_seconds,
        config.enabled_games.len()
    );

    let registry = Arc::new(ConnectionRegistry::new());
    let groups = Arc::new(GroupManager::new(
        registry.clone(),
        config.round_settings(),
    ));

    let routes = create_routes(registry.clone(), groups.clone(), config.clone());

    // Drop connections that stopped talking
    let cleanup_groups = groups.clone();
    let connection_timeout = config.connection_timeout();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            cleanup_groups
                .cleanup_inactive_connections(connection_timeout)
                .await;
        }
    });

    let host = config
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("invalid HOST '{}'", config.host))?;

    info!("Server starting on {}:{}", config.host, config.port);

    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown((host, config.port), shutdown_signal())
        .context("failed to bind server address")?;

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to install signal handlers: {}", e);
            }
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}
