//! Forgelink binary entry point.
//!
//! Kept thin: parse flags, read the environment, build the router, serve.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forgelink::config::{Args, Config};
use forgelink::server::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forgelink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_env(&args);
    tracing::info!(
        listen = %config.listen,
        ratelimit = config.ratelimit,
        forwarded = config.trust_forwarded,
        "starting forgelink"
    );

    let state = AppState::new(config.clone());
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    // ConnectInfo feeds the rate limiter's per-client identity.
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install shutdown handler");
        // Without a signal handler there is nothing to wait for; serve
        // until the process is killed.
        std::future::pending::<()>().await;
    }
}
