//! Tool Hub Gateway — webhook proxy in front of the n8n backend

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use toolhub_gateway::config;
use toolhub_gateway::executor::Executor;
use toolhub_gateway::registry::Registry;
use toolhub_gateway::server::{self, AppState};
use toolhub_gateway::status::StatusPoller;
use toolhub_gateway::validator::Validator;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("TOOLHUB_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .compact()
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("Tool Hub Gateway starting...");

    let config = config::load_config().context("Failed to load gateway configuration")?;

    let registry = Arc::new(Registry::from_config(&config));
    info!("Registered {} webhooks: {}", registry.len(), registry.names().join(", "));

    let validator = Validator::new(config.uploads);
    let executor = Arc::new(Executor::new(validator, config.upstream.timeout()));

    let cancel = CancellationToken::new();

    let poller = StatusPoller::new(executor.clone(), &registry, &config.status);
    let status = poller.handle();
    if config.status.enabled {
        tokio::spawn(poller.run(cancel.child_token()));
    } else {
        info!("Backend status polling disabled");
    }

    let state = AppState {
        registry,
        executor,
        status,
    };
    let app = server::router(state, config.server.body_limit_bytes);

    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen_addr))?;

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for shutdown signal: {e}"),
        }
    });

    server::serve(listener, app, cancel).await?;

    info!("Tool Hub Gateway stopped");
    Ok(())
}
