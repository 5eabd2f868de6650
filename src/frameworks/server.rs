// Framework bootstrap for the lobby server runtime.

use crate::frameworks::config;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::scheduler::spawn_background_tasks;
use crate::use_cases::{Lobby, LobbySettings};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the lobby on a pre-bound listener with settings from the environment.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    serve(listener, config::lobby_settings()).await
}

/// Serves the lobby on a pre-bound listener with explicit settings.
pub async fn serve(listener: tokio::net::TcpListener, settings: LobbySettings) -> Result<()> {
    let address = listener.local_addr()?;

    // All matchmaking, routing and stats state lives behind this one lobby.
    let lobby = Arc::new(Lobby::new(settings, Arc::new(SystemClock)));
    let tasks = spawn_background_tasks(&lobby);
    tracing::debug!(
        stats_interval_ms = lobby.settings().stats_interval.as_millis(),
        daily_reset_check_ms = lobby.settings().daily_reset_check_interval.as_millis(),
        "lobby timers started"
    );

    let app = routes::app(Arc::new(AppState { lobby }));

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });

    for task in tasks {
        task.abort();
    }
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::http_host(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}
