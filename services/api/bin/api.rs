//! Main Entrypoint for the Call Relay Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Loading the agent prompts.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and hanging up live calls on shutdown.

use anyhow::Context;
use callrelay_api::{
    config::{Config, load_prompts},
    recorder::LogRecorder,
    router::create_router,
    state::AppState,
    ws::registry::CallRegistry,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Listens for the `Ctrl+C` signal, then tells every live call to hang up.
async fn shutdown_signal(calls: Arc<CallRegistry>) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
    calls.shutdown();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Load Prompts ---
    let prompts = load_prompts(&config.prompts_path).with_context(|| {
        format!("Failed to read prompts from {}", config.prompts_path.display())
    })?;

    let bind_address = config.bind_address;
    let app_state = Arc::new(AppState::new(config, prompts, Arc::new(LogRecorder)));
    let calls = app_state.calls.clone();

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state.clone()).layer(cors);

    // --- 5. Start Server ---
    info!(
        model = %app_state.config.realtime_model,
        soft_cap = ?app_state.config.policy.soft_cap(),
        hard_cap = ?app_state.config.policy.hard_cap(),
        bind_address = %bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(calls.clone()))
    .await?;

    calls.wait_idle(SHUTDOWN_GRACE).await;
    info!("Server has shut down.");
    Ok(())
}
