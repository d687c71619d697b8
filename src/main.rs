//! Pomodoro Queue - A state-managed HTTP server driving a Pomodoro timer
//! 
//! This is the main entry point for the pomodoro-queue application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use pomodoro_queue::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::{tick_channel, tick_driver_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_queue={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-queue server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}", config.host, config.port);

    let templates = config.load_templates().map_err(anyhow::Error::msg)?;

    // Create application state; scheduled ticks arrive on tick_rx
    let (tick_tx, tick_rx) = tick_channel();
    let state = Arc::new(AppState::new(config.port, config.host.clone(), templates, tick_tx));

    // Start the tick driver background task
    let driver_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_driver_task(driver_state, tick_rx).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /work    - Start work sequence / stop timer");
    info!("  POST /break   - Start break sequence / stop timer");
    info!("  GET  /display - Current rendered frame");
    info!("  GET  /status  - Timer and server status");
    info!("  GET  /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
