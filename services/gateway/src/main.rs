mod config;
mod error;
mod handlers;
mod models;
mod router;
mod state;

use config::GatewayConfig;
use router::create_router;
use state::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting matchmaker gateway");

    let config = GatewayConfig::from_env()?;
    let addr = config.bind_addr;
    let buckets: Vec<&str> = config.buckets.labels().map(|label| label.as_str()).collect();
    tracing::info!(buckets = ?buckets, "Bucket table loaded");

    // Registry, queue store and matcher live for the whole process
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
