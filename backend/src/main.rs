use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pet_memorial_backend::config::AppConfig;
use pet_memorial_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Starting memorial service (store: {:?}, ownership: {:?})",
        config.store, config.ownership
    );

    let state = initialize_backend(&config)?;
    let app = create_router(state, &config)?;

    // Start the server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
