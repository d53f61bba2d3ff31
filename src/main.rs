use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishscan_backend_core::{app_config, build_router, initialize_app_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishscan_backend_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = app_config::config();
    info!(
        "Starting PhishScan backend on {} ({})",
        config.bind_address, config.environment
    );

    let state = initialize_app_state(config)
        .await
        .context("Failed to initialize application state")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state))
        .await
        .context("HTTP server terminated")?;

    Ok(())
}
