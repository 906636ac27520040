use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use beacon::analytics::{AnalyticsService, SystemClock};
use beacon::api::create_api_router;
use beacon::config::Config;
use beacon::storage;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    info!("Initializing database...");
    let store = storage::connect(&config.database).await?;
    info!("Database initialized successfully");

    let analytics = Arc::new(AnalyticsService::new(
        store,
        Arc::new(SystemClock),
        config.analytics.row_cap,
    ));
    info!(
        "Analytics limits: days <= {}, top_n <= {}, row cap {}",
        config.analytics.max_days, config.analytics.max_top_n, config.analytics.row_cap
    );

    let api_router = create_api_router(analytics, config.analytics.clone());

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);
    info!("   - Analytics report at http://{}/api/analytics", api_addr);

    axum::serve(api_listener, api_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
