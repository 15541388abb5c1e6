use anyhow::Context;
use axum_backend::{config::ServerConfig, create_app};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Floorplan Region Server");

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    info!(
        "Region defaults: edge tolerance {}, minimum area {}",
        config.region_config.edge_tolerance, config.region_config.min_region_area
    );

    let app = create_app(&config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
