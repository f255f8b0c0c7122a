use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use warden::logging::{DEFAULT_LOG_DIR, init_tracing};
use warden::router::init_router;
use warden::state::{AppConfig, init_app_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    init_tracing(&log_dir).context("Failed to create log directory")?;

    let config = AppConfig::from_env();
    let state = init_app_state(&config).await?;
    let app = init_router(state);

    let endpoint = config.server.listen_endpoint();
    let listener = tokio::net::TcpListener::bind(&endpoint)
        .await
        .with_context(|| format!("Failed to bind {}", endpoint))?;

    info!(
        service = %config.server.service_name,
        environment = %config.server.environment,
        "Server running on {}",
        config.server.schema_versioned_endpoint("")
    );
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
