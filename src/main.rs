mod adapters;
mod application;
mod domain;
mod services;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use adapters::{router::create_router, state::AppState};
use application::services::IconService;
use domain::config::app::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize AWS SDK crypto provider (required for aws-sdk-s3)
    // This must be called before any AWS SDK operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let config = AppConfig::from_env().expect("ERROR: Invalid configuration");

    tracing::info!(
        "Starting icon-vault-service (bucket: {}, local mirror: {}, local embeddings: {})",
        config.cloud.bucket,
        config.local.root_dir.display(),
        config.use_local_embeddings
    );

    // Both backends are created once and shared by every request
    let (cloud_storage, local_storage) = tokio::join!(
        services::create_cloud_storage(&config.cloud),
        services::create_local_storage(&config.local)
    );
    let local_storage = local_storage.expect("ERROR: Failed to create local storage directory");

    let app_state = AppState {
        icon_service: Arc::new(IconService::new(cloud_storage, local_storage)),
        use_local_embeddings: config.use_local_embeddings,
    };

    let router = create_router(app_state, &config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", config.port);
    tracing::info!("Accepting requests from: {:?}", config.allowed_origins);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
