use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::warn;

use crate::{
    adapters::{
        controllers::{health_controller::HealthController, icon_controller::IconController},
        error::panic_response,
        state::AppState,
    },
    domain::config::app::AppConfig,
};

pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    let api_routes = Router::new()
        .route("/api/health", get(HealthController::health_check))
        .route("/api/capabilities", get(HealthController::capabilities))
        .route("/api/icons", get(IconController::list_icons))
        .route("/api/upload/icons", post(IconController::upload_icons))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    Router::new()
        .merge(api_routes)
        .nest_service(
            &config.local.url_prefix,
            ServeDir::new(&config.local.root_dir),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(&config.allowed_origins))
        .with_state(app_state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        // Allow all origins if none are configured (only for development)
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
