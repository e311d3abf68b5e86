use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::state::AppState;

pub const SUPPORTED_MODELS: [&str; 3] = [
    "text-embedding-3-small",
    "text-embedding-3-large",
    "local-model",
];

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    #[serde(rename = "localEmbeddings")]
    pub local_embeddings: bool,
    #[serde(rename = "localEmbeddingsOnly")]
    pub local_embeddings_only: bool,
    pub openai: bool,
    #[serde(rename = "supportedModels")]
    pub supported_models: Vec<String>,
}

pub struct HealthController;

impl HealthController {
    /// GET /api/health
    pub async fn health_check() -> Json<HealthResponse> {
        info!("Health check requested");

        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: Utc::now(),
        })
    }

    /// GET /api/capabilities
    pub async fn capabilities(State(app_state): State<AppState>) -> Json<CapabilitiesResponse> {
        info!("Capabilities requested");

        Json(CapabilitiesResponse {
            local_embeddings: true,
            local_embeddings_only: app_state.use_local_embeddings,
            openai: true,
            supported_models: SUPPORTED_MODELS.iter().map(|m| m.to_string()).collect(),
        })
    }
}
