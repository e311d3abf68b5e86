use axum::extract::FromRef;
use std::sync::Arc;

use crate::application::services::IconService;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub icon_service: Arc<IconService>,
    pub use_local_embeddings: bool,
}
