pub mod error;
mod local_storage;
mod s3_storage;

pub use error::StorageError;
pub use local_storage::LocalIconStorage;
pub use s3_storage::S3IconStorage;

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    application::services::IconStorage,
    domain::config::app::{CloudStorageConfig, LocalStorageConfig},
};

/// Builds the cloud backend and tries to prepare its bucket. A bucket that
/// cannot be reached is not fatal: uploads will land in the local mirror.
pub async fn create_cloud_storage(config: &CloudStorageConfig) -> Arc<dyn IconStorage> {
    let storage = S3IconStorage::connect(config).await;

    match storage.ensure_bucket().await {
        Ok(()) => info!("Cloud storage initialized with bucket: {}", config.bucket),
        Err(e) => warn!(
            "Cloud storage initialization failed ({}), will use local storage fallback",
            e
        ),
    }

    Arc::new(storage)
}

pub async fn create_local_storage(
    config: &LocalStorageConfig,
) -> Result<Arc<dyn IconStorage>, StorageError> {
    let storage = LocalIconStorage::new(config);
    storage.ensure_root().await?;
    Ok(Arc::new(storage))
}
