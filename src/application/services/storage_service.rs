use async_trait::async_trait;

use crate::{
    domain::models::icon::{StorageBackend, StoredIcon},
    services::StorageError,
};

/// A place icons can be written to and listed from, keyed by `{provider}/{filename}`.
#[async_trait]
pub trait IconStorage: Send + Sync {
    fn backend(&self) -> StorageBackend;

    /// Stores one SVG and returns the URL it can be fetched from.
    async fn store(
        &self,
        provider: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<String, StorageError>;

    /// Lists stored SVGs, optionally restricted to one provider.
    async fn list(&self, provider: Option<&str>) -> Result<Vec<StoredIcon>, StorageError>;
}
