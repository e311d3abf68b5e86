use std::{collections::HashSet, sync::Arc};

use tracing::{info, warn};

use crate::{
    application::{error::BackendWriteFailure, services::IconStorage},
    domain::models::icon::{
        ExtractedFile, StorageBackend, StoredIcon, UploadError, UploadSummary, UploadedFile,
    },
};

/// Result of reconciling both backends for one listing request.
#[derive(Debug, Clone)]
pub struct IconListing {
    pub files: Vec<StoredIcon>,
    pub cloud_files: usize,
    pub local_files: usize,
}

/// Writes icons to the cloud backend with a local fallback, and lists the
/// union of both.
pub struct IconService {
    cloud: Arc<dyn IconStorage>,
    local: Arc<dyn IconStorage>,
}

impl IconService {
    pub fn new(cloud: Arc<dyn IconStorage>, local: Arc<dyn IconStorage>) -> Self {
        Self { cloud, local }
    }

    /// Stores a single file on exactly one backend: cloud first, local only if
    /// the cloud write failed.
    pub async fn store_file(
        &self,
        provider: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<UploadedFile, BackendWriteFailure> {
        let cloud_error = match self.cloud.store(provider, filename, content).await {
            Ok(url) => {
                info!(
                    "Stored {}/{} in {} storage: {}",
                    provider,
                    filename,
                    self.cloud.backend().as_str(),
                    url
                );
                return Ok(uploaded(provider, filename, url, self.cloud.backend()));
            }
            Err(e) => e,
        };

        warn!(
            "Cloud upload failed for {}/{}: {}. Falling back to local storage",
            provider, filename, cloud_error
        );

        match self.local.store(provider, filename, content).await {
            Ok(url) => {
                info!(
                    "Stored {}/{} in {} storage: {}",
                    provider,
                    filename,
                    self.local.backend().as_str(),
                    url
                );
                Ok(uploaded(provider, filename, url, self.local.backend()))
            }
            Err(local_error) => Err(BackendWriteFailure {
                cloud: cloud_error,
                local: local_error,
            }),
        }
    }

    /// Stores every extracted file independently and summarises the outcome.
    pub async fn upload_icons(&self, provider: &str, files: Vec<ExtractedFile>) -> UploadSummary {
        let mut succeeded = Vec::with_capacity(files.len());
        let mut errors = Vec::new();

        for file in files {
            let content = match file.content {
                Ok(content) => content,
                Err(message) => {
                    errors.push(UploadError {
                        filename: file.path,
                        message,
                    });
                    continue;
                }
            };

            match self.store_file(provider, &file.name, &content).await {
                Ok(uploaded) => succeeded.push(uploaded),
                Err(failure) => {
                    warn!("Could not store {}: {}", file.path, failure);
                    errors.push(UploadError {
                        filename: file.path,
                        message: failure.to_string(),
                    });
                }
            }
        }

        let summary = UploadSummary::new(succeeded, errors);
        info!(
            "Upload summary for provider '{}': {} cloud, {} local, {} errors, mode {:?}",
            provider,
            summary.cloud_uploads(),
            summary.local_uploads(),
            summary.errors.len(),
            summary.storage_mode
        );

        summary
    }

    /// Lists icons from both backends. A backend that cannot be read
    /// contributes nothing; cloud entries win on `(name, provider)` clashes.
    pub async fn list_icons(&self, provider: Option<&str>) -> IconListing {
        let (cloud_result, local_result) =
            tokio::join!(self.cloud.list(provider), self.local.list(provider));

        let cloud_files = cloud_result.unwrap_or_else(|e| {
            warn!("Error listing cloud files: {}", e);
            Vec::new()
        });
        let local_files = local_result.unwrap_or_else(|e| {
            warn!("Error listing local files: {}", e);
            Vec::new()
        });

        info!(
            "Found {} files in cloud storage and {} in local storage",
            cloud_files.len(),
            local_files.len()
        );

        let (cloud_count, local_count) = (cloud_files.len(), local_files.len());
        IconListing {
            files: merge_listings(cloud_files, local_files),
            cloud_files: cloud_count,
            local_files: local_count,
        }
    }
}

fn uploaded(provider: &str, filename: &str, url: String, backend: StorageBackend) -> UploadedFile {
    UploadedFile {
        name: filename.to_string(),
        provider: provider.to_string(),
        url,
        storage_backend: backend,
    }
}

fn merge_listings(primary: Vec<StoredIcon>, secondary: Vec<StoredIcon>) -> Vec<StoredIcon> {
    let seen: HashSet<(String, String)> = primary
        .iter()
        .map(|icon| (icon.name.clone(), icon.provider.clone()))
        .collect();

    let mut merged = primary;
    merged.extend(
        secondary
            .into_iter()
            .filter(|icon| !seen.contains(&(icon.name.clone(), icon.provider.clone()))),
    );
    merged
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        domain::models::icon::StorageMode,
        test_utils::{svg_file, unreadable_file, MemoryStorage},
    };

    fn service(cloud: &Arc<MemoryStorage>, local: &Arc<MemoryStorage>) -> IconService {
        IconService::new(cloud.clone(), local.clone())
    }

    #[tokio::test]
    async fn healthy_cloud_takes_every_file() {
        let cloud = MemoryStorage::cloud();
        let local = MemoryStorage::local();

        let summary = service(&cloud, &local)
            .upload_icons("aws", vec![svg_file("a.svg"), svg_file("b.svg")])
            .await;

        assert_eq!(summary.cloud_uploads(), 2);
        assert_eq!(summary.local_uploads(), 0);
        assert_eq!(summary.storage_mode, StorageMode::Cloud);
        assert!(summary.errors.is_empty());
        assert_eq!(cloud.stored_keys(), vec!["aws/a.svg", "aws/b.svg"]);
        assert!(local.stored_keys().is_empty());
    }

    #[tokio::test]
    async fn cloud_failure_falls_back_to_local() {
        let cloud = MemoryStorage::cloud();
        cloud.fail_writes(true);
        let local = MemoryStorage::local();

        let stored = service(&cloud, &local)
            .store_file("aws", "a.svg", b"<svg/>")
            .await
            .unwrap();

        assert_eq!(stored.storage_backend, StorageBackend::Local);
        assert_eq!(stored.url, "/cloudicons/aws/a.svg");
        assert!(cloud.stored_keys().is_empty());
        assert_eq!(local.stored_keys(), vec!["aws/a.svg"]);
    }

    #[tokio::test]
    async fn both_failures_carry_both_messages() {
        let cloud = MemoryStorage::cloud();
        cloud.fail_writes(true);
        let local = MemoryStorage::local();
        local.fail_writes(true);

        let failure = service(&cloud, &local)
            .store_file("aws", "a.svg", b"<svg/>")
            .await
            .unwrap_err();

        let message = failure.to_string();
        assert!(message.contains("cloud write refused"));
        assert!(message.contains("local write refused"));
    }

    #[tokio::test]
    async fn failed_files_do_not_stop_the_rest() {
        let cloud = MemoryStorage::cloud();
        cloud.fail_writes_for("b.svg");
        let local = MemoryStorage::local();
        local.fail_writes_for("b.svg");

        let summary = service(&cloud, &local)
            .upload_icons(
                "gcp",
                vec![svg_file("a.svg"), svg_file("b.svg"), svg_file("c.svg")],
            )
            .await;

        assert_eq!(summary.files_succeeded.len(), 2);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].filename, "icons/b.svg");
        assert!(summary.is_success());
        assert!(summary
            .files_succeeded
            .iter()
            .all(|f| f.name != "b.svg"));
    }

    #[tokio::test]
    async fn unreadable_entries_become_errors_without_a_write() {
        let cloud = MemoryStorage::cloud();
        let local = MemoryStorage::local();

        let summary = service(&cloud, &local)
            .upload_icons("aws", vec![svg_file("a.svg"), unreadable_file("b.svg")])
            .await;

        assert_eq!(summary.files_succeeded.len(), 1);
        assert_eq!(summary.errors[0].filename, "icons/b.svg");
        assert_eq!(summary.errors[0].message, "Invalid checksum");
        assert_eq!(cloud.stored_keys(), vec!["aws/a.svg"]);
        assert!(local.stored_keys().is_empty());
    }

    #[tokio::test]
    async fn mixed_backends_report_both() {
        let cloud = MemoryStorage::cloud();
        cloud.fail_writes_for("b.svg");
        let local = MemoryStorage::local();

        let summary = service(&cloud, &local)
            .upload_icons("aws", vec![svg_file("a.svg"), svg_file("b.svg")])
            .await;

        assert_eq!(summary.storage_mode, StorageMode::Both);
        assert_eq!(summary.cloud_uploads(), 1);
        assert_eq!(summary.local_uploads(), 1);
    }

    #[tokio::test]
    async fn everything_failing_is_mode_none() {
        let cloud = MemoryStorage::cloud();
        cloud.fail_writes(true);
        let local = MemoryStorage::local();
        local.fail_writes(true);

        let summary = service(&cloud, &local)
            .upload_icons("aws", vec![svg_file("a.svg")])
            .await;

        assert_eq!(summary.storage_mode, StorageMode::None);
        assert!(!summary.is_success());
        assert_eq!(summary.errors.len(), 1);
    }

    #[tokio::test]
    async fn listing_prefers_cloud_on_collision() {
        let cloud = MemoryStorage::cloud();
        cloud.insert("aws", "logo.svg");
        let local = MemoryStorage::local();
        local.insert("aws", "logo.svg");
        local.insert("aws", "extra.svg");
        local.insert("gcp", "logo.svg");

        let listing = service(&cloud, &local).list_icons(None).await;

        assert_eq!(listing.cloud_files, 1);
        assert_eq!(listing.local_files, 3);
        assert_eq!(listing.files.len(), 3);

        let logos: Vec<_> = listing
            .files
            .iter()
            .filter(|f| f.name == "logo.svg" && f.provider == "aws")
            .collect();
        assert_eq!(logos.len(), 1);
        assert_eq!(logos[0].storage, StorageBackend::Cloud);
    }

    #[tokio::test]
    async fn listing_respects_provider_filter() {
        let cloud = MemoryStorage::cloud();
        cloud.insert("aws", "a.svg");
        cloud.insert("gcp", "b.svg");
        let local = MemoryStorage::local();
        local.insert("gcp", "c.svg");

        let listing = service(&cloud, &local).list_icons(Some("gcp")).await;

        let names: Vec<_> = listing.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.svg", "c.svg"]);
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_to_empty() {
        let cloud = MemoryStorage::cloud();
        cloud.insert("aws", "a.svg");
        cloud.fail_lists(true);
        let local = MemoryStorage::local();
        local.insert("aws", "b.svg");

        let listing = service(&cloud, &local).list_icons(Some("aws")).await;

        assert_eq!(listing.cloud_files, 0);
        assert_eq!(listing.local_files, 1);
        assert_eq!(listing.files[0].storage, StorageBackend::Local);
    }
}
