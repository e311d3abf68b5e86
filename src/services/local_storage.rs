use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::{
    application::services::IconStorage,
    domain::{
        config::app::LocalStorageConfig,
        models::icon::{is_svg_name, StorageBackend, StoredIcon},
    },
    services::error::StorageError,
};

/// Filesystem mirror laid out as `{root}/{provider}/{filename}` and served
/// under `{url_prefix}/{provider}/{filename}`.
pub struct LocalIconStorage {
    root_dir: PathBuf,
    url_prefix: String,
}

impl LocalIconStorage {
    pub fn new(config: &LocalStorageConfig) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            url_prefix: config.url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(self.root_dir()).await?;
        info!(
            "Local storage directory initialized at: {}",
            self.root_dir().display()
        );
        Ok(())
    }

    fn url_for(&self, provider: &str, filename: &str) -> String {
        format!("{}/{}/{}", self.url_prefix, provider, filename)
    }

    async fn list_provider(&self, provider: &str) -> Result<Vec<StoredIcon>, StorageError> {
        let provider_dir = self.root_dir.join(single_segment(provider)?);

        let mut icons = Vec::new();
        let mut entries = match fs::read_dir(&provider_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(icons),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_svg_name(&name) {
                continue;
            }

            icons.push(StoredIcon {
                url: self.url_for(provider, &name),
                name,
                provider: provider.to_string(),
                storage: StorageBackend::Local,
            });
        }

        icons.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(icons)
    }

    async fn provider_dirs(&self) -> Result<Vec<String>, StorageError> {
        let mut providers = Vec::new();
        let mut entries = match fs::read_dir(&self.root_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(providers),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                providers.push(name);
            }
        }

        providers.sort();
        Ok(providers)
    }
}

/// Accepts only a single normal path component, so callers cannot climb out
/// of the storage root.
fn single_segment(segment: &str) -> Result<&str, StorageError> {
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !segment.contains(['/', '\\']) => Ok(segment),
        _ => Err(StorageError::InvalidPath(segment.to_string())),
    }
}

#[async_trait]
impl IconStorage for LocalIconStorage {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn store(
        &self,
        provider: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<String, StorageError> {
        let provider_dir = self.root_dir.join(single_segment(provider)?);
        let file_path = provider_dir.join(single_segment(filename)?);

        fs::create_dir_all(&provider_dir).await?;
        fs::write(&file_path, content).await?;

        Ok(self.url_for(provider, filename))
    }

    async fn list(&self, provider: Option<&str>) -> Result<Vec<StoredIcon>, StorageError> {
        let providers = match provider {
            Some(provider) => vec![provider.to_string()],
            None => self.provider_dirs().await?,
        };

        let mut icons = Vec::new();
        for provider in providers {
            match self.list_provider(&provider).await {
                Ok(mut found) => icons.append(&mut found),
                Err(e) => warn!("Error reading provider directory {}: {}", provider, e),
            }
        }

        Ok(icons)
    }
}
