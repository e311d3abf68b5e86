use serde::{Deserialize, Serialize};

use crate::{
    application::services::IconListing,
    domain::models::icon::{
        StorageBackend, StorageMode, StoredIcon, UploadError, UploadSummary, UploadedFile,
    },
};

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadedFileResponse {
    pub filename: String,
    pub url: String,
    pub storage: StorageBackend,
}

impl From<UploadedFile> for UploadedFileResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            filename: file.name,
            url: file.url,
            storage: file.storage_backend,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadErrorResponse {
    pub filename: String,
    pub error: String,
}

impl From<UploadError> for UploadErrorResponse {
    fn from(error: UploadError) -> Self {
        Self {
            filename: error.filename,
            error: error.message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadIconsResponse {
    pub success: bool,
    #[serde(rename = "uploadedFiles")]
    pub uploaded_files: Vec<UploadedFileResponse>,
    #[serde(rename = "cloudUploads")]
    pub cloud_uploads: usize,
    #[serde(rename = "localUploads")]
    pub local_uploads: usize,
    #[serde(rename = "storageMode")]
    pub storage_mode: StorageMode,
    pub errors: Vec<UploadErrorResponse>,
    pub message: String,
}

impl From<UploadSummary> for UploadIconsResponse {
    fn from(summary: UploadSummary) -> Self {
        let success = summary.is_success();
        let cloud_uploads = summary.cloud_uploads();
        let local_uploads = summary.local_uploads();
        let message = upload_message(cloud_uploads + local_uploads, summary.storage_mode);

        // Cloud files first, then local ones, each in archive order.
        let (cloud, local): (Vec<_>, Vec<_>) = summary
            .files_succeeded
            .into_iter()
            .partition(|f| f.storage_backend == StorageBackend::Cloud);

        Self {
            success,
            uploaded_files: cloud.into_iter().chain(local).map(Into::into).collect(),
            cloud_uploads,
            local_uploads,
            storage_mode: summary.storage_mode,
            errors: summary.errors.into_iter().map(Into::into).collect(),
            message,
        }
    }
}

fn upload_message(total: usize, mode: StorageMode) -> String {
    let target = match mode {
        StorageMode::Cloud => "cloud storage",
        StorageMode::Local => "local storage",
        StorageMode::Both => "both cloud and local storage",
        StorageMode::None => return "No files were uploaded due to errors".to_string(),
    };
    format!("Successfully uploaded {} icons to {}", total, target)
}

#[derive(Debug, Deserialize)]
pub struct ListIconsQuery {
    pub provider: Option<String>,
}

impl ListIconsQuery {
    /// Blank filters mean "every provider".
    pub fn provider(&self) -> Option<&str> {
        self.provider
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IconResponse {
    pub name: String,
    pub provider: String,
    pub url: String,
    pub storage: StorageBackend,
}

impl From<StoredIcon> for IconResponse {
    fn from(icon: StoredIcon) -> Self {
        Self {
            name: icon.name,
            provider: icon.provider,
            url: icon.url,
            storage: icon.storage,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListIconsResponse {
    pub success: bool,
    pub files: Vec<IconResponse>,
    #[serde(rename = "cloudFiles")]
    pub cloud_files: usize,
    #[serde(rename = "localFiles")]
    pub local_files: usize,
    #[serde(rename = "totalFiles")]
    pub total_files: usize,
}

impl From<IconListing> for ListIconsResponse {
    fn from(listing: IconListing) -> Self {
        Self {
            success: true,
            total_files: listing.files.len(),
            files: listing.files.into_iter().map(Into::into).collect(),
            cloud_files: listing.cloud_files,
            local_files: listing.local_files,
        }
    }
}
