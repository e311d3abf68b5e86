use serde::{Deserialize, Serialize};

pub const SVG_MIME_TYPE: &str = "image/svg+xml";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageBackend {
    #[serde(rename = "cloud")]
    Cloud,
    #[serde(rename = "local")]
    Local,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Cloud => "cloud",
            StorageBackend::Local => "local",
        }
    }
}

/// Which backend(s) received at least one file during an upload.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    #[serde(rename = "cloud")]
    Cloud,
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "both")]
    Both,
    #[serde(rename = "none")]
    None,
}

impl StorageMode {
    pub fn from_counts(cloud: usize, local: usize) -> Self {
        match (cloud > 0, local > 0) {
            (true, true) => StorageMode::Both,
            (true, false) => StorageMode::Cloud,
            (false, true) => StorageMode::Local,
            (false, false) => StorageMode::None,
        }
    }
}

/// A single SVG pulled out of an uploaded archive.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    /// Entry path as stored in the archive.
    pub path: String,
    /// Bare file name, directories stripped.
    pub name: String,
    /// Decompressed bytes, or why the entry could not be read.
    pub content: Result<Vec<u8>, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub provider: String,
    pub url: String,
    pub storage_backend: StorageBackend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadError {
    pub filename: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub files_succeeded: Vec<UploadedFile>,
    pub errors: Vec<UploadError>,
    pub storage_mode: StorageMode,
}

impl UploadSummary {
    pub fn new(files_succeeded: Vec<UploadedFile>, errors: Vec<UploadError>) -> Self {
        let storage_mode = StorageMode::from_counts(
            count_on(&files_succeeded, StorageBackend::Cloud),
            count_on(&files_succeeded, StorageBackend::Local),
        );

        Self {
            files_succeeded,
            errors,
            storage_mode,
        }
    }

    pub fn cloud_uploads(&self) -> usize {
        count_on(&self.files_succeeded, StorageBackend::Cloud)
    }

    pub fn local_uploads(&self) -> usize {
        count_on(&self.files_succeeded, StorageBackend::Local)
    }

    pub fn is_success(&self) -> bool {
        !self.files_succeeded.is_empty()
    }
}

fn count_on(files: &[UploadedFile], backend: StorageBackend) -> usize {
    files
        .iter()
        .filter(|f| f.storage_backend == backend)
        .count()
}

/// One entry of the merged icon listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIcon {
    pub name: String,
    pub provider: String,
    pub url: String,
    pub storage: StorageBackend,
}

pub fn is_svg_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".svg")
}
