use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:8080";
pub const DEFAULT_BUCKET: &str = "aiicons";
pub const DEFAULT_KEY_PREFIX: &str = "cloudicons";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_LOCAL_STORAGE_DIR: &str = "public/cloudicons";
pub const DEFAULT_LOCAL_URL_PREFIX: &str = "/cloudicons";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct CloudStorageConfig {
    pub bucket: String,
    pub key_prefix: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub public_url: Option<String>,
    pub force_path_style: bool,
}

impl CloudStorageConfig {
    /// Base URL under which objects of the bucket are publicly reachable.
    pub fn public_base_url(&self) -> String {
        if let Some(ref url) = self.public_url {
            return url.trim_end_matches('/').to_string();
        }

        match self.endpoint {
            Some(ref endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    pub root_dir: PathBuf,
    pub url_prefix: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub use_local_embeddings: bool,
    pub cloud: CloudStorageConfig,
    pub local: LocalStorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                expected: "a valid u16",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(value) => {
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidValue {
                        name: "MAX_UPLOAD_BYTES",
                        expected: "a byte count",
                        value,
                    })?
            }
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let allowed_origins = get("CLIENT_URL")
            .unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // An explicitly empty prefix stores keys at the bucket root.
        let key_prefix = match lookup("STORAGE_KEY_PREFIX") {
            Some(prefix) => prefix.trim().trim_matches('/').to_string(),
            None => DEFAULT_KEY_PREFIX.to_string(),
        };

        let cloud = CloudStorageConfig {
            bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            key_prefix,
            region: get("STORAGE_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: get("STORAGE_ENDPOINT"),
            public_url: get("STORAGE_PUBLIC_URL"),
            force_path_style: parse_flag("STORAGE_FORCE_PATH_STYLE", get("STORAGE_FORCE_PATH_STYLE"))?,
        };

        let url_prefix = get("LOCAL_URL_PREFIX")
            .unwrap_or_else(|| DEFAULT_LOCAL_URL_PREFIX.to_string());
        let trimmed_prefix = url_prefix.trim().trim_matches('/');
        if trimmed_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "LOCAL_URL_PREFIX",
                expected: "a non-root URL path",
                value: url_prefix,
            });
        }
        let local = LocalStorageConfig {
            root_dir: PathBuf::from(
                get("LOCAL_STORAGE_DIR").unwrap_or_else(|| DEFAULT_LOCAL_STORAGE_DIR.to_string()),
            ),
            url_prefix: format!("/{}", trimmed_prefix),
        };

        Ok(Self {
            port,
            allowed_origins,
            max_upload_bytes,
            use_local_embeddings: parse_flag("USE_LOCAL_EMBEDDINGS", get("USE_LOCAL_EMBEDDINGS"))?,
            cloud,
            local,
        })
    }
}

fn parse_flag(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value {
        None => Ok(false),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name,
                expected: "true or false",
                value,
            }),
        },
    }
}
