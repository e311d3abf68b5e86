//! In-memory storage doubles and fixtures shared by unit and endpoint tests.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    application::services::IconStorage,
    domain::models::icon::{ExtractedFile, StorageBackend, StoredIcon},
    services::StorageError,
};

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<(String, String), Vec<u8>>,
    fail_all_writes: bool,
    failing_names: HashSet<String>,
    fail_lists: bool,
    panic_on_list: bool,
}

pub struct MemoryStorage {
    backend: StorageBackend,
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    pub fn cloud() -> Arc<Self> {
        Arc::new(Self {
            backend: StorageBackend::Cloud,
            state: Mutex::new(MemoryState::default()),
        })
    }

    pub fn local() -> Arc<Self> {
        Arc::new(Self {
            backend: StorageBackend::Local,
            state: Mutex::new(MemoryState::default()),
        })
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_all_writes = fail;
    }

    pub fn fail_writes_for(&self, filename: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_names
            .insert(filename.to_string());
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().unwrap().fail_lists = fail;
    }

    pub fn panic_on_list(&self) {
        self.state.lock().unwrap().panic_on_list = true;
    }

    pub fn insert(&self, provider: &str, filename: &str) {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert((provider.to_string(), filename.to_string()), b"<svg/>".to_vec());
    }

    /// `provider/filename` of every stored object, sorted.
    pub fn stored_keys(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .objects
            .keys()
            .map(|(provider, name)| format!("{}/{}", provider, name))
            .collect()
    }

    fn url_for(&self, provider: &str, filename: &str) -> String {
        match self.backend {
            StorageBackend::Cloud => {
                format!("https://storage.test/aiicons/cloudicons/{}/{}", provider, filename)
            }
            StorageBackend::Local => format!("/cloudicons/{}/{}", provider, filename),
        }
    }
}

#[async_trait]
impl IconStorage for MemoryStorage {
    fn backend(&self) -> StorageBackend {
        self.backend
    }

    async fn store(
        &self,
        provider: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<String, StorageError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_all_writes || state.failing_names.contains(filename) {
            return Err(StorageError::ProviderError(format!(
                "{} write refused",
                self.backend.as_str()
            )));
        }

        state
            .objects
            .insert((provider.to_string(), filename.to_string()), content.to_vec());
        Ok(self.url_for(provider, filename))
    }

    async fn list(&self, provider: Option<&str>) -> Result<Vec<StoredIcon>, StorageError> {
        let state = self.state.lock().unwrap();
        if state.panic_on_list {
            drop(state);
            panic!("{} listing panicked", self.backend.as_str());
        }
        if state.fail_lists {
            return Err(StorageError::NetworkError(format!(
                "{} listing unavailable",
                self.backend.as_str()
            )));
        }

        Ok(state
            .objects
            .keys()
            .filter(|(p, _)| provider.map_or(true, |wanted| wanted == p))
            .map(|(p, name)| StoredIcon {
                name: name.clone(),
                provider: p.clone(),
                url: self.url_for(p, name),
                storage: self.backend,
            })
            .collect())
    }
}

pub fn svg_file(name: &str) -> ExtractedFile {
    ExtractedFile {
        path: format!("icons/{}", name),
        name: name.to_string(),
        content: Ok(format!("<svg><title>{}</title></svg>", name).into_bytes()),
    }
}

pub fn unreadable_file(name: &str) -> ExtractedFile {
    ExtractedFile {
        path: format!("icons/{}", name),
        name: name.to_string(),
        content: Err("Invalid checksum".to_string()),
    }
}
