//! Key-value persistence
//!
//! The game stores exactly one blob: the preferences record. On the web it
//! lives in LocalStorage; native builds and tests use an in-memory map.

use std::collections::HashMap;

use crate::settings::Settings;

#[cfg(target_arch = "wasm32")]
mod local_storage;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStore;

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,

    #[error("failed to read {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}

/// Minimal string key-value store
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and saves `Settings` under their well-known key
pub struct PreferenceStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored preferences, or defaults if missing, unreadable or malformed
    pub fn load(&self) -> Settings {
        match self.store.get_item(Settings::STORAGE_KEY) {
            Ok(Some(json)) => {
                log::info!("Loaded settings from storage");
                Settings::from_json(&json)
            }
            Ok(None) => {
                log::info!("Using default settings");
                Settings::default()
            }
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Settings::default()
            }
        }
    }

    pub fn save(&mut self, settings: &Settings) -> Result<(), StorageError> {
        self.store
            .set_item(Settings::STORAGE_KEY, &settings.to_json())?;
        log::info!("Settings saved");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
