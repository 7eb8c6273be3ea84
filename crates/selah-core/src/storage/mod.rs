mod config;
pub mod database;

pub use config::{Config, NotificationsConfig, WatchConfig};
pub use database::Database;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StoreError;

/// Returns `~/.config/selah[-dev]/` based on SELAH_ENV.
///
/// Set SELAH_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SELAH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("selah-dev")
    } else {
        base_dir.join("selah")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Synchronous key-value settings storage.
///
/// The reminder registry and delivery log persist everything through this
/// trait, so any host that can store strings under string keys (SQLite,
/// browser local storage, a test map) can back the engine. Implementations
/// take `&self`; interior mutability is the implementor's concern.
pub trait SettingsStore {
    /// Read the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory settings store.
///
/// Used by tests and by embedding hosts that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::ReadFailed {
            key: key.to_string(),
            message: "store mutex poisoned".to_string(),
        })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::WriteFailed {
            key: key.to_string(),
            message: "store mutex poisoned".to_string(),
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
