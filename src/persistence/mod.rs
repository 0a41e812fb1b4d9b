//! Key-value persistence with silent corrupt-state fallback
//!
//! Features:
//! - `KvStore` trait over LocalStorage (web) and an in-memory map (native/tests)
//! - JSON helpers returning `LoadError`, collapsed to `Option` by callers
//! - Write failures are logged and swallowed, never fatal

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;

/// Why a persisted value could not be read
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no value stored under `{0}`")]
    NotFound(String),
    #[error("stored value under `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a value could not be written
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("storage rejected write to `{0}`")]
    Rejected(String),
    #[error("failed to encode value for `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable string key-value store
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str);
}

/// In-memory store, used natively and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Read and decode a JSON value. A stored `null` counts as not found.
pub fn load_json<T: DeserializeOwned, S: KvStore + ?Sized>(store: &S, key: &str) -> Result<T, LoadError> {
    let raw = store
        .get(key)
        .ok_or_else(|| LoadError::NotFound(key.to_string()))?;
    let value: Option<T> = serde_json::from_str(&raw).map_err(|source| LoadError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    value.ok_or_else(|| LoadError::NotFound(key.to_string()))
}

/// `load_json` with corrupt entries logged and treated as absent
pub fn load_or_none<T: DeserializeOwned, S: KvStore + ?Sized>(store: &S, key: &str) -> Option<T> {
    match load_json(store, key) {
        Ok(value) => Some(value),
        Err(LoadError::NotFound(_)) => None,
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize + ?Sized, S: KvStore + ?Sized>(
    store: &mut S,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// Write, logging instead of failing
pub fn save_or_warn<T: Serialize + ?Sized, S: KvStore + ?Sized>(store: &mut S, key: &str, value: &T) {
    if let Err(e) = save_json(store, key, value) {
        log::warn!("Could not persist `{}`: {}", key, e);
    }
}

/// Read a plain stringified integer (not JSON-wrapped)
pub fn load_number<S: KvStore + ?Sized>(store: &S, key: &str) -> Option<u64> {
    let raw = store.get(key)?;
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Some(n as u64),
        _ => {
            log::warn!("Ignoring non-numeric value under `{}`", key);
            None
        }
    }
}

/// Write a plain stringified integer, logging on failure
pub fn save_number<S: KvStore + ?Sized>(store: &mut S, key: &str, value: u64) {
    if let Err(e) = store.set(key, &value.to_string()) {
        log::warn!("Could not persist `{}`: {}", key, e);
    }
}
