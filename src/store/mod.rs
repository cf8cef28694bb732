//! Local key-value persistence
//!
//! Saved prompts and settings go through a small string-keyed store, the same
//! shape as browser local storage: values are serialized JSON documents and a
//! missing or unreadable value falls back to a caller-supplied default.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and deserialize `key`, returning `default` on absence or any failure.
pub fn load_or<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    match store.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable stored value for {}: {}", key, e);
            default
        }),
        Ok(None) => default,
        Err(e) => {
            tracing::warn!("Failed to read {} from store: {}", key, e);
            default
        }
    }
}

pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
