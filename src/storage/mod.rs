//! Key-value persistence behind the settings record and the shortcut handoff.

pub mod file;
pub mod memory;
pub mod records;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use records::{
    HANDOFF_TTL, SETTINGS_KEY, SHORTCUT_TIMESTAMP_KEY, SHORTCUT_URL_KEY, SettingsStore,
    record_handoff, take_handoff,
};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store is not a JSON object: {0}")]
    Corrupt(String),
}

/// Async key-value store with whole-value semantics per key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}
