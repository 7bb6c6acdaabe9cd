use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::config::Settings;
use crate::storage::{KeyValueStore, StorageError};

/// Namespace key the settings record lives under.
pub const SETTINGS_KEY: &str = "cubox-config-storage-key";

pub const SHORTCUT_URL_KEY: &str = "shortcut_target_url";
pub const SHORTCUT_TIMESTAMP_KEY: &str = "shortcut_timestamp";

/// A shortcut handoff older than this is ignored.
pub const HANDOFF_TTL: Duration = Duration::seconds(5);

/// Whole-object access to the persisted [`Settings`].
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the record, falling back to defaults when nothing was saved yet.
    pub async fn load(&self) -> Result<Settings, StorageError> {
        match self.store.get(SETTINGS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Settings::default()),
        }
    }

    pub async fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        self.store
            .set(SETTINGS_KEY, serde_json::to_value(settings)?)
            .await
    }
}

/// Leave a target URL for the next UI instance to pick up.
pub async fn record_handoff(
    store: &dyn KeyValueStore,
    url: &str,
    now: DateTime<Utc>,
) -> Result<(), StorageError> {
    store.set(SHORTCUT_URL_KEY, json!(url)).await?;
    store
        .set(SHORTCUT_TIMESTAMP_KEY, json!(now.timestamp_millis()))
        .await
}

/// Consume a pending handoff. Returns the URL only while it is fresh; the
/// record is removed either way so it can never be used twice.
pub async fn take_handoff(
    store: &dyn KeyValueStore,
    now: DateTime<Utc>,
) -> Result<Option<String>, StorageError> {
    let url = store.get(SHORTCUT_URL_KEY).await?;
    let timestamp = store.get(SHORTCUT_TIMESTAMP_KEY).await?;
    if url.is_none() && timestamp.is_none() {
        return Ok(None);
    }
    store
        .remove(&[SHORTCUT_URL_KEY, SHORTCUT_TIMESTAMP_KEY])
        .await?;

    let (Some(Value::String(url)), Some(stamp)) = (url, timestamp.and_then(|v| v.as_i64()))
    else {
        return Ok(None);
    };
    let age = now.timestamp_millis() - stamp;
    if url.is_empty() || age < 0 || age >= HANDOFF_TTL.num_milliseconds() {
        debug!(age_ms = age, "discarding stale shortcut handoff");
        return Ok(None);
    }
    Ok(Some(url))
}
