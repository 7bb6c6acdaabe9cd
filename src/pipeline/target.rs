use chrono::{DateTime, Utc};

use crate::storage::{KeyValueStore, StorageError, take_handoff};

/// Browser-internal schemes no script or clip can reach.
pub const RESTRICTED_SCHEMES: &[&str] = &["chrome:", "chrome-extension:", "about:", "edge:"];

/// The restricted scheme `url` starts with, if any. Case-insensitive.
pub fn restricted_scheme(url: &str) -> Option<&'static str> {
    let lower = url.trim().to_ascii_lowercase();
    RESTRICTED_SCHEMES
        .iter()
        .copied()
        .find(|scheme| lower.starts_with(scheme))
}

/// Whether a page can be clipped at all.
pub fn is_usable_url(url: &str) -> bool {
    !url.trim().is_empty() && restricted_scheme(url).is_none()
}

/// Pick the page to clip: an explicit URL first, then a fresh shortcut handoff.
pub async fn resolve_target_url(
    explicit: Option<&str>,
    store: &dyn KeyValueStore,
    now: DateTime<Utc>,
) -> Result<Option<String>, StorageError> {
    if let Some(url) = explicit.map(str::trim).filter(|u| !u.is_empty()) {
        return Ok(Some(url.to_string()));
    }
    take_handoff(store, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, record_handoff};

    #[test]
    fn test_usable_urls() {
        assert!(is_usable_url("https://example.com"));
        assert!(is_usable_url("example.com"));
        assert!(!is_usable_url("  "));
        assert!(!is_usable_url("chrome://settings"));
        assert!(!is_usable_url("chrome-extension://abc/popup.html"));
        assert!(!is_usable_url("about:blank"));
        assert!(!is_usable_url("edge://settings"));
        assert!(!is_usable_url("Chrome://settings"));
        assert!(!is_usable_url(" ABOUT:blank"));
    }

    #[test]
    fn test_restricted_scheme_names_the_match() {
        assert_eq!(restricted_scheme("edge://newtab"), Some("edge:"));
        assert_eq!(restricted_scheme("CHROME-EXTENSION://x"), Some("chrome-extension:"));
        assert_eq!(restricted_scheme("https://edge.example.com"), None);
    }

    #[tokio::test]
    async fn test_explicit_url_wins_over_handoff() {
        let store = MemoryStore::new();
        let now = Utc::now();
        record_handoff(&store, "https://from-shortcut.example", now)
            .await
            .unwrap();

        let url = resolve_target_url(Some("https://explicit.example"), &store, now)
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://explicit.example"));

        let url = resolve_target_url(None, &store, now).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://from-shortcut.example"));
    }

    #[tokio::test]
    async fn test_nothing_to_resolve() {
        let store = MemoryStore::new();
        assert!(resolve_target_url(Some(""), &store, Utc::now())
            .await
            .unwrap()
            .is_none());
    }
}
