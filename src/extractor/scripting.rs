use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use thiserror::Error;

use crate::errors::ClipError;
use crate::extractor::dom::{PageScrape, PageScript};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u32);

impl Display for TabId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab {}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptingError {
    #[error("page scripting API is not available")]
    Unavailable,

    #[error("{0}")]
    Restricted(String),

    #[error("script execution failed: {0}")]
    Failed(String),

    #[error("tab query failed: {0}")]
    TabQuery(String),
}

impl ScriptingError {
    /// Classify a raw browser error message. Injection into internal pages is
    /// reported as "Cannot access ...".
    pub fn from_browser_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("Cannot access") {
            Self::Restricted(message)
        } else {
            Self::Failed(message)
        }
    }
}

impl From<ScriptingError> for ClipError {
    fn from(err: ScriptingError) -> Self {
        match err {
            ScriptingError::Unavailable => {
                ClipError::Environment("page scripting API is not available".to_string())
            }
            ScriptingError::Restricted(_) => ClipError::RestrictedPage,
            ScriptingError::Failed(message) => ClipError::Environment(message),
            ScriptingError::TabQuery(message) => ClipError::TabResolution(message),
        }
    }
}

/// Browser capabilities the local extractor depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageScripting: Send + Sync {
    /// Whether script injection is possible at all in this environment.
    fn is_available(&self) -> bool;

    /// The active tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<TabId>, ScriptingError>;

    /// Run `script` in the page's main world and return its result.
    async fn execute_script(
        &self,
        tab: TabId,
        script: PageScript,
    ) -> Result<PageScrape, ScriptingError>;

    /// Capture the visible area of the tab's window as a data URL.
    async fn capture_visible_tab(&self, tab: TabId) -> Result<String, ScriptingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cannot_access_is_restricted() {
        let err = ScriptingError::from_browser_message("Cannot access a chrome:// URL");
        assert!(matches!(err, ScriptingError::Restricted(_)));
        assert!(matches!(ClipError::from(err), ClipError::RestrictedPage));
    }

    #[test]
    fn test_other_failures_are_environment_errors() {
        let err = ScriptingError::from_browser_message("Frame was removed");
        assert!(matches!(
            ClipError::from(err),
            ClipError::Environment(message) if message == "Frame was removed"
        ));
        assert!(matches!(
            ClipError::from(ScriptingError::TabQuery("gone".into())),
            ClipError::TabResolution(_)
        ));
    }
}
