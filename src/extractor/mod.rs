pub mod dom;
pub mod host;
pub mod local;
pub mod remote;
pub mod scripting;

#[cfg(test)]
mod tests;

pub use dom::{MAX_LOCAL_IMAGES, PageScrape, PageScript};
pub use host::HttpPageHost;
pub use local::LocalExtractor;
pub use remote::TavilyExtractor;
pub use scripting::{PageScripting, ScriptingError, TabId};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Settings;
use crate::errors::ClipError;

/// Normalized page content shared by both extraction paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub url: String,
    pub raw_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl ExtractionResult {
    /// Build a result, refusing blank content. `hint` explains the likely cause.
    pub fn new(
        url: impl Into<String>,
        raw_content: &str,
        hint: &'static str,
    ) -> Result<Self, ClipError> {
        let raw_content = raw_content.trim();
        if raw_content.is_empty() {
            return Err(ClipError::EmptyContent(hint));
        }
        Ok(Self {
            url: url.into(),
            raw_content: raw_content.to_string(),
            title: None,
            images: Vec::new(),
            favicon: None,
        })
    }

    /// Image used as the bookmark's snapshot.
    pub fn snapshot_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Extraction strategy, picked from the `enableTavily` flag.
pub enum Extractor {
    Remote(TavilyExtractor),
    Local(LocalExtractor),
}

impl Extractor {
    /// Remote when `enableTavily` is set, otherwise read the page through `scripting`.
    pub fn for_settings(settings: &Settings, scripting: Arc<dyn PageScripting>) -> Self {
        if settings.enable_tavily {
            Self::Remote(TavilyExtractor::new())
        } else {
            Self::Local(LocalExtractor::new(scripting))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Remote(_) => "Tavily",
            Self::Local(_) => "local page reader",
        }
    }

    /// Run the selected extractor. The remote path needs the Tavily key; the
    /// local path reads the active tab.
    pub async fn extract(
        &self,
        url: &str,
        tavily_api_key: Option<&str>,
    ) -> Result<ExtractionResult, ClipError> {
        match self {
            Self::Remote(remote) => remote.extract(url, tavily_api_key).await,
            Self::Local(local) => local.extract(url, None).await,
        }
    }
}

#[cfg(test)]
mod result_tests {
    use super::*;

    #[test]
    fn test_blank_content_is_rejected() {
        let result = ExtractionResult::new("https://example.com", " \n\t ", "login required");
        assert!(matches!(result, Err(ClipError::EmptyContent("login required"))));
    }

    #[test]
    fn test_content_is_trimmed() {
        let result = ExtractionResult::new("https://example.com", "  body  ", "").unwrap();
        assert_eq!(result.raw_content, "body");
        assert_eq!(result.snapshot_image(), None);
    }

    #[test]
    fn test_serializes_camel_case_without_empty_fields() {
        let result = ExtractionResult::new("https://example.com", "text", "").unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["rawContent"], "text");
        assert!(value.get("images").is_none());
        assert!(value.get("title").is_none());
    }
}
