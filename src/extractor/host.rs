use async_trait::async_trait;
use scraper::Html;
use tracing::instrument;

use crate::extractor::{
    dom::{PageScrape, PageScript},
    scripting::{PageScripting, ScriptingError, TabId},
};
use crate::fetcher::{FetchError, load_page};
use crate::pipeline::restricted_scheme;

/// A single-tab stand-in for a browser window: tab 1 shows `url`, and
/// scripts run against the document downloaded from it.
#[derive(Debug, Clone)]
pub struct HttpPageHost {
    url: String,
}

impl HttpPageHost {
    pub const TAB: TabId = TabId(1);

    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl From<FetchError> for ScriptingError {
    fn from(err: FetchError) -> Self {
        ScriptingError::Failed(err.to_string())
    }
}

#[async_trait]
impl PageScripting for HttpPageHost {
    fn is_available(&self) -> bool {
        true
    }

    async fn active_tab(&self) -> Result<Option<TabId>, ScriptingError> {
        Ok((!self.url.trim().is_empty()).then_some(Self::TAB))
    }

    #[instrument(skip_all, fields(url = %self.url, %tab))]
    async fn execute_script(
        &self,
        tab: TabId,
        script: PageScript,
    ) -> Result<PageScrape, ScriptingError> {
        if tab != Self::TAB {
            return Err(ScriptingError::Failed(format!("no tab with id {}", tab.0)));
        }
        if let Some(scheme) = restricted_scheme(&self.url) {
            return Err(ScriptingError::from_browser_message(format!(
                "Cannot access a {scheme}// URL"
            )));
        }

        let page = load_page(&self.url).await?;
        let document = Html::parse_document(&page.html);
        Ok(script.run(&document, &page.url_final))
    }

    async fn capture_visible_tab(&self, _tab: TabId) -> Result<String, ScriptingError> {
        Err(ScriptingError::Failed(
            "screen capture is not supported by the HTTP page host".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_internal_pages_are_restricted() {
        let host = HttpPageHost::new("chrome://extensions");
        let err = host
            .execute_script(HttpPageHost::TAB, PageScript::ExtractContent)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptingError::Restricted(_)));

        let err = HttpPageHost::new("edge://settings")
            .execute_script(HttpPageHost::TAB, PageScript::ExtractContent)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptingError::Restricted(_)));
    }

    #[tokio::test]
    async fn test_empty_url_has_no_active_tab() {
        assert_eq!(HttpPageHost::new("").active_tab().await.unwrap(), None);
        assert_eq!(
            HttpPageHost::new("https://example.com").active_tab().await.unwrap(),
            Some(HttpPageHost::TAB)
        );
    }

    #[tokio::test]
    async fn test_capture_is_unsupported() {
        let host = HttpPageHost::new("https://example.com");
        assert!(host.capture_visible_tab(HttpPageHost::TAB).await.is_err());
    }
}
