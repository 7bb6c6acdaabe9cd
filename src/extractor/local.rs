use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::errors::ClipError;
use crate::extractor::{
    ExtractionResult,
    dom::PageScript,
    scripting::{PageScripting, ScriptingError, TabId},
};

const EMPTY_HINT: &str = "the page layout may be unusual or the content may require login";

/// Reads content straight out of an open tab instead of calling a hosted API.
#[derive(Clone)]
pub struct LocalExtractor {
    scripting: Arc<dyn PageScripting>,
}

impl LocalExtractor {
    pub fn new(scripting: Arc<dyn PageScripting>) -> Self {
        Self { scripting }
    }

    /// Extract `url` from `tab`, or from the active tab when none is given.
    ///
    /// A screenshot of the tab is prepended to the images when the host can
    /// take one; failing to capture it never fails the extraction.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn extract(
        &self,
        url: &str,
        tab: Option<TabId>,
    ) -> Result<ExtractionResult, ClipError> {
        if !self.scripting.is_available() {
            return Err(ScriptingError::Unavailable.into());
        }

        let tab = match tab {
            Some(tab) => tab,
            None => self.scripting.active_tab().await?.ok_or_else(|| {
                ClipError::TabResolution("no active tab in the current window".to_string())
            })?,
        };

        let scrape = self
            .scripting
            .execute_script(tab, PageScript::ExtractContent)
            .await?;
        let mut result = ExtractionResult::new(url, &scrape.raw_content, EMPTY_HINT)?;

        let screenshot = match self.scripting.capture_visible_tab(tab).await {
            Ok(shot) => Some(shot),
            Err(e) => {
                warn!(%tab, error = %e, "screenshot capture failed, continuing without it");
                None
            }
        };

        result.title = Some(scrape.title).filter(|t| !t.trim().is_empty());
        result.images = screenshot.into_iter().chain(scrape.images).collect();
        result.favicon = scrape.favicon;

        debug!(
            %tab,
            chars = result.raw_content.chars().count(),
            images = result.images.len(),
            "local extraction done"
        );
        Ok(result)
    }
}
