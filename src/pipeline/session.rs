use std::time::Duration;
use tracing::{debug, info, warn};

use crate::analyzer::{AnalysisResult, AnalyzeRequest, OpenAiAnalyzer, content_excerpt};
use crate::config::Settings;
use crate::errors::{ClipError, ErrorKind};
use crate::extractor::Extractor;
use crate::pipeline::target::is_usable_url;
use crate::saver::{CuboxSaver, SaveRequest};

/// How long a success message stays before the session resets.
pub const AUTO_DISMISS_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    /// Analysis finished; waiting for the user to confirm or cancel.
    Previewing,
    Success,
    Error,
}

/// Analysis awaiting review, plus the snapshot picked during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub analysis: AnalysisResult,
    pub snapshot: Option<String>,
}

/// Called on every phase change with the new phase and status message.
pub type PhaseObserver = Box<dyn Fn(Phase, &str) + Send + Sync>;

/// One short-lived UI instance driving the pipeline for a single page.
pub struct Session {
    settings: Settings,
    url: String,
    folder: Option<String>,
    extractor: Extractor,
    analyzer: OpenAiAnalyzer,
    saver: CuboxSaver,
    phase: Phase,
    message: String,
    preview: Option<Preview>,
    last_error: Option<ClipError>,
    auto_analyze_fired: bool,
    observer: Option<PhaseObserver>,
}

impl Session {
    pub fn new(settings: Settings, url: impl Into<String>, extractor: Extractor) -> Self {
        Self {
            settings,
            url: url.into(),
            folder: None,
            extractor,
            analyzer: OpenAiAnalyzer::new(),
            saver: CuboxSaver::new(),
            phase: Phase::Idle,
            message: String::new(),
            preview: None,
            last_error: None,
            auto_analyze_fired: false,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: PhaseObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into()).filter(|f: &String| !f.trim().is_empty());
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Editable analysis while a preview is open.
    pub fn preview_mut(&mut self) -> Option<&mut AnalysisResult> {
        self.preview.as_mut().map(|p| &mut p.analysis)
    }

    pub fn last_error(&self) -> Option<&ClipError> {
        self.last_error.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.last_error.as_ref().map(ClipError::kind)
    }

    /// Whether analysis can start: usable URL, analyzer key, and the Tavily
    /// key when the remote extractor is selected.
    pub fn ready_to_analyze(&self) -> bool {
        is_usable_url(&self.url)
            && self.settings.openai_api_key().is_some()
            && (!self.extractor.is_remote() || self.settings.tavily_api_key().is_some())
    }

    /// Extract the page and analyze it. Ends in `Previewing` or `Error`;
    /// nothing is saved until [`Session::confirm`].
    pub async fn analyze(&mut self) -> Phase {
        if self.phase == Phase::Loading {
            return self.phase;
        }
        match self.run_analyze().await {
            Ok(preview) => {
                info!(url = %self.url, title = %preview.analysis.title, "analysis ready for review");
                self.preview = Some(preview);
                self.last_error = None;
                self.transition(Phase::Previewing, String::new());
            }
            Err(e) => self.fail("Analysis failed", e),
        }
        self.phase
    }

    async fn run_analyze(&mut self) -> Result<Preview, ClipError> {
        if !is_usable_url(&self.url) {
            return Err(ClipError::RestrictedPage);
        }
        let settings = self.settings.clone();
        let api_key = settings
            .openai_api_key()
            .ok_or(ClipError::Config("OpenAI API key"))?;
        let tavily_key = settings.tavily_api_key();
        if self.extractor.is_remote() && tavily_key.is_none() {
            return Err(ClipError::Config("Tavily API key"));
        }

        self.preview = None;
        let label = self.extractor.label();
        self.transition(
            Phase::Loading,
            format!("Extracting page content with {label}..."),
        );
        let url = self.url.clone();
        let extraction = self.extractor.extract(&url, tavily_key).await?;

        self.transition(
            Phase::Loading,
            "Content extracted, analyzing with AI...".to_string(),
        );
        let excerpt = content_excerpt(&extraction.raw_content);
        let analysis = self
            .analyzer
            .analyze(&AnalyzeRequest {
                url: &url,
                content: Some(&excerpt),
                api_key: Some(api_key),
                api_endpoint: settings.openai_api_endpoint(),
                model: settings.openai_model(),
            })
            .await?;

        Ok(Preview {
            analysis,
            snapshot: extraction.snapshot_image().map(str::to_string),
        })
    }

    /// Save the reviewed analysis with the extraction's snapshot image.
    /// On failure the preview stays open for another try.
    pub async fn confirm(&mut self) -> Phase {
        if self.phase == Phase::Loading {
            return self.phase;
        }
        let Some(preview) = self.preview.clone() else {
            return self.phase;
        };
        match self.run_confirm(&preview).await {
            Ok(()) => {
                self.preview = None;
                self.last_error = None;
                self.transition(
                    Phase::Success,
                    format!("Saved: {}", preview.analysis.title),
                );
            }
            Err(e) => self.fail("Save failed", e),
        }
        self.phase
    }

    async fn run_confirm(&mut self, preview: &Preview) -> Result<(), ClipError> {
        let settings = self.settings.clone();
        let api_url = settings
            .cubox_api_url()
            .ok_or(ClipError::Config("Cubox API URL"))?;
        if preview.analysis.title.trim().is_empty() {
            return Err(ClipError::MissingTitle);
        }

        self.transition(Phase::Loading, "Saving to Cubox...".to_string());
        let request = SaveRequest {
            url: self.url.clone(),
            title: preview.analysis.title.clone(),
            description: preview.analysis.description.clone(),
            tags: preview.analysis.tags.clone(),
            folder: self.folder.clone(),
            image: preview.snapshot.clone(),
        };
        self.saver.save(&request, Some(api_url)).await?;
        Ok(())
    }

    /// Discard the pending analysis and go back to idle.
    pub fn cancel(&mut self) {
        self.preview = None;
        self.last_error = None;
        self.transition(Phase::Idle, String::new());
    }

    /// Clear a success message after [`AUTO_DISMISS_DELAY`].
    pub async fn dismiss_success(&mut self) {
        if self.phase != Phase::Success {
            return;
        }
        tokio::time::sleep(AUTO_DISMISS_DELAY).await;
        self.transition(Phase::Idle, String::new());
    }

    /// Run `analyze` once per session when `autoAnalyze` is on and
    /// everything it needs is configured. Returns whether it fired.
    pub async fn maybe_auto_analyze(&mut self) -> bool {
        if self.auto_analyze_fired
            || !self.settings.auto_analyze
            || self.phase != Phase::Idle
            || self.preview.is_some()
            || !self.ready_to_analyze()
        {
            return false;
        }
        self.auto_analyze_fired = true;
        debug!(url = %self.url, "auto-analyze triggered");
        self.analyze().await;
        true
    }

    fn fail(&mut self, context: &str, err: ClipError) {
        warn!(url = %self.url, error = %err, "{context}");
        let message = format!("{context}: {}", err.user_message());
        self.last_error = Some(err);
        self.transition(Phase::Error, message);
    }

    fn transition(&mut self, phase: Phase, message: String) {
        debug!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
        self.message = message;
        if let Some(observer) = &self.observer {
            observer(phase, &self.message);
        }
    }
}
