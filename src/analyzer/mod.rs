//! Turns extracted page text into a title, description and tags via an
//! OpenAI-compatible chat-completion endpoint.

pub mod client;
pub mod parse;
pub mod platform;
pub mod prompt;

pub use client::{AnalyzeRequest, OpenAiAnalyzer};
pub use parse::parse_analysis;
pub use platform::{PlatformHint, detect_platform, is_code_repository};
pub use prompt::build_prompt;

use serde::{Deserialize, Serialize};

/// Longest content prefix, in characters, sent for analysis.
pub const MAX_CONTENT_CHARS: usize = 5000;

const CONTENT_LABEL: &str = "网页内容：\n";

/// Model output after validation. The user may edit it before saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl AnalysisResult {
    /// Add a tag unless it is blank or already present. Returns whether it was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }
}

/// Label and cap extracted content before it goes into the prompt.
pub fn content_excerpt(raw_content: &str) -> String {
    let prefix: String = raw_content.chars().take(MAX_CONTENT_CHARS).collect();
    format!("{CONTENT_LABEL}{prefix}")
}
