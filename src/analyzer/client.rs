use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::analyzer::{AnalysisResult, parse::parse_analysis, prompt::build_prompt};
use crate::config::{DEFAULT_OPENAI_API_ENDPOINT, DEFAULT_OPENAI_MODEL};
use crate::{errors::ClipError, http};

const SERVICE: &str = "OpenAI";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 800;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

/// Inputs for one analysis call. `content` should already be capped.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeRequest<'a> {
    pub url: &'a str,
    pub content: Option<&'a str>,
    pub api_key: Option<&'a str>,
    pub api_endpoint: Option<&'a str>,
    pub model: Option<&'a str>,
}

#[derive(Clone)]
pub struct OpenAiAnalyzer {
    client: Client,
}

impl Default for OpenAiAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiAnalyzer {
    pub fn new() -> Self {
        Self {
            client: http::api_client(),
        }
    }

    /// Send one chat completion and parse the reply. There is no retry.
    #[instrument(skip_all, fields(url = %request.url))]
    pub async fn analyze(&self, request: &AnalyzeRequest<'_>) -> Result<AnalysisResult, ClipError> {
        let api_key = request
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ClipError::Config("OpenAI API key"))?;
        let endpoint = request
            .api_endpoint
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(DEFAULT_OPENAI_API_ENDPOINT);
        let model = request
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_OPENAI_MODEL);

        let body = ChatRequest {
            model,
            messages: vec![ChatMessage::user(build_prompt(request.url, request.content))],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(completions_url(endpoint))
            .header(header::CONTENT_TYPE, http::JSON_CONTENT_TYPE)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClipError::from_reqwest_error(SERVICE, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClipError::from_reqwest_error(SERVICE, e))?;

        if !status.is_success() {
            warn!(status = %status, "chat completion rejected");
            let envelope: ErrorEnvelope = serde_json::from_str(&text).unwrap_or_default();
            return Err(ClipError::Http {
                service: SERVICE,
                status,
                body: envelope
                    .error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| text.trim().to_string()),
            });
        }

        let data: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            ClipError::MalformedResponse(format!("completion envelope is not JSON: {e}"))
        })?;

        if let Some(error) = data.error {
            return Err(ClipError::Http {
                service: SERVICE,
                status,
                body: error.message.unwrap_or_else(|| "unknown API error".to_string()),
            });
        }

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ClipError::EmptyResponse)?;

        debug!(model, reply_chars = content.chars().count(), "model replied");
        parse_analysis(&content)
    }
}

fn completions_url(endpoint: &str) -> String {
    format!("{}/v1/chat/completions", endpoint.trim().trim_end_matches('/'))
}
