use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{errors::ClipError, extractor::ExtractionResult, http};

pub const TAVILY_EXTRACT_URL: &str = "https://api.tavily.com/extract";

const SERVICE: &str = "Tavily";
const EMPTY_HINT: &str = "the page may require login or be unreachable";

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    api_key: &'a str,
    urls: [&'a str; 1],
    extract_depth: &'static str,
    format: &'static str,
    include_images: bool,
    include_favicon: bool,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    results: Option<Vec<ProviderResult>>,
    #[serde(default, alias = "failedResults")]
    failed_results: Option<Vec<FailedResult>>,
}

#[derive(Debug, Deserialize)]
struct ProviderResult {
    url: String,
    #[serde(default)]
    raw_content: Option<String>,
    #[serde(default)]
    favicon: Option<String>,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FailedResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the hosted extraction API.
#[derive(Clone)]
pub struct TavilyExtractor {
    client: Client,
    endpoint: String,
}

impl Default for TavilyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TavilyExtractor {
    pub fn new() -> Self {
        Self::with_endpoint(TAVILY_EXTRACT_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: http::api_client(),
            endpoint: endpoint.into(),
        }
    }

    /// Ask the provider for markdown content, images and favicon of one URL.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn extract(
        &self,
        url: &str,
        api_key: Option<&str>,
    ) -> Result<ExtractionResult, ClipError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ClipError::Config("Tavily API key"))?;

        let body = ExtractRequest {
            api_key,
            urls: [url],
            extract_depth: "advanced",
            format: "markdown",
            include_images: true,
            include_favicon: true,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, http::JSON_CONTENT_TYPE)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClipError::from_reqwest_error(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "extraction request rejected");
            return Err(ClipError::Http {
                service: SERVICE,
                status,
                body: error_detail(&text),
            });
        }

        let data: ExtractResponse = response
            .json()
            .await
            .map_err(|e| ClipError::from_reqwest_error(SERVICE, e))?;

        if let Some(failed) = data.failed_results.unwrap_or_default().into_iter().next() {
            warn!(failed_url = %failed.url, "provider could not extract url");
            return Err(ClipError::Provider {
                service: SERVICE,
                message: failed.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let Some(first) = data.results.unwrap_or_default().into_iter().next() else {
            return Err(ClipError::Provider {
                service: SERVICE,
                message: "no content returned, check that the URL is reachable".to_string(),
            });
        };

        let raw_content = first.raw_content.unwrap_or_default();
        if raw_content.trim().is_empty() {
            warn!("provider returned blank content");
        }
        let mut result = ExtractionResult::new(first.url, &raw_content, EMPTY_HINT)?;
        result.title = first.title.filter(|t| !t.trim().is_empty());
        result.images = first.images.unwrap_or_default();
        result.favicon = first.favicon;

        debug!(
            chars = result.raw_content.chars().count(),
            images = result.images.len(),
            "remote extraction done"
        );
        Ok(result)
    }
}

/// Pull a readable message out of an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let candidates = [
        value.get("error"),
        value.get("message"),
        value.get("detail").and_then(|d| d.get("error")),
        value.get("detail"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
