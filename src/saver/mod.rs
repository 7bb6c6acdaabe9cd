//! Posts a reviewed bookmark to the Cubox save endpoint.

use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{errors::ClipError, http};

const SERVICE: &str = "Cubox";

/// Envelope code that means the bookmark was stored.
pub const SUCCESS_CODE: i64 = 200;

/// A bookmark ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub folder: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
struct SaveBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: String,
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
    folder: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

impl<'a> SaveBody<'a> {
    fn from_request(request: &'a SaveRequest) -> Self {
        Self {
            kind: "url",
            content: normalize_url(&request.url),
            title: &request.title,
            description: &request.description,
            tags: &request.tags,
            folder: request.folder.as_deref().unwrap_or_default(),
            image: request.image.as_deref().filter(|i| !i.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Prefix bare domains with `https://`; anything starting with `http` passes through.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

#[derive(Clone)]
pub struct CuboxSaver {
    client: Client,
}

impl Default for CuboxSaver {
    fn default() -> Self {
        Self::new()
    }
}

impl CuboxSaver {
    pub fn new() -> Self {
        Self {
            client: http::api_client(),
        }
    }

    #[instrument(skip_all, fields(url = %request.url))]
    pub async fn save(
        &self,
        request: &SaveRequest,
        api_url: Option<&str>,
    ) -> Result<SaveResponse, ClipError> {
        let api_url = api_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ClipError::Config("Cubox API URL"))?;

        let response = self
            .client
            .post(api_url)
            .header(header::CONTENT_TYPE, http::JSON_CONTENT_TYPE)
            .json(&SaveBody::from_request(request))
            .send()
            .await
            .map_err(|e| ClipError::from_reqwest_error(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "save request rejected");
            return Err(ClipError::Http {
                service: SERVICE,
                status,
                body,
            });
        }

        let envelope: SaveResponse = response
            .json()
            .await
            .map_err(|e| ClipError::from_reqwest_error(SERVICE, e))?;

        if envelope.code != SUCCESS_CODE {
            let message = if envelope.message.is_empty() {
                format!("returned code {}", envelope.code)
            } else {
                envelope.message
            };
            return Err(ClipError::Provider {
                service: SERVICE,
                message,
            });
        }

        info!(title = %request.title, tags = request.tags.len(), "bookmark saved");
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(image: Option<&str>) -> SaveRequest {
        SaveRequest {
            url: "example.com/post".to_string(),
            title: "T".to_string(),
            description: "D".to_string(),
            tags: vec!["a".to_string()],
            folder: None,
            image: image.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com/a"), "http://example.com/a");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_body_omits_missing_image() {
        let req = request(None);
        let value = serde_json::to_value(SaveBody::from_request(&req)).unwrap();
        assert!(value.as_object().unwrap().get("image").is_none());
        assert_eq!(value["type"], "url");
        assert_eq!(value["content"], "https://example.com/post");
        assert_eq!(value["folder"], "");
    }

    #[test]
    fn test_body_includes_image() {
        let req = request(Some("https://cdn.example.com/a.png"));
        let value = serde_json::to_value(SaveBody::from_request(&req)).unwrap();
        assert_eq!(value["image"], "https://cdn.example.com/a.png");
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_config_error() {
        let result = CuboxSaver::new().save(&request(None), Some(" ")).await;
        assert!(matches!(result, Err(ClipError::Config(_))));
    }
}
