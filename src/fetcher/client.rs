use crate::fetcher::{decode::decode_body, errors::FetchError, types::LoadedPage};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, header};
use tracing::{debug, instrument};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "Mozilla/5.0 (compatible; cubox-clipper/0.1)";

static PAGE_CLIENT: Lazy<Client> = Lazy::new(|| {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Download an HTML page and decode it to UTF-8.
#[instrument(skip_all, fields(url = %url))]
pub async fn load_page(url: &str) -> Result<LoadedPage, FetchError> {
    let parsed_url = url::Url::parse(url)?;

    let response = PAGE_CLIENT
        .get(parsed_url)
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    if let Some(content_length) = response.content_length()
        && content_length > MAX_BODY_SIZE
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let url_final = response.url().clone();
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http(status));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();
    if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
        return Err(FetchError::UnsupportedContentType(content_type));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::Io(e.to_string()))?;

    // Content-Length can be absent on chunked responses
    if body.len() as u64 > MAX_BODY_SIZE {
        return Err(FetchError::BodyTooLarge(body.len() as u64));
    }

    let (html, encoding) = decode_body(&content_type, &body);
    debug!(status = %status, encoding = encoding.name(), bytes = body.len(), "page loaded");

    Ok(LoadedPage {
        url_final,
        status,
        html,
        encoding: encoding.name(),
    })
}
