use std::fs;
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::errors::ClipError;
use crate::extractor::{HttpPageHost, LocalExtractor};

async fn serve_fixture(server: &MockServer, route: &str, fixture: &str) -> String {
    let html = fs::read_to_string(format!("src/extractor/tests/fixtures/{fixture}"))
        .expect("Failed to read test fixture");
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
        .mount(server)
        .await;
    format!("{}{}", server.uri(), route)
}

#[tokio::test]
async fn test_extract_article_through_page_host() {
    let server = MockServer::start().await;
    let url = serve_fixture(&server, "/posts/go-routines", "article.html").await;

    let extractor = LocalExtractor::new(Arc::new(HttpPageHost::new(&url)));
    let result = extractor.extract(&url, None).await.unwrap();

    assert_eq!(
        result.title.as_deref(),
        Some("Understanding Go Routines - Systems Weekly")
    );
    assert!(result.raw_content.starts_with("Understanding Go Routines"));
    assert!(result.raw_content.contains("Channels let goroutines communicate without sharing memory."));
    assert!(!result.raw_content.contains("Share on every network"));
    assert!(!result.raw_content.contains("analytics"));
    assert!(!result.raw_content.contains("Archive"));

    // images come from the whole document, not only the content root
    assert_eq!(
        result.images,
        vec![
            format!("{}/images/scheduler.png", server.uri()),
            "https://cdn.systems.example/thumb-1.jpg".to_string(),
        ]
    );
    assert_eq!(
        result.favicon,
        Some(format!("{}/assets/favicon-32.png", server.uri()))
    );
}

#[tokio::test]
async fn test_script_only_page_is_empty_content() {
    let server = MockServer::start().await;
    let url = serve_fixture(&server, "/login-wall", "empty.html").await;

    let extractor = LocalExtractor::new(Arc::new(HttpPageHost::new(&url)));
    let result = extractor.extract(&url, None).await;

    assert!(matches!(result, Err(ClipError::EmptyContent(_))));
}

#[tokio::test]
async fn test_page_load_failure_is_environment_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let url = format!("{}/gone", server.uri());

    let extractor = LocalExtractor::new(Arc::new(HttpPageHost::new(&url)));
    let result = extractor.extract(&url, None).await;

    assert!(matches!(result, Err(ClipError::Environment(message)) if message.contains("404")));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use crate::extractor::{MAX_LOCAL_IMAGES, dom::scrape_document};
    use proptest::prelude::*;
    use scraper::Html;
    use url::Url;

    proptest! {
        #[test]
        fn test_scrape_never_panics(
            html in ".*",
            url in "https://[a-z]+\\.com/.*"
        ) {
            if let Ok(page_url) = Url::parse(&url) {
                let document = Html::parse_document(&html);
                let scrape = scrape_document(&document, &page_url);
                prop_assert!(scrape.images.len() <= MAX_LOCAL_IMAGES);
                prop_assert_eq!(scrape.raw_content.trim(), scrape.raw_content.as_str());
            }
        }

        #[test]
        fn test_scraped_images_are_http(
            srcs in proptest::collection::vec("(https?|data|blob):[a-z/.]{0,12}", 0..12),
        ) {
            let body: String = srcs
                .iter()
                .map(|s| format!(r#"<img src="{s}">"#))
                .collect();
            let document = Html::parse_document(&format!("<body>{body}</body>"));
            let page_url = Url::parse("https://example.com/").unwrap();
            let images = scrape_document(&document, &page_url).images;
            prop_assert!(images.iter().all(|i| i.starts_with("http")));
            prop_assert!(images.len() <= MAX_LOCAL_IMAGES);
        }
    }
}
