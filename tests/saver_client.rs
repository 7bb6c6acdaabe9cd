use cubox_clipper::{
    ClipError, ErrorKind,
    saver::{CuboxSaver, SaveRequest},
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

fn request(url: &str, image: Option<&str>) -> SaveRequest {
    SaveRequest {
        url: url.to_string(),
        title: "Go并发编程指南".to_string(),
        description: "介绍 Go 的 goroutine".to_string(),
        tags: vec!["Go".to_string(), "并发".to_string()],
        folder: None,
        image: image.map(str::to_string),
    }
}

#[tokio::test]
async fn test_save_posts_bookmark_with_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/c/api/save/token"))
        .and(body_json(json!({
            "type": "url",
            "content": "https://go.dev/blog/routines",
            "title": "Go并发编程指南",
            "description": "介绍 Go 的 goroutine",
            "tags": ["Go", "并发"],
            "folder": "",
            "image": "https://go.dev/images/gopher.png"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "message": "", "data": {"id": 42}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let api_url = format!("{}/c/api/save/token", mock_server.uri());
    let response = CuboxSaver::new()
        .save(
            &request(
                "https://go.dev/blog/routines",
                Some("https://go.dev/images/gopher.png"),
            ),
            Some(&api_url),
        )
        .await
        .unwrap();

    assert_eq!(response.code, 200);
    assert_eq!(response.data["id"], 42);
}

#[tokio::test]
async fn test_save_without_image_omits_field_and_normalizes_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200})))
        .mount(&mock_server)
        .await;

    let mut bookmark = request("example.com/post", None);
    bookmark.folder = Some("Reading".to_string());
    CuboxSaver::new()
        .save(&bookmark, Some(&mock_server.uri()))
        .await
        .unwrap();

    let received = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["content"], "https://example.com/post");
    assert_eq!(body["folder"], "Reading");
    assert!(body.get("image").is_none());
}

#[tokio::test]
async fn test_non_success_code_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": -1, "message": "token expired"})),
        )
        .mount(&mock_server)
        .await;

    match CuboxSaver::new()
        .save(&request("https://example.com", None), Some(&mock_server.uri()))
        .await
    {
        Err(ClipError::Provider { service, message }) => {
            assert_eq!(service, "Cubox");
            assert_eq!(message, "token expired");
        }
        other => panic!("Expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_keeps_body_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let err = CuboxSaver::new()
        .save(&request("https://example.com", None), Some(&mock_server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Http);
    assert!(err.user_message().contains("internal error"));
    assert!(err.user_message().contains("500"));
}
