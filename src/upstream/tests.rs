use super::*;
use crate::models::UploadedFile;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_url_joins_base_and_path() {
    let client = UpstreamClient::new("http://backend:8000/");
    assert_eq!(
        client.url(Endpoint::SummarizePdf),
        "http://backend:8000/api/v1/summarize/pdf"
    );
}

#[tokio::test]
async fn test_json_response_is_parsed_and_cookie_captured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .and(header("cookie", "session=abc"))
        .and(body_string_contains("hello upstream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=def; Path=/; HttpOnly")
                .set_body_json(serde_json::json!({"content": "hi"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = UpstreamClient::new(&server.uri());
    let form = UpstreamForm::new().text("message", "hello upstream");
    let resp = client
        .forward(Endpoint::ChatMessage, &form, Some("session=abc"))
        .await;

    assert_eq!(resp.status, 200);
    assert!(resp.is_json);
    assert_eq!(resp.body, serde_json::json!({"content": "hi"}));
    assert_eq!(resp.cookies, vec!["session=def; Path=/; HttpOnly".to_string()]);
}

#[tokio::test]
async fn test_non_json_body_is_wrapped_in_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/text"))
        .respond_with(
            ResponseTemplate::new(503).set_body_string("Service Unavailable"),
        )
        .mount(&server)
        .await;

    let client = UpstreamClient::new(&server.uri());
    let resp = client
        .forward(Endpoint::SummarizeText, &UpstreamForm::new().text("text", "x"), None)
        .await;

    assert_eq!(resp.status, 503);
    assert!(!resp.is_json);
    assert_eq!(resp.body, serde_json::json!({"detail": "Service Unavailable"}));
    assert!(resp.cookies.is_empty());
}

#[tokio::test]
async fn test_file_part_is_sent_with_name_and_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/pdf"))
        .and(body_string_contains("filename=\"notes.pdf\""))
        .and(body_string_contains("application/pdf"))
        .and(body_string_contains("%PDF-1.4 fake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"summary": "s"})))
        .expect(1)
        .mount(&server)
        .await;

    let form = UpstreamForm::new().file(
        "file",
        UploadedFile {
            file_name: "notes.pdf".into(),
            content_type: Some("application/pdf".into()),
            bytes: b"%PDF-1.4 fake".to_vec(),
        },
    );
    let client = UpstreamClient::new(&server.uri());
    let resp = client.forward(Endpoint::SummarizePdf, &form, None).await;
    assert_eq!(resp.status, 200);
}

#[tokio::test]
async fn test_invalid_json_counts_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{not json", "application/json"),
        )
        .mount(&server)
        .await;

    let client = UpstreamClient::new(&server.uri());
    let resp = client
        .forward(Endpoint::SummarizeText, &UpstreamForm::new(), None)
        .await;
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body["detail"], CONNECT_ERROR_DETAIL);
}

#[tokio::test]
async fn test_unreachable_backend_yields_500_envelope() {
    // Nothing listens on port 9 on the loopback interface.
    let client = UpstreamClient::new("http://127.0.0.1:9");
    let resp = client
        .forward(Endpoint::ChatMessage, &UpstreamForm::new().text("message", "hi"), None)
        .await;

    assert_eq!(resp.status, 500);
    assert!(!resp.is_json);
    assert_eq!(resp.body["detail"], CONNECT_ERROR_DETAIL);
    assert!(resp.body["error"].as_str().is_some_and(|e| !e.is_empty()));
}
