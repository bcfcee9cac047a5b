//! HTTP API tests for the proxy routes.
//!
//! Tests verify:
//! - Query and body parameters reach the actions
//! - Envelope status codes become HTTP status codes
//! - Request errors (unknown action, malformed body) as JSON errors
//! - Console page, health check and CORS preflight

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use asset_console::actions::{ActionDefaults, ActionService};
use asset_console::{create_router, ConsoleSettings, RouterConfig};

use super::test_utils::{
    asset_entity, folder_entity, thumbnail_href, MockUpstream, API, INSTANCE, PNG_BYTES, TOKEN,
};

fn sample_upstream() -> Arc<MockUpstream> {
    MockUpstream::new()
        .with_folder(
            "",
            vec![folder_entity("", "wknd"), asset_entity("", "logo.png", true)],
        )
        .with_folder("wknd", vec![])
        .with_rendition(thumbnail_href("logo.png"), PNG_BYTES)
        .shared()
}

fn router(upstream: Arc<MockUpstream>) -> Router {
    let actions = ActionService::from_shared(upstream).with_defaults(ActionDefaults {
        instance: Some(INSTANCE.to_string()),
        api: Some(API.to_string()),
        allowed_instances: None,
    });
    create_router(
        actions,
        ConsoleSettings::default(),
        RouterConfig::new().with_tracing(false),
    )
}

fn action_request(action: &str, query: &str, body: Option<Value>) -> Request<Body> {
    let uri = if query.is_empty() {
        format!("/api/v1/{}", action)
    } else {
        format!("/api/v1/{}?{}", action, query)
    };
    let body = match body {
        Some(body) => Body::from(body.to_string()),
        None => Body::empty(),
    };
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {}", TOKEN))
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Actions
// =============================================================================

#[tokio::test]
async fn test_read_with_query_params() {
    let upstream = sample_upstream();
    let response = router(upstream.clone())
        .oneshot(action_request("read", "offset=0&limit=1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["properties"]["srn:paging"]["total"], 2);
    assert_eq!(body["entities"].as_array().unwrap().len(), 1);

    let calls = upstream.calls_to("list").await;
    assert_eq!(calls[0].token.as_deref(), Some(TOKEN));
    assert_eq!(calls[0].page.limit, Some(1));
}

#[tokio::test]
async fn test_body_params_override_query() {
    let upstream = sample_upstream();
    let response = router(upstream.clone())
        .oneshot(action_request(
            "read",
            "path=missing",
            Some(json!({ "path": "wknd" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.calls_to("list").await[0].target, "wknd");
}

#[tokio::test]
async fn test_thumbnail_over_http() {
    let response = router(sample_upstream())
        .oneshot(action_request(
            "thumbnail",
            "",
            Some(json!({ "path": "logo.png" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["mimeType"], "image/png");
    assert!(body["base64"].as_str().unwrap().starts_with("iVBORw0KGgo"));
}

#[tokio::test]
async fn test_missing_thumbnail_is_empty_404() {
    let response = router(sample_upstream())
        .oneshot(action_request("thumbnail", "path=wknd", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_missing_authorization_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/delete?path=logo.png")
        .body(Body::empty())
        .unwrap();

    let upstream = sample_upstream();
    let response = router(upstream.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "missing header(s) 'authorization'");
    assert!(upstream.calls().await.is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_server_error() {
    let response = router(sample_upstream())
        .oneshot(action_request("read", "path=nowhere", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .ends_with("failed with status code 404"));
}

#[tokio::test]
async fn test_create_folder_over_http() {
    let upstream = sample_upstream();
    let response = router(upstream.clone())
        .oneshot(action_request(
            "create",
            "",
            Some(json!({
                "path": "wknd/Summer",
                "data": { "class": "assetFolder", "properties": { "title": "Summer" } }
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.children("wknd").await.len(), 1);
}

// =============================================================================
// Request Errors
// =============================================================================

#[tokio::test]
async fn test_unknown_action() {
    let response = router(sample_upstream())
        .oneshot(action_request("list", "", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "unknown_action");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_non_object_body_is_rejected() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/read")
        .header("authorization", format!("Bearer {}", TOKEN))
        .body(Body::from("[\"wknd\"]"))
        .unwrap();

    let response = router(sample_upstream()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn test_get_on_action_is_not_allowed() {
    let request = Request::builder()
        .uri("/api/v1/read")
        .body(Body::empty())
        .unwrap();

    let response = router(sample_upstream()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Console, Health and CORS
// =============================================================================

#[tokio::test]
async fn test_console_page() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = router(sample_upstream()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("/api/v1/"));
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router(sample_upstream()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_cors_preflight_allows_authorization() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/read")
        .header("origin", "https://console.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization")
        .body(Body::empty())
        .unwrap();

    let response = router(sample_upstream()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
    let allowed = response
        .headers()
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("authorization"));
    assert!(allowed.contains("x-gw-ims-org-id"));
}
