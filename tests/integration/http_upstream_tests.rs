//! End-to-end tests for the reqwest upstream client.
//!
//! A local axum server stands in for the repository. It records every
//! request it receives and answers with canned Siren documents.
//!
//! Tests verify:
//! - `configid=ims`, paging parameters and the bearer token on asset requests
//! - Method, content type and body of mutations
//! - Status errors and their message
//! - Rendition download and thumbnail lookup
//! - Translation requests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use url::Url;

use asset_console::actions::ActionService;
use asset_console::error::UpstreamError;
use asset_console::upstream::{fetch_thumbnail, AssetLocation, HttpUpstream, PageRequest, Upstream};
use asset_console::{create_router, ConsoleSettings, RouterConfig};

use super::test_utils::{PNG_BYTES, TOKEN};

// =============================================================================
// Fake Repository
// =============================================================================

#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

type Log = Arc<Mutex<Vec<Captured>>>;

async fn repository(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let host = headers
        .get("host")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost")
        .to_string();

    log.lock().unwrap().push(Captured {
        method: method.clone(),
        uri: uri.clone(),
        headers,
        body: body.clone(),
    });

    let path = uri.path();
    if path.ends_with("/missing.json") {
        return StatusCode::NOT_FOUND.into_response();
    }
    if path.contains("/renditions/") {
        return ([("content-type", "image/png")], Bytes::from_static(PNG_BYTES)).into_response();
    }
    if path == "/translate" {
        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        return Json(json!({ "received": request["text"] })).into_response();
    }
    if path == "/api/assets/logo.png.json" {
        return Json(json!({
            "class": ["assets/asset"],
            "properties": { "name": "logo.png" },
            "links": [
                { "rel": ["self"], "href": format!("http://{}/api/assets/logo.png.json", host) },
                {
                    "rel": ["thumbnail"],
                    "href": format!("http://{}/api/assets/logo.png/renditions/thumb.png", host)
                }
            ]
        }))
        .into_response();
    }
    if path == "/api/assets/notes.txt.json" {
        return Json(json!({
            "class": ["assets/asset"],
            "properties": { "name": "notes.txt" },
            "links": [{ "rel": ["self"], "href": format!("http://{}{}", host, path) }]
        }))
        .into_response();
    }

    Json(json!({
        "class": ["assets/folder"],
        "properties": {
            "name": "wknd",
            "srn:paging": { "offset": 0, "limit": 40, "total": 0 }
        },
        "entities": [],
        "method": method.as_str()
    }))
    .into_response()
}

/// Start the fake repository. Returns its base URL and request log.
async fn start_repository() -> (String, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .fallback(repository)
        .with_state(Arc::clone(&log));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/", addr), log)
}

fn client() -> HttpUpstream {
    HttpUpstream::new(Duration::from_secs(5)).unwrap()
}

fn last(log: &Log) -> Captured {
    log.lock().unwrap().last().cloned().unwrap()
}

fn header<'a>(captured: &'a Captured, name: &str) -> Option<&'a str> {
    captured.headers.get(name).and_then(|v| v.to_str().ok())
}

// =============================================================================
// Asset Requests
// =============================================================================

#[tokio::test]
async fn test_list_sends_config_id_paging_and_token() {
    let (instance, log) = start_repository().await;
    let location = AssetLocation::new(instance, "api/assets", "wknd");

    let page = client()
        .list(&location, TOKEN, PageRequest::new(Some(40), Some(40)))
        .await
        .unwrap();
    assert_eq!(page["properties"]["name"], "wknd");

    let request = last(&log);
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.uri.path(), "/api/assets/wknd.json");
    assert_eq!(request.uri.query(), Some("configid=ims&offset=40&limit=40"));
    assert_eq!(
        header(&request, "authorization"),
        Some(format!("Bearer {}", TOKEN).as_str())
    );
}

#[tokio::test]
async fn test_root_listing_path() {
    let (instance, log) = start_repository().await;
    let location = AssetLocation::new(instance, "/api/assets/", "");

    client()
        .list(&location, TOKEN, PageRequest::default())
        .await
        .unwrap();

    let request = last(&log);
    assert_eq!(request.uri.path(), "/api/assets.json");
    assert_eq!(request.uri.query(), Some("configid=ims"));
}

#[tokio::test]
async fn test_status_error_names_url() {
    let (instance, _log) = start_repository().await;
    let location = AssetLocation::new(instance.clone(), "api/assets", "missing");

    let err = client().entity(&location, TOKEN).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(
        err.to_string(),
        format!(
            "request to {}api/assets/missing.json?configid=ims failed with status code 404",
            instance
        )
    );
}

#[tokio::test]
async fn test_connection_error() {
    let location = AssetLocation::new("http://127.0.0.1:1/", "api/assets", "wknd");

    let err = client().entity(&location, TOKEN).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Connection(_)));
}

#[tokio::test]
async fn test_delete_uses_json_content_type() {
    let (instance, log) = start_repository().await;
    let location = AssetLocation::new(instance, "api/assets", "wknd/old");

    let content = client().delete(&location, TOKEN).await.unwrap();
    assert_eq!(content["method"], "DELETE");

    let request = last(&log);
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.uri.path(), "/api/assets/wknd/old");
    assert_eq!(request.uri.query(), Some("configid=ims"));
    assert_eq!(header(&request, "content-type"), Some("application/json"));
}

#[tokio::test]
async fn test_create_and_update_send_data() {
    let (instance, log) = start_repository().await;
    let location = AssetLocation::new(instance, "api/assets", "wknd/Summer");
    let data = json!({ "class": "assetFolder", "properties": { "title": "Summer" } });

    client().create(&location, TOKEN, &data).await.unwrap();
    let request = last(&log);
    assert_eq!(request.method, Method::POST);
    assert_eq!(serde_json::from_slice::<Value>(&request.body).unwrap(), data);

    client().update(&location, TOKEN, &data).await.unwrap();
    let request = last(&log);
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.uri.path(), "/api/assets/wknd/Summer");
}

// =============================================================================
// Renditions
// =============================================================================

#[tokio::test]
async fn test_fetch_thumbnail_follows_link() {
    let (instance, log) = start_repository().await;
    let location = AssetLocation::new(instance, "api/assets", "logo.png");

    let thumbnail = fetch_thumbnail(&client(), &location, TOKEN)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(thumbnail.data.as_ref(), PNG_BYTES);
    assert_eq!(thumbnail.mime_type, "image/png");

    let requests = log.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].uri.path(), "/api/assets/logo.png/renditions/thumb.png");
    assert_eq!(requests[1].uri.query(), Some("configid=ims"));
    assert!(header(&requests[1], "authorization").is_some());
}

#[tokio::test]
async fn test_fetch_thumbnail_without_link() {
    let (instance, log) = start_repository().await;
    let location = AssetLocation::new(instance, "api/assets", "notes.txt");

    let thumbnail = fetch_thumbnail(&client(), &location, TOKEN).await.unwrap();
    assert!(thumbnail.is_none());
    assert_eq!(log.lock().unwrap().len(), 1);
}

// =============================================================================
// Translation
// =============================================================================

#[tokio::test]
async fn test_translate_wraps_text_in_quotes() {
    let (instance, log) = start_repository().await;
    let endpoint = Url::parse(&format!("{}translate", instance)).unwrap();
    let upstream = client().with_translate_endpoint(endpoint);

    let content = upstream.translate("Guten Tag").await.unwrap();
    assert_eq!(content["received"], "\"Guten Tag\"");

    let request = last(&log);
    assert_eq!(request.method, Method::POST);
    assert!(header(&request, "authorization").is_none());
}

// =============================================================================
// Full Stack
// =============================================================================

#[tokio::test]
async fn test_thumbnail_action_through_proxy() {
    let (instance, _log) = start_repository().await;
    let router = create_router(
        ActionService::new(client()),
        ConsoleSettings::default(),
        RouterConfig::new().with_tracing(false),
    );

    let body = json!({ "instance": instance, "api": "api/assets", "path": "logo.png" });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/thumbnail")
        .header("authorization", format!("Bearer {}", TOKEN))
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["mimeType"], "image/png");
}
