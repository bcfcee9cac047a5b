//! HTTP request handlers for the asset console.
//!
//! This module contains the Axum handlers for the proxy actions, the console
//! page and health checks.
//!
//! # Endpoints
//!
//! - `POST /api/v1/{action}` - Run a proxy action
//! - `GET /` - Console page
//! - `GET /health` - Health check endpoint

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::actions::{Action, ActionParams, ActionResponse, ActionService};
use crate::upstream::Upstream;

use super::console::{generate_console_html, ConsoleSettings};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the action service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<U: Upstream> {
    /// The action service for proxy requests
    pub actions: ActionService<U>,

    /// Settings rendered into the console page
    pub console: Arc<ConsoleSettings>,
}

impl<U: Upstream> AppState<U> {
    /// Create a new application state with default console settings.
    pub fn new(actions: ActionService<U>) -> Self {
        Self {
            actions,
            console: Arc::new(ConsoleSettings::default()),
        }
    }

    /// Set the console page settings.
    pub fn with_console(mut self, console: ConsoleSettings) -> Self {
        self.console = Arc::new(console);
        self
    }
}

impl<U: Upstream> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            console: Arc::clone(&self.console),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for request errors outside the action envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "unknown_action", "invalid_body")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Errors raised before an action runs.
#[derive(Debug)]
pub enum HandlerError {
    /// No action with this name
    UnknownAction(String),

    /// Body is not a JSON object
    InvalidBody(String),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            HandlerError::UnknownAction(name) => (
                StatusCode::NOT_FOUND,
                "unknown_action",
                format!("Unknown action: {}", name),
            ),
            HandlerError::InvalidBody(reason) => (
                StatusCode::BAD_REQUEST,
                "invalid_body",
                format!("Invalid request body: {}", reason),
            ),
        };

        if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

/// Render an action envelope as an HTTP response.
///
/// The envelope status becomes the HTTP status and its body, if any, the
/// JSON response body.
pub fn envelope_response(envelope: ActionResponse) -> Response {
    let status = StatusCode::from_u16(envelope.status_code).unwrap_or_else(|_| {
        error!(
            status = envelope.status_code,
            "Action returned an invalid status code"
        );
        StatusCode::INTERNAL_SERVER_ERROR
    });

    match envelope.body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    }
}

/// Merge query and body parameters. Body values win.
fn parse_params(
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<ActionParams, HandlerError> {
    let mut values: Map<String, Value> = query
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    if !body.iter().all(u8::is_ascii_whitespace) {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(object)) => values.extend(object),
            Ok(_) => {
                return Err(HandlerError::InvalidBody(
                    "expected a JSON object".to_string(),
                ))
            }
            Err(e) => return Err(HandlerError::InvalidBody(e.to_string())),
        }
    }

    let mut params = ActionParams::from_values(values);
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            params.insert_header(name.as_str(), value);
        }
    }
    Ok(params)
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle proxy action requests.
///
/// # Endpoint
///
/// `POST /api/v1/{action}`
///
/// # Parameters
///
/// Query string parameters and the fields of an optional JSON object body,
/// merged (body wins). The `Authorization` header is forwarded upstream.
///
/// # Response
///
/// The action's `{statusCode, body}` envelope: the status code becomes the
/// HTTP status and the body the JSON response body.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or missing inputs
/// - `403 Forbidden`: Instance not allowed
/// - `404 Not Found`: Unknown action, or no thumbnail rendition
/// - `500 Internal Server Error`: Upstream failure
pub async fn action_handler<U: Upstream>(
    State(state): State<AppState<U>>,
    Path(action): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HandlerError> {
    let action: Action = action
        .parse()
        .map_err(|_| HandlerError::UnknownAction(action.clone()))?;

    let params = parse_params(query, &headers, &body)?;
    let envelope = state.actions.run(action, params).await;

    Ok(envelope_response(envelope))
}

/// Handle console page requests.
///
/// # Endpoint
///
/// `GET /`
pub async fn console_handler<U: Upstream>(State(state): State<AppState<U>>) -> Html<String> {
    Html(generate_console_html(&state.console))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
