//! Router configuration for the asset console.
//!
//! # Route Structure
//!
//! ```text
//! /                    - Console page
//! /health              - Health check
//! /api/v1/{action}     - Proxy actions (read, delete, thumbnail, create, update, translate)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use asset_console::actions::ActionService;
//! use asset_console::server::{create_router, ConsoleSettings, RouterConfig};
//! use asset_console::upstream::HttpUpstream;
//!
//! let upstream = HttpUpstream::new(Duration::from_secs(30))?;
//! let actions = ActionService::new(upstream);
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(actions, ConsoleSettings::default(), config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:9080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::console::ConsoleSettings;
use super::handlers::{action_handler, console_handler, health_handler, AppState};
use crate::actions::ActionService;
use crate::upstream::Upstream;

/// Organization header sent by the console shell along with the token.
pub const IMS_ORG_HEADER: &str = "x-gw-ims-org-id";

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `actions` - The action service backing `/api/v1/{action}`
/// * `console` - Settings rendered into the console page
/// * `config` - Router configuration
pub fn create_router<U>(
    actions: ActionService<U>,
    console: ConsoleSettings,
    config: RouterConfig,
) -> Router
where
    U: Upstream,
{
    let app_state = AppState::new(actions).with_console(console);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(console_handler::<U>))
        .route("/health", get(health_handler))
        .route("/api/v1/{action}", post(action_handler::<U>))
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(IMS_ORG_HEADER),
        ])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
