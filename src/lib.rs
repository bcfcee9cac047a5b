//! # Asset Console
//!
//! A browser console and authenticated proxy for a remote content
//! repository's Assets API.
//!
//! The proxy forwards the caller's bearer token to the repository and answers
//! with a `{statusCode, body}` envelope. The console lists folders page by
//! page, shows thumbnails, and creates, edits and deletes folders and content
//! fragments.
//!
//! ## Features
//!
//! - **Proxy actions**: read, delete, thumbnail, create, update and translate
//! - **Pagination**: folders load 40 items at a time, more on demand
//! - **Thumbnail cancellation**: leaving a folder aborts its pending fetches
//! - **Built-in console**: a single page served at `/`
//!
//! ## Architecture
//!
//! - [`upstream`] - Siren model and the `reqwest` client for the Assets API
//! - [`actions`] - Parameter validation and the proxy actions
//! - [`browse`] - Paths, pagination, thumbnails and folder navigation
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use asset_console::{ActionService, ConsoleSettings, HttpUpstream, RouterConfig, create_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let upstream = HttpUpstream::new(Duration::from_secs(30))?;
//!     let router = create_router(
//!         ActionService::new(upstream),
//!         ConsoleSettings::default(),
//!         RouterConfig::new(),
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:9080").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod browse;
pub mod config;
pub mod error;
pub mod server;
pub mod upstream;

// Re-export commonly used types
pub use actions::{
    bearer_token, check_missing_request_inputs, error_response, Action, ActionDefaults,
    ActionParams, ActionResponse, ActionService,
};
pub use browse::{
    slugify_name, AssetPath, Breadcrumb, Listing, Navigator, ThumbnailLoader, ThumbnailResult,
    DEFAULT_PAGE_SIZE,
};
pub use config::{BrowseConfig, CheckConfig, Cli, Command, ServeConfig};
pub use error::{ActionError, BrowseError, UpstreamError};
pub use server::{create_router, AppState, ConsoleSettings, ErrorResponse, RouterConfig};
pub use upstream::{
    fetch_thumbnail, AssetLocation, Entity, EntityPage, HttpUpstream, PageRequest, Thumbnail,
    Upstream,
};
