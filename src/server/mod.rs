//! HTTP server layer for the asset console.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │        POST /api/v1/{action}        GET /        GET /health    │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │   console   │  │        routes           │  │
//! │  │ (envelopes) │  │   (page)    │  │  (router, CORS)         │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                     actions::ActionService
//! ```

pub mod console;
pub mod handlers;
pub mod routes;

pub use console::{generate_console_html, ConsoleSettings};
pub use handlers::{
    action_handler, console_handler, envelope_response, health_handler, AppState, ErrorResponse,
    HandlerError, HealthResponse,
};
pub use routes::{create_router, RouterConfig, IMS_ORG_HEADER};
