//! Configuration management for the asset console.
//!
//! This module provides the CLI and configuration types:
//! - Subcommands for serving, browsing from the terminal and checking connectivity
//! - Environment variables with `ASSETS_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! - `ASSETS_HOST` - Server bind address (default: 0.0.0.0)
//! - `ASSETS_PORT` - Server port (default: 9080)
//! - `ASSETS_INSTANCE` - Default repository instance URL
//! - `ASSETS_API` - API prefix on the instance (default: api/assets)
//! - `ASSETS_ALLOWED_INSTANCES` - Instances clients may target (comma-separated)
//! - `ASSETS_TRANSLATE_ENDPOINT` - Translation service URL
//! - `ASSETS_UPSTREAM_TIMEOUT` - Upstream request timeout in seconds (default: 30)
//! - `ASSETS_CORS_ORIGINS` - Allowed CORS origins (comma-separated)
//! - `ASSETS_PAGE_SIZE` - Items per page (default: 40)
//! - `ASSETS_FRAGMENT_MODEL` - Model for new content fragments
//! - `ASSETS_TOKEN` - Bearer token for `browse` and `check`

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::browse::{DEFAULT_FRAGMENT_MODEL, DEFAULT_PAGE_SIZE};
use crate::upstream::DEFAULT_UPSTREAM_TIMEOUT_SECS;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 9080;

/// Default API prefix on the instance.
pub const DEFAULT_API: &str = "api/assets";

/// Largest page size accepted by the Assets API.
pub const MAX_PAGE_SIZE: u32 = 1000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Asset Console - browse and edit a remote content repository's assets.
#[derive(Parser, Debug, Clone)]
#[command(name = "asset-console")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the proxy actions and the console page.
    Serve(ServeConfig),

    /// List a folder from the terminal.
    Browse(BrowseConfig),

    /// Verify that the upstream answers with the given token.
    Check(CheckConfig),
}

// =============================================================================
// Serve
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "ASSETS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "ASSETS_PORT")]
    pub port: u16,

    // =========================================================================
    // Upstream Configuration
    // =========================================================================
    /// Repository instance used when a request does not name one.
    #[arg(long, env = "ASSETS_INSTANCE")]
    pub instance: Option<String>,

    /// API prefix on the instance.
    #[arg(long, default_value = DEFAULT_API, env = "ASSETS_API")]
    pub api: String,

    /// Instances clients may target (comma-separated).
    ///
    /// If not specified, any instance is accepted.
    #[arg(long, env = "ASSETS_ALLOWED_INSTANCES", value_delimiter = ',')]
    pub allowed_instances: Option<Vec<String>>,

    /// Translation service endpoint.
    ///
    /// If not specified, the translate action fails.
    #[arg(long, env = "ASSETS_TRANSLATE_ENDPOINT")]
    pub translate_endpoint: Option<String>,

    /// Upstream request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS, env = "ASSETS_UPSTREAM_TIMEOUT")]
    pub upstream_timeout: u64,

    // =========================================================================
    // Console Configuration
    // =========================================================================
    /// Items requested per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, env = "ASSETS_PAGE_SIZE")]
    pub page_size: u32,

    /// Model used for new content fragments.
    #[arg(long, default_value = DEFAULT_FRAGMENT_MODEL, env = "ASSETS_FRAGMENT_MODEL")]
    pub fragment_model: String,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "ASSETS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref instance) = self.instance {
            validate_instance(instance)?;
        }
        if let Some(ref allowed) = self.allowed_instances {
            if allowed.is_empty() {
                return Err(
                    "allowed_instances is empty. Omit it to accept any instance".to_string(),
                );
            }
            for instance in allowed {
                validate_instance(instance)?;
            }
        }
        if let Some(ref endpoint) = self.translate_endpoint {
            Url::parse(endpoint)
                .map_err(|e| format!("Invalid translate endpoint '{}': {}", endpoint, e))?;
        }
        validate_api(&self.api)?;
        validate_page_size(self.page_size)?;

        if self.upstream_timeout == 0 {
            return Err("upstream_timeout must be greater than 0".to_string());
        }
        if self.fragment_model.trim().is_empty() {
            return Err("fragment_model must not be empty".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    /// Parsed translation endpoint (call validate() first).
    pub fn translate_url(&self) -> Option<Url> {
        self.translate_endpoint
            .as_deref()
            .and_then(|endpoint| Url::parse(endpoint).ok())
    }
}

// =============================================================================
// Browse
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct BrowseConfig {
    /// Repository instance URL.
    #[arg(long, env = "ASSETS_INSTANCE")]
    pub instance: String,

    /// API prefix on the instance.
    #[arg(long, default_value = DEFAULT_API, env = "ASSETS_API")]
    pub api: String,

    /// Bearer token sent to the instance.
    #[arg(long, env = "ASSETS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Folder to list, relative to the API root.
    #[arg(default_value = "")]
    pub path: String,

    /// Items requested per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, env = "ASSETS_PAGE_SIZE")]
    pub page_size: u32,

    /// Keep loading pages until the folder is complete.
    #[arg(long, default_value_t = false)]
    pub all: bool,

    /// Fetch the thumbnail of every listed item.
    #[arg(long, default_value_t = false)]
    pub thumbnails: bool,

    /// Upstream request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS, env = "ASSETS_UPSTREAM_TIMEOUT")]
    pub upstream_timeout: u64,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl BrowseConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_instance(&self.instance)?;
        validate_api(&self.api)?;
        validate_token(&self.token)?;
        validate_page_size(self.page_size)?;
        if self.upstream_timeout == 0 {
            return Err("upstream_timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Check
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Repository instance URL.
    #[arg(long, env = "ASSETS_INSTANCE")]
    pub instance: String,

    /// API prefix on the instance.
    #[arg(long, default_value = DEFAULT_API, env = "ASSETS_API")]
    pub api: String,

    /// Bearer token sent to the instance.
    #[arg(long, env = "ASSETS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CheckConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_instance(&self.instance)?;
        validate_api(&self.api)?;
        validate_token(&self.token)
    }
}

// =============================================================================
// Validation Helpers
// =============================================================================

fn validate_instance(instance: &str) -> Result<(), String> {
    let url = Url::parse(instance)
        .map_err(|e| format!("Invalid instance URL '{}': {}", instance, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!(
            "Instance URL '{}' must use http or https, not {}",
            instance, scheme
        )),
    }
}

fn validate_api(api: &str) -> Result<(), String> {
    if api.trim_matches('/').is_empty() {
        return Err("api prefix must not be empty".to_string());
    }
    Ok(())
}

fn validate_token(token: &str) -> Result<(), String> {
    if token.trim().is_empty() {
        return Err("A bearer token is required. Set --token or ASSETS_TOKEN".to_string());
    }
    Ok(())
}

fn validate_page_size(page_size: u32) -> Result<(), String> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(format!("page_size must be between 1 and {}", MAX_PAGE_SIZE));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
