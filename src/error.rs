use thiserror::Error;

/// Errors that can occur when talking to the remote Assets API
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status
    #[error("request to {url} failed with status code {status}")]
    Status { url: String, status: u16 },

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Response body could not be decoded
    #[error("Invalid upstream response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Endpoint was not configured for this deployment
    #[error("{0} endpoint is not configured")]
    NotConfigured(&'static str),

    /// URL could not be built from the request inputs
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl UpstreamError {
    /// HTTP status reported by the upstream, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while handling a proxy action
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    /// Required parameters or headers are missing or malformed (HTTP 400)
    #[error("{0}")]
    Validation(String),

    /// Request targets an instance outside the allow-list (HTTP 403)
    #[error("instance '{0}' is not allowed")]
    Forbidden(String),

    /// Upstream call failed (HTTP 500)
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Errors raised by the navigation core
#[derive(Debug, Clone, Error)]
pub enum BrowseError {
    /// Upstream call failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Listing did not match the expected Siren shape
    #[error("Malformed listing for '{path}': {message}")]
    MalformedListing { path: String, message: String },

    /// Title does not yield a usable node name
    #[error("Invalid node name '{0}'")]
    InvalidName(String),
}
