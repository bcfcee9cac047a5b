//! Proxy actions over an [`Upstream`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::params::{bearer_token, check_missing_request_inputs, ActionParams};
use super::response::{error_response, ActionResponse};
use crate::error::ActionError;
use crate::upstream::{fetch_thumbnail, AssetLocation, PageRequest, Upstream};

/// Header that carries the caller's credentials.
const AUTHORIZATION: &str = "authorization";

/// Message returned for any translation failure.
const TRANSLATE_FAILURE: &str = "server error";

// =============================================================================
// Action Names
// =============================================================================

/// The actions exposed by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Delete,
    Thumbnail,
    Create,
    Update,
    Translate,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Read,
        Action::Delete,
        Action::Thumbnail,
        Action::Create,
        Action::Update,
        Action::Translate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Delete => "delete",
            Action::Thumbnail => "thumbnail",
            Action::Create => "create",
            Action::Update => "update",
            Action::Translate => "translate",
        }
    }

    /// Parameters that must be present for this action.
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            Action::Read => &["instance", "api"],
            Action::Delete | Action::Thumbnail => &["instance", "api", "path"],
            Action::Create | Action::Update => &["instance", "api", "path", "data"],
            Action::Translate => &["text"],
        }
    }

    /// Headers that must be present for this action.
    pub fn required_headers(self) -> &'static [&'static str] {
        match self {
            Action::Translate => &[],
            _ => &[AUTHORIZATION],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

// =============================================================================
// Defaults
// =============================================================================

/// Server-side defaults applied before validation.
#[derive(Debug, Clone, Default)]
pub struct ActionDefaults {
    /// Instance used when the client does not send one
    pub instance: Option<String>,

    /// API prefix used when the client does not send one
    pub api: Option<String>,

    /// Instances clients may target (None = any)
    pub allowed_instances: Option<Vec<String>>,
}

impl ActionDefaults {
    fn apply(&self, params: &mut ActionParams) {
        if let Some(ref instance) = self.instance {
            params.insert_default("instance", instance.as_str());
        }
        if let Some(ref api) = self.api {
            params.insert_default("api", api.as_str());
        }
    }

    fn check_instance(&self, instance: &str) -> Result<(), ActionError> {
        match &self.allowed_instances {
            None => Ok(()),
            Some(allowed) => {
                let normalized = instance.trim_end_matches('/');
                if allowed
                    .iter()
                    .any(|a| a.trim_end_matches('/') == normalized)
                {
                    Ok(())
                } else {
                    Err(ActionError::Forbidden(instance.to_string()))
                }
            }
        }
    }
}

// =============================================================================
// Action Service
// =============================================================================

/// Runs proxy actions against an upstream.
///
/// Every action validates its inputs, forwards the caller's bearer token and
/// maps the outcome to an [`ActionResponse`]. Actions never fail: errors are
/// turned into 4xx/5xx envelopes.
pub struct ActionService<U: Upstream> {
    upstream: Arc<U>,
    defaults: ActionDefaults,
}

impl<U: Upstream> Clone for ActionService<U> {
    fn clone(&self) -> Self {
        Self {
            upstream: Arc::clone(&self.upstream),
            defaults: self.defaults.clone(),
        }
    }
}

impl<U: Upstream> ActionService<U> {
    pub fn new(upstream: U) -> Self {
        Self::from_shared(Arc::new(upstream))
    }

    pub fn from_shared(upstream: Arc<U>) -> Self {
        Self {
            upstream,
            defaults: ActionDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: ActionDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn upstream(&self) -> &Arc<U> {
        &self.upstream
    }

    pub fn defaults(&self) -> &ActionDefaults {
        &self.defaults
    }

    /// Run `action` with the given parameters.
    pub async fn run(&self, action: Action, mut params: ActionParams) -> ActionResponse {
        info!(action = %action, "Calling the {} action", action);
        debug!(action = %action, params = %params.redacted(), "Action parameters");

        self.defaults.apply(&mut params);

        let result = match action {
            Action::Read => self.read(&params).await,
            Action::Delete => self.delete(&params).await,
            Action::Thumbnail => self.thumbnail(&params).await,
            Action::Create => self.create(&params).await,
            Action::Update => self.update(&params).await,
            Action::Translate => self.translate(&params).await,
        };

        match result {
            Ok(response) => {
                if response.is_success() {
                    info!(
                        action = %action,
                        status = response.status_code,
                        "{}: successful request",
                        response.status_code
                    );
                }
                response
            }
            Err(ActionError::Validation(message)) => error_response(400, message),
            Err(err @ ActionError::Forbidden(_)) => error_response(403, err.to_string()),
            Err(ActionError::Upstream(err)) => {
                error!(action = %action, error = %err, "Upstream request failed");
                if action == Action::Translate {
                    error_response(500, TRANSLATE_FAILURE)
                } else {
                    error_response(500, err.to_string())
                }
            }
        }
    }

    async fn read(&self, params: &ActionParams) -> Result<ActionResponse, ActionError> {
        let (location, token) = self.prepare(Action::Read, params)?;
        let limit = params
            .get_u64("limit")?
            .map(u32::try_from)
            .transpose()
            .map_err(|_| {
                ActionError::Validation(format!(
                    "parameter 'limit' must not exceed {}",
                    u32::MAX
                ))
            })?;
        let page = PageRequest::new(params.get_u64("offset")?, limit);

        let content = self.upstream.list(&location, token, page).await?;
        Ok(ActionResponse::ok(content))
    }

    async fn delete(&self, params: &ActionParams) -> Result<ActionResponse, ActionError> {
        let (location, token) = self.prepare(Action::Delete, params)?;
        let content = self.upstream.delete(&location, token).await?;
        Ok(ActionResponse::ok(content))
    }

    async fn thumbnail(&self, params: &ActionParams) -> Result<ActionResponse, ActionError> {
        let (location, token) = self.prepare(Action::Thumbnail, params)?;

        let Some(thumbnail) = fetch_thumbnail(self.upstream.as_ref(), &location, token).await?
        else {
            info!(path = %location.path, "404: no thumbnail rendition");
            return Ok(ActionResponse::not_found());
        };

        Ok(ActionResponse::ok(json!({
            "base64": STANDARD.encode(&thumbnail.data),
            "mimeType": thumbnail.mime_type,
        })))
    }

    async fn create(&self, params: &ActionParams) -> Result<ActionResponse, ActionError> {
        let (location, token) = self.prepare(Action::Create, params)?;
        let data = payload(params)?;
        let content = self.upstream.create(&location, token, data).await?;
        Ok(ActionResponse::ok(content))
    }

    async fn update(&self, params: &ActionParams) -> Result<ActionResponse, ActionError> {
        let (location, token) = self.prepare(Action::Update, params)?;
        let data = payload(params)?;
        let content = self.upstream.update(&location, token, data).await?;
        Ok(ActionResponse::ok(content))
    }

    async fn translate(&self, params: &ActionParams) -> Result<ActionResponse, ActionError> {
        validate(Action::Translate, params)?;
        let text = string_param(params, "text")?;
        let content = self.upstream.translate(text).await?;
        Ok(ActionResponse::ok(content))
    }

    /// Validate inputs and resolve the target location and bearer token.
    fn prepare<'a>(
        &self,
        action: Action,
        params: &'a ActionParams,
    ) -> Result<(AssetLocation, &'a str), ActionError> {
        validate(action, params)?;

        let instance = string_param(params, "instance")?;
        self.defaults.check_instance(instance)?;
        let api = string_param(params, "api")?;
        let path = match params.get("path") {
            None | Some(Value::Null) => "",
            Some(_) => string_param(params, "path")?,
        };

        let token = bearer_token(params).ok_or_else(|| {
            ActionError::Validation("authorization header must carry a Bearer token".to_string())
        })?;

        Ok((AssetLocation::new(instance, api, path), token))
    }
}

fn validate(action: Action, params: &ActionParams) -> Result<(), ActionError> {
    match check_missing_request_inputs(params, action.required_params(), action.required_headers())
    {
        Some(message) => Err(ActionError::Validation(message)),
        None => Ok(()),
    }
}

fn string_param<'a>(params: &'a ActionParams, key: &str) -> Result<&'a str, ActionError> {
    params
        .get_str(key)
        .ok_or_else(|| ActionError::Validation(format!("parameter '{}' must be a string", key)))
}

fn payload(params: &ActionParams) -> Result<&Value, ActionError> {
    match params.get("data") {
        Some(data @ Value::Object(_)) => Ok(data),
        _ => Err(ActionError::Validation(
            "parameter 'data' must be an object".to_string(),
        )),
    }
}
