//! Request parameters and input validation for proxy actions.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::ActionError;

/// Placeholder written in place of credentials when parameters are logged.
const HIDDEN: &str = "<hidden>";

/// Merged parameters of a single action invocation.
///
/// Values come from the query string and the JSON body; header names are
/// stored lower-cased.
#[derive(Debug, Clone, Default)]
pub struct ActionParams {
    values: Map<String, Value>,
    headers: BTreeMap<String, String>,
}

impl ActionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from a JSON object.
    pub fn from_values(values: Map<String, Value>) -> Self {
        Self {
            values,
            headers: BTreeMap::new(),
        }
    }

    /// Add a parameter, replacing any previous value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Add a header. The name is lower-cased.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Set `key` only when it is currently missing.
    pub fn insert_default(&mut self, key: &str, value: impl Into<Value>) {
        if is_missing(self.values.get(key)) {
            self.values.insert(key.to_string(), value.into());
        }
    }

    /// Look up a parameter. Dotted keys traverse nested objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.values.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Look up a string parameter.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parse an optional non-negative integer parameter.
    ///
    /// Accepts JSON numbers and numeric strings (query values arrive as strings).
    pub fn get_u64(&self, key: &str) -> Result<Option<u64>, ActionError> {
        let invalid =
            || ActionError::Validation(format!("parameter '{}' must be a non-negative integer", key));

        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => s.trim().parse::<u64>().map(Some).map_err(|_| invalid()),
            Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(invalid),
            Some(_) => Err(invalid()),
        }
    }

    /// Parameters as a JSON string with the authorization header hidden.
    pub fn redacted(&self) -> String {
        let mut values = self.values.clone();
        let headers: Map<String, Value> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let shown = if name == "authorization" {
                    HIDDEN.to_string()
                } else {
                    value.clone()
                };
                (name.clone(), Value::String(shown))
            })
            .collect();
        values.insert("__headers".to_string(), Value::Object(headers));
        Value::Object(values).to_string()
    }
}

/// A value counts as missing when absent, `null`, or an empty string.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Check that every required parameter and header is present.
///
/// Returns `None` when nothing is missing, otherwise a message such as
/// `missing header(s) 'authorization' and missing parameter(s) 'instance,path'`.
pub fn check_missing_request_inputs(
    params: &ActionParams,
    required_params: &[&str],
    required_headers: &[&str],
) -> Option<String> {
    let missing_headers: Vec<String> = required_headers
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .filter(|h| params.header(h).map_or(true, str::is_empty))
        .collect();

    let missing_params: Vec<&str> = required_params
        .iter()
        .copied()
        .filter(|key| is_missing(params.get(key)))
        .collect();

    let mut message: Option<String> = None;
    if !missing_headers.is_empty() {
        message = Some(format!("missing header(s) '{}'", missing_headers.join(",")));
    }
    if !missing_params.is_empty() {
        let part = format!("missing parameter(s) '{}'", missing_params.join(","));
        message = Some(match message {
            Some(headers) => format!("{} and {}", headers, part),
            None => part,
        });
    }
    message
}

/// Extract the bearer token from the `authorization` header.
pub fn bearer_token(params: &ActionParams) -> Option<&str> {
    params
        .header("authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
}
