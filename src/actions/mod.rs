//! Proxy actions.
//!
//! Each action validates its inputs, forwards one authenticated call to the
//! upstream (two for `thumbnail`) and maps the result to a fixed
//! `{statusCode, body}` envelope:
//!
//! | Action      | Required params                 | Upstream call                      |
//! |-------------|---------------------------------|------------------------------------|
//! | `read`      | instance, api                   | `GET {path}.json?offset&limit`     |
//! | `delete`    | instance, api, path             | `DELETE {path}`                    |
//! | `thumbnail` | instance, api, path             | `GET {path}.json`, then rendition  |
//! | `create`    | instance, api, path, data       | `POST {path}`                      |
//! | `update`    | instance, api, path, data       | `PUT {path}`                       |
//! | `translate` | text                            | `POST` to the translation flow     |
//!
//! All but `translate` require an `Authorization: Bearer` header.

mod params;
mod response;
mod service;

pub use params::{bearer_token, check_missing_request_inputs, ActionParams};
pub use response::{error_response, ActionResponse};
pub use service::{Action, ActionDefaults, ActionService};
