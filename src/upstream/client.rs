use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{AssetLocation, PageRequest, Upstream, CONFIG_ID_QUERY};
use crate::error::UpstreamError;

/// Default timeout for a single upstream request.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// `reqwest`-backed implementation of `Upstream`.
///
/// Asset requests go to `{instance}/{api}/{path}` with `configid=ims` and the
/// caller's bearer token. Translation requests go to a fixed flow endpoint
/// without credentials.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
    translate_endpoint: Option<Url>,
}

impl HttpUpstream {
    /// Create a client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("asset-console/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            translate_endpoint: None,
        })
    }

    /// Set the translation flow endpoint.
    pub fn with_translate_endpoint(mut self, endpoint: Url) -> Self {
        self.translate_endpoint = Some(endpoint);
        self
    }

    /// Translation endpoint, if configured.
    pub fn translate_endpoint(&self) -> Option<&Url> {
        self.translate_endpoint.as_ref()
    }

    fn asset_url(
        &self,
        location: &AssetLocation,
        suffix: &str,
        page: PageRequest,
    ) -> Result<Url, UpstreamError> {
        let raw = location.endpoint(suffix);
        let mut url = parse_url(&raw)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(CONFIG_ID_QUERY.0, CONFIG_ID_QUERY.1);
            if let Some(offset) = page.offset {
                query.append_pair("offset", &offset.to_string());
            }
            if let Some(limit) = page.limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    fn authorized(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
    }

    async fn send_json(&self, request: RequestBuilder, url: &Url) -> Result<Value, UpstreamError> {
        let response = send(request, url).await?;
        response.json::<Value>().await.map_err(|e| UpstreamError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn list(
        &self,
        location: &AssetLocation,
        token: &str,
        page: PageRequest,
    ) -> Result<Value, UpstreamError> {
        let url = self.asset_url(location, ".json", page)?;
        debug!(url = %url, "Listing folder");
        let request = self.authorized(Method::GET, url.clone(), token);
        self.send_json(request, &url).await
    }

    async fn entity(&self, location: &AssetLocation, token: &str) -> Result<Value, UpstreamError> {
        let url = self.asset_url(location, ".json", PageRequest::default())?;
        debug!(url = %url, "Fetching entity");
        let request = self.authorized(Method::GET, url.clone(), token);
        self.send_json(request, &url).await
    }

    async fn delete(&self, location: &AssetLocation, token: &str) -> Result<Value, UpstreamError> {
        let url = self.asset_url(location, "", PageRequest::default())?;
        debug!(url = %url, "Deleting asset");
        let request = self
            .authorized(Method::DELETE, url.clone(), token)
            .header(CONTENT_TYPE, "application/json");
        self.send_json(request, &url).await
    }

    async fn create(
        &self,
        location: &AssetLocation,
        token: &str,
        data: &Value,
    ) -> Result<Value, UpstreamError> {
        let url = self.asset_url(location, "", PageRequest::default())?;
        debug!(url = %url, "Creating asset");
        let request = self.authorized(Method::POST, url.clone(), token).json(data);
        self.send_json(request, &url).await
    }

    async fn update(
        &self,
        location: &AssetLocation,
        token: &str,
        data: &Value,
    ) -> Result<Value, UpstreamError> {
        let url = self.asset_url(location, "", PageRequest::default())?;
        debug!(url = %url, "Updating asset");
        let request = self.authorized(Method::PUT, url.clone(), token).json(data);
        self.send_json(request, &url).await
    }

    async fn rendition(&self, href: &str, token: &str) -> Result<Bytes, UpstreamError> {
        let mut url = parse_url(href)?;
        url.query_pairs_mut()
            .append_pair(CONFIG_ID_QUERY.0, CONFIG_ID_QUERY.1);
        debug!(url = %url, "Downloading rendition");

        let request = self.authorized(Method::GET, url.clone(), token);
        let response = send(request, &url).await?;
        response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Connection(e.to_string()))
    }

    async fn translate(&self, text: &str) -> Result<Value, UpstreamError> {
        let url = self
            .translate_endpoint
            .clone()
            .ok_or(UpstreamError::NotConfigured("translation"))?;

        // The flow expects the text wrapped in literal quotes.
        let body = json!({ "text": format!("\"{}\"", text) });
        let request = self.client.post(url.clone()).json(&body);
        self.send_json(request, &url).await
    }
}

fn parse_url(raw: &str) -> Result<Url, UpstreamError> {
    Url::parse(raw).map_err(|e| UpstreamError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })
}

async fn send(request: RequestBuilder, url: &Url) -> Result<Response, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(|e| UpstreamError::Connection(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}
