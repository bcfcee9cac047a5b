//! Test utilities for integration tests.
//!
//! This module provides an in-memory `Upstream` with call recording, and
//! helpers for building Siren entities.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use asset_console::error::UpstreamError;
use asset_console::upstream::{AssetLocation, PageRequest, Upstream};

pub const INSTANCE: &str = "https://author.example.com/";
pub const API: &str = "api/assets";
pub const TOKEN: &str = "test-token";

/// Smallest valid PNG signature, enough for format sniffing.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// JPEG start-of-image marker followed by an APP0 segment marker.
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10];

// =============================================================================
// Entity Builders
// =============================================================================

fn child_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

fn self_href(path: &str) -> String {
    format!("{}{}/{}.json", INSTANCE, API, path)
}

/// Href of the thumbnail rendition of `path`.
pub fn thumbnail_href(path: &str) -> String {
    format!(
        "{}{}/{}/renditions/cq5dam.thumbnail.140.100.png",
        INSTANCE, API, path
    )
}

/// A folder entity inside `parent`.
pub fn folder_entity(parent: &str, name: &str) -> Value {
    json!({
        "class": ["assets/folder"],
        "properties": { "name": name, "title": name },
        "links": [{ "rel": ["self"], "href": self_href(&child_path(parent, name)) }]
    })
}

/// A binary asset inside `parent`, optionally with a thumbnail link.
pub fn asset_entity(parent: &str, name: &str, with_thumbnail: bool) -> Value {
    let path = child_path(parent, name);
    let mut links = vec![json!({ "rel": ["self"], "href": self_href(&path) })];
    if with_thumbnail {
        links.push(json!({ "rel": ["thumbnail"], "href": thumbnail_href(&path) }));
    }
    json!({
        "class": ["assets/asset"],
        "properties": { "name": name },
        "links": links
    })
}

/// A content fragment inside `parent`.
pub fn fragment_entity(parent: &str, name: &str, title: &str, text: &str) -> Value {
    json!({
        "class": ["assets/asset"],
        "properties": {
            "name": name,
            "title": title,
            "contentFragment": true,
            "elements": {
                "title": { "value": title, ":type": "string" },
                "text": { "value": text, ":type": "text/html" }
            }
        },
        "links": [{ "rel": ["self"], "href": self_href(&child_path(parent, name)) }]
    })
}

// =============================================================================
// Mock Upstream
// =============================================================================

/// One recorded upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub target: String,
    pub token: Option<String>,
    pub page: PageRequest,
    pub data: Option<Value>,
}

impl Call {
    fn new(method: &'static str, target: impl Into<String>, token: Option<&str>) -> Self {
        Self {
            method,
            target: target.into(),
            token: token.map(str::to_string),
            page: PageRequest::default(),
            data: None,
        }
    }
}

/// An in-memory asset tree.
///
/// Folders are keyed by path relative to the API root. Creating and deleting
/// items updates the tree, so navigation tests can observe the change.
pub struct MockUpstream {
    folders: RwLock<HashMap<String, Vec<Value>>>,
    renditions: HashMap<String, Bytes>,
    calls: RwLock<Vec<Call>>,
    rendition_delay: Option<Duration>,
    failure: Option<UpstreamError>,
    renditions_started: AtomicUsize,
    renditions_finished: AtomicUsize,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self {
            folders: RwLock::new(HashMap::new()),
            renditions: HashMap::new(),
            calls: RwLock::new(Vec::new()),
            rendition_delay: None,
            failure: None,
            renditions_started: AtomicUsize::new(0),
            renditions_finished: AtomicUsize::new(0),
        }
    }

    pub fn with_folder(mut self, path: impl Into<String>, children: Vec<Value>) -> Self {
        self.folders.get_mut().insert(path.into(), children);
        self
    }

    pub fn with_rendition(mut self, href: impl Into<String>, data: &[u8]) -> Self {
        self.renditions
            .insert(href.into(), Bytes::copy_from_slice(data));
        self
    }

    pub fn with_rendition_delay(mut self, delay: Duration) -> Self {
        self.rendition_delay = Some(delay);
        self
    }

    /// Fail every call with `error`.
    pub fn failing(mut self, error: UpstreamError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.read().await.clone()
    }

    pub async fn calls_to(&self, method: &str) -> Vec<Call> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    pub async fn children(&self, path: &str) -> Vec<Value> {
        self.folders
            .read()
            .await
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn renditions_started(&self) -> usize {
        self.renditions_started.load(Ordering::SeqCst)
    }

    pub fn renditions_finished(&self) -> usize {
        self.renditions_finished.load(Ordering::SeqCst)
    }

    async fn record(&self, call: Call) -> Result<(), UpstreamError> {
        self.calls.write().await.push(call);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn not_found(location: &AssetLocation, suffix: &str) -> UpstreamError {
        UpstreamError::Status {
            url: location.endpoint(suffix),
            status: 404,
        }
    }

    async fn find_entity(&self, path: &str) -> Option<Value> {
        let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
        self.folders
            .read()
            .await
            .get(parent)?
            .iter()
            .find(|entity| entity["properties"]["name"] == name)
            .cloned()
    }
}

impl Default for MockUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn list(
        &self,
        location: &AssetLocation,
        token: &str,
        page: PageRequest,
    ) -> Result<Value, UpstreamError> {
        let mut call = Call::new("list", location.path.clone(), Some(token));
        call.page = page;
        self.record(call).await?;

        let folders = self.folders.read().await;
        let children = folders
            .get(location.path.trim_matches('/'))
            .ok_or_else(|| Self::not_found(location, ".json"))?;

        let total = children.len();
        let offset = page.offset.unwrap_or(0) as usize;
        let limit = page.limit.map(|l| l as usize).unwrap_or(total);
        let entities: Vec<Value> = children.iter().skip(offset).take(limit).cloned().collect();

        Ok(json!({
            "class": ["assets/folder"],
            "properties": {
                "name": location.path.rsplit('/').next().unwrap_or(""),
                "srn:paging": { "offset": offset, "limit": limit, "total": total }
            },
            "entities": entities,
            "links": [{ "rel": ["self"], "href": location.endpoint(".json") }]
        }))
    }

    async fn entity(&self, location: &AssetLocation, token: &str) -> Result<Value, UpstreamError> {
        self.record(Call::new("entity", location.path.clone(), Some(token)))
            .await?;

        self.find_entity(location.path.trim_matches('/'))
            .await
            .ok_or_else(|| Self::not_found(location, ".json"))
    }

    async fn delete(&self, location: &AssetLocation, token: &str) -> Result<Value, UpstreamError> {
        self.record(Call::new("delete", location.path.clone(), Some(token)))
            .await?;

        let path = location.path.trim_matches('/');
        let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
        let mut folders = self.folders.write().await;
        let children = folders
            .get_mut(parent)
            .ok_or_else(|| Self::not_found(location, ""))?;
        let before = children.len();
        children.retain(|entity| entity["properties"]["name"] != name);
        if children.len() == before {
            return Err(Self::not_found(location, ""));
        }
        folders.remove(path);

        Ok(json!({ "deleted": path }))
    }

    async fn create(
        &self,
        location: &AssetLocation,
        token: &str,
        data: &Value,
    ) -> Result<Value, UpstreamError> {
        let mut call = Call::new("create", location.path.clone(), Some(token));
        call.data = Some(data.clone());
        self.record(call).await?;

        let path = location.path.trim_matches('/');
        let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
        let mut folders = self.folders.write().await;

        let entity = if data["class"] == "assetFolder" {
            folders.entry(path.to_string()).or_default();
            folder_entity(parent, name)
        } else {
            let title = data["properties"]["title"].as_str().unwrap_or(name);
            fragment_entity(parent, name, title, "")
        };
        folders.entry(parent.to_string()).or_default().push(entity);

        Ok(json!({ "created": path }))
    }

    async fn update(
        &self,
        location: &AssetLocation,
        token: &str,
        data: &Value,
    ) -> Result<Value, UpstreamError> {
        let mut call = Call::new("update", location.path.clone(), Some(token));
        call.data = Some(data.clone());
        self.record(call).await?;

        Ok(json!({ "updated": location.path.trim_matches('/') }))
    }

    async fn rendition(&self, href: &str, token: &str) -> Result<Bytes, UpstreamError> {
        self.record(Call::new("rendition", href, Some(token))).await?;
        self.renditions_started.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.rendition_delay {
            tokio::time::sleep(delay).await;
        }

        self.renditions_finished.fetch_add(1, Ordering::SeqCst);
        self.renditions
            .get(href)
            .cloned()
            .ok_or_else(|| UpstreamError::Status {
                url: href.to_string(),
                status: 404,
            })
    }

    async fn translate(&self, text: &str) -> Result<Value, UpstreamError> {
        self.record(Call::new("translate", text, None)).await?;
        Ok(json!({ "translation": format!("[fr] {}", text) }))
    }
}
