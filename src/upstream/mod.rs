//! Upstream access layer.
//!
//! This module talks to the remote Assets API on behalf of the proxy actions
//! and the navigation core.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   ActionService        Navigator        │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            Upstream Trait               │
//! │  (one call per proxied operation)       │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │  HttpUpstream   │    │   test doubles      │
//! │   (reqwest)     │    │  (in-memory tree)   │
//! └─────────────────┘    └─────────────────────┘
//! ```
//!
//! Every asset request carries `configid=ims` and the caller's bearer token.

mod client;
mod model;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::error::UpstreamError;

pub use client::{HttpUpstream, DEFAULT_UPSTREAM_TIMEOUT_SECS};
pub use model::{
    Element, Elements, Entity, EntityLinks, EntityPage, EntityProperties, Link, PageProperties,
    Paging, Thumbnail, FOLDER_CLASS, THUMBNAIL_REL,
};

/// Query parameter appended to every asset request.
pub const CONFIG_ID_QUERY: (&str, &str) = ("configid", "ims");

/// Location of an asset on a remote instance.
///
/// `path` is relative to the API root; an empty path is the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
    pub instance: String,
    pub api: String,
    pub path: String,
}

impl AssetLocation {
    pub fn new(
        instance: impl Into<String>,
        api: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            instance: instance.into(),
            api: api.into(),
            path: path.into(),
        }
    }

    /// The same instance and API prefix, pointing at another path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            instance: self.instance.clone(),
            api: self.api.clone(),
            path: path.into(),
        }
    }

    /// Whether this location is the repository root.
    pub fn is_root(&self) -> bool {
        self.path.trim_matches('/').is_empty()
    }

    /// Instance joined with the API prefix, without a trailing slash.
    pub fn base(&self) -> String {
        let instance = self.instance.trim_end_matches('/');
        let api = self.api.trim_matches('/');
        if api.is_empty() {
            instance.to_string()
        } else {
            format!("{}/{}", instance, api)
        }
    }

    /// Full endpoint for this asset with `suffix` appended (e.g. `.json`).
    pub fn endpoint(&self, suffix: &str) -> String {
        let path = self.path.trim_matches('/');
        if path.is_empty() {
            format!("{}{}", self.base(), suffix)
        } else {
            format!("{}/{}{}", self.base(), path, suffix)
        }
    }
}

/// Paging window for a folder listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: Option<u64>,
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new(offset: Option<u64>, limit: Option<u32>) -> Self {
        Self { offset, limit }
    }

    /// First page of `limit` items.
    pub fn first(limit: u32) -> Self {
        Self {
            offset: None,
            limit: Some(limit),
        }
    }
}

/// Remote Assets API.
///
/// Implementations forward exactly one HTTP call per method. Bodies are
/// returned as raw JSON so the proxy can pass them through untouched.
#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    /// List the children of a folder.
    async fn list(
        &self,
        location: &AssetLocation,
        token: &str,
        page: PageRequest,
    ) -> Result<Value, UpstreamError>;

    /// Fetch a single entity (with its links).
    async fn entity(&self, location: &AssetLocation, token: &str) -> Result<Value, UpstreamError>;

    /// Delete an asset or folder.
    async fn delete(&self, location: &AssetLocation, token: &str) -> Result<Value, UpstreamError>;

    /// Create an asset, folder or content fragment.
    async fn create(
        &self,
        location: &AssetLocation,
        token: &str,
        data: &Value,
    ) -> Result<Value, UpstreamError>;

    /// Update the properties of an existing asset.
    async fn update(
        &self,
        location: &AssetLocation,
        token: &str,
        data: &Value,
    ) -> Result<Value, UpstreamError>;

    /// Download a rendition by its absolute link.
    async fn rendition(&self, href: &str, token: &str) -> Result<Bytes, UpstreamError>;

    /// Send text to the translation flow.
    async fn translate(&self, text: &str) -> Result<Value, UpstreamError>;
}

/// Fetch the thumbnail rendition of an asset.
///
/// Reads the entity, follows its `thumbnail` link and downloads the bytes.
/// Returns `Ok(None)` when the entity has no thumbnail link.
pub async fn fetch_thumbnail<U: Upstream + ?Sized>(
    upstream: &U,
    location: &AssetLocation,
    token: &str,
) -> Result<Option<Thumbnail>, UpstreamError> {
    let content = upstream.entity(location, token).await?;
    let entity: EntityLinks = serde_json::from_value(content).map_err(|e| UpstreamError::Decode {
        url: location.endpoint(".json"),
        message: e.to_string(),
    })?;

    match entity.thumbnail_link() {
        Some(link) => {
            let data = upstream.rendition(&link.href, token).await?;
            Ok(Some(Thumbnail::from_bytes(data)))
        }
        None => Ok(None),
    }
}
