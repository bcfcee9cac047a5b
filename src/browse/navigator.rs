//! Folder navigation state.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::BrowseError;
use crate::upstream::{AssetLocation, Entity, EntityPage, PageRequest, Upstream};

use super::drafts::{Draft, FolderDraft, FragmentDraft, FragmentEdit};
use super::listing::{Listing, DEFAULT_PAGE_SIZE};
use super::path::{AssetPath, Breadcrumb};
use super::thumbnails::ThumbnailLoader;

/// Delay before reloading after a change, giving the repository time to
/// index it.
pub const REFRESH_LATENCY_BUFFER: Duration = Duration::from_millis(300);

/// Walks the asset tree of one instance on behalf of one user.
///
/// Navigating to a new folder cancels all thumbnail fetches started for the
/// previous one before the new listing is requested.
pub struct Navigator<U: Upstream> {
    upstream: Arc<U>,
    root: AssetLocation,
    token: Arc<str>,
    listing: Listing,
    thumbnails: ThumbnailLoader<U>,
    /// Items whose thumbnail was queued since the last navigation.
    requested: HashSet<AssetPath>,
    page_size: u32,
    refresh_delay: Duration,
}

impl<U: Upstream> Navigator<U> {
    pub fn new(
        upstream: Arc<U>,
        instance: impl Into<String>,
        api: impl Into<String>,
        token: impl Into<Arc<str>>,
    ) -> Self {
        let thumbnails = ThumbnailLoader::new(Arc::clone(&upstream));
        Self {
            upstream,
            root: AssetLocation::new(instance, api, ""),
            token: token.into(),
            listing: Listing::new(AssetPath::root(), DEFAULT_PAGE_SIZE),
            thumbnails,
            requested: HashSet::new(),
            page_size: DEFAULT_PAGE_SIZE,
            refresh_delay: REFRESH_LATENCY_BUFFER,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self.listing = Listing::new(self.listing.path().clone(), self.page_size);
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn path(&self) -> &AssetPath {
        self.listing.path()
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.path().breadcrumbs()
    }

    pub fn thumbnails(&mut self) -> &mut ThumbnailLoader<U> {
        &mut self.thumbnails
    }

    /// Location of `path` on this navigator's instance.
    pub fn location(&self, path: &AssetPath) -> AssetLocation {
        self.root.with_path(path.as_str())
    }

    /// Show `path`: cancel pending thumbnails, then load its first page.
    pub async fn navigate(&mut self, path: AssetPath) -> Result<&Listing, BrowseError> {
        let cancelled = self.thumbnails.cancel_all();
        if cancelled > 0 {
            debug!(cancelled, path = %path, "Cancelled thumbnail fetches on navigation");
        }
        self.requested.clear();

        let mut listing = Listing::new(path, self.page_size);
        let page = self.fetch_page(listing.path(), listing.first_page()).await?;
        listing.apply_first(page);
        info!(
            path = %listing.path(),
            loaded = listing.items().len(),
            total = ?listing.total(),
            "Loaded folder"
        );

        self.listing = listing;
        Ok(&self.listing)
    }

    /// Load the next page of the current folder. Returns the number of new items.
    pub async fn load_more(&mut self) -> Result<usize, BrowseError> {
        let Some(request) = self.listing.next_page() else {
            return Ok(0);
        };
        let page = self.fetch_page(self.listing.path(), request).await?;
        let added = self.listing.apply_more(page);
        debug!(path = %self.listing.path(), added, "Loaded more items");
        Ok(added)
    }

    /// Keep loading pages until the folder is complete.
    pub async fn load_all(&mut self) -> Result<usize, BrowseError> {
        let mut added = 0;
        while self.listing.has_more() {
            added += self.load_more().await?;
        }
        Ok(added)
    }

    /// Enter a folder. Returns `false` for items that are not folders.
    pub async fn open(&mut self, entity: &Entity) -> Result<bool, BrowseError> {
        if entity.is_content_fragment() || !entity.is_folder() {
            return Ok(false);
        }

        let path = entity
            .self_link()
            .and_then(|link| AssetPath::from_entity_href(&link.href, &self.root))
            .unwrap_or_else(|| self.path().child(&entity.properties.name));

        self.navigate(path).await?;
        Ok(true)
    }

    /// Reload the current folder after the latency buffer.
    pub async fn refresh(&mut self) -> Result<&Listing, BrowseError> {
        tokio::time::sleep(self.refresh_delay).await;
        let path = self.path().clone();
        self.navigate(path).await
    }

    /// Queue a thumbnail fetch for every listed item not queued yet since the
    /// last navigation. Returns how many were queued.
    pub fn request_thumbnails(&mut self) -> usize {
        let pending: Vec<AssetPath> = self
            .listing
            .items()
            .iter()
            .map(|item| self.path().child(&item.properties.name))
            .filter(|path| !self.requested.contains(path))
            .collect();

        for path in &pending {
            let location = self.location(path);
            self.thumbnails.request(location, Arc::clone(&self.token));
            self.requested.insert(path.clone());
        }
        pending.len()
    }

    /// Create a folder in the current folder and reload.
    pub async fn create_folder(&mut self, title: &str) -> Result<Value, BrowseError> {
        let draft = FolderDraft::new(title).into_draft(self.path())?;
        self.submit_create(draft).await
    }

    /// Create an empty content fragment in the current folder and reload.
    pub async fn create_fragment(&mut self, model: &str, title: &str) -> Result<Value, BrowseError> {
        let draft = FragmentDraft::new(model, title).into_draft(self.path())?;
        self.submit_create(draft).await
    }

    /// Save edited fragment elements and reload.
    pub async fn save_fragment(
        &mut self,
        entity: &Entity,
        edit: FragmentEdit,
    ) -> Result<Value, BrowseError> {
        let draft = edit.into_draft(self.path(), &entity.properties.name)?;
        let location = self.location(&draft.path);
        let content = self
            .upstream
            .update(&location, &self.token, &draft.data)
            .await?;
        self.refresh().await?;
        Ok(content)
    }

    /// Delete an item of the current folder and reload.
    pub async fn delete(&mut self, entity: &Entity) -> Result<Value, BrowseError> {
        let path = self.path().child(&entity.properties.name);
        let location = self.location(&path);
        let content = self.upstream.delete(&location, &self.token).await?;
        self.refresh().await?;
        Ok(content)
    }

    async fn submit_create(&mut self, draft: Draft) -> Result<Value, BrowseError> {
        let location = self.location(&draft.path);
        let content = self
            .upstream
            .create(&location, &self.token, &draft.data)
            .await?;
        self.refresh().await?;
        Ok(content)
    }

    async fn fetch_page(
        &self,
        path: &AssetPath,
        request: PageRequest,
    ) -> Result<EntityPage, BrowseError> {
        let location = self.location(path);
        let content = self.upstream.list(&location, &self.token, request).await?;
        serde_json::from_value(content).map_err(|e| BrowseError::MalformedListing {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}
