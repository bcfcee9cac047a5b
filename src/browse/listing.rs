//! Incremental pagination over one folder.

use crate::upstream::{Entity, EntityPage, PageRequest};

use super::path::AssetPath;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 40;

/// Items loaded so far for a folder, plus the total the upstream reported.
///
/// The next page always starts at `items.len()`. Paging stops once every
/// item is loaded, when the total is unknown, or when a page comes back
/// empty.
#[derive(Debug, Clone)]
pub struct Listing {
    path: AssetPath,
    page_size: u32,
    items: Vec<Entity>,
    total: Option<u64>,
    exhausted: bool,
}

impl Listing {
    pub fn new(path: AssetPath, page_size: u32) -> Self {
        Self {
            path,
            page_size: page_size.max(1),
            items: Vec::new(),
            total: None,
            exhausted: false,
        }
    }

    pub fn path(&self) -> &AssetPath {
        &self.path
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn items(&self) -> &[Entity] {
        &self.items
    }

    /// Total reported by the upstream for the first page.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Request for the first page.
    pub fn first_page(&self) -> PageRequest {
        PageRequest::first(self.page_size)
    }

    /// Whether more items can be requested.
    pub fn has_more(&self) -> bool {
        !self.exhausted
            && self
                .total
                .is_some_and(|total| (self.items.len() as u64) < total)
    }

    /// Request for the page after the loaded items, if any.
    pub fn next_page(&self) -> Option<PageRequest> {
        if !self.has_more() {
            return None;
        }
        Some(PageRequest::new(
            Some(self.items.len() as u64),
            Some(self.page_size),
        ))
    }

    /// Replace the listing with a freshly loaded first page.
    pub fn apply_first(&mut self, page: EntityPage) {
        self.total = page.total();
        self.items = page.entities;
        self.exhausted = false;
    }

    /// Append a subsequent page. Returns the number of items added.
    pub fn apply_more(&mut self, page: EntityPage) -> usize {
        let added = page.entities.len();
        if added == 0 {
            self.exhausted = true;
        }
        self.items.extend(page.entities);
        added
    }
}
