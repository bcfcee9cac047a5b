//! Navigation core of the asset console.
//!
//! This is the state the browser console keeps while a user walks the asset
//! tree, expressed as a library so it can be driven from the terminal and
//! tested without a browser.
//!
//! # Components
//!
//! - [`AssetPath`]: paths, breadcrumbs and links derived from them
//! - [`Listing`]: incremental pagination over one folder
//! - [`ThumbnailLoader`]: background thumbnail fetches, cancelled on navigation
//! - [`Navigator`]: ties the above together for one instance and one user
//! - [`FolderDraft`], [`FragmentDraft`], [`FragmentEdit`]: create/update payloads
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use asset_console::browse::{AssetPath, Navigator};
//!
//! let mut navigator = Navigator::new(Arc::new(upstream), instance, "api/assets", token);
//! navigator.navigate(AssetPath::new("wknd/en")).await?;
//! navigator.request_thumbnails();
//!
//! // Leaving the folder aborts the fetches still running.
//! navigator.navigate(AssetPath::root()).await?;
//! ```

mod drafts;
mod listing;
mod navigator;
mod path;
mod thumbnails;

pub use drafts::{Draft, FolderDraft, FragmentDraft, FragmentEdit, DEFAULT_FRAGMENT_MODEL};
pub use listing::{Listing, DEFAULT_PAGE_SIZE};
pub use navigator::{Navigator, REFRESH_LATENCY_BUFFER};
pub use path::{slugify_name, AssetPath, Breadcrumb, ROOT_LABEL};
pub use thumbnails::{ThumbnailLoader, ThumbnailResult};
