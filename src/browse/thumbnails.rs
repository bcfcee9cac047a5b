//! Background thumbnail fetching with cancellation.
//!
//! Each request runs as its own task. Navigating away cancels every fetch
//! that has not finished yet; cancelled fetches never produce a result.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::UpstreamError;
use crate::upstream::{fetch_thumbnail, AssetLocation, Thumbnail, Upstream};

use super::path::AssetPath;

/// Outcome of one thumbnail fetch.
#[derive(Debug)]
pub struct ThumbnailResult {
    pub path: AssetPath,
    pub outcome: Result<Option<Thumbnail>, UpstreamError>,
}

/// Spawns and tracks in-flight thumbnail fetches.
pub struct ThumbnailLoader<U: Upstream> {
    upstream: Arc<U>,
    tasks: JoinSet<ThumbnailResult>,
}

impl<U: Upstream> ThumbnailLoader<U> {
    pub fn new(upstream: Arc<U>) -> Self {
        Self {
            upstream,
            tasks: JoinSet::new(),
        }
    }

    /// Start fetching the thumbnail of the asset at `location`.
    pub fn request(&mut self, location: AssetLocation, token: Arc<str>) {
        let upstream = Arc::clone(&self.upstream);
        self.tasks.spawn(async move {
            let outcome = fetch_thumbnail(upstream.as_ref(), &location, &token).await;
            ThumbnailResult {
                path: AssetPath::new(&location.path),
                outcome,
            }
        });
    }

    /// Number of fetches that have not been collected yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every pending fetch. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let pending = self.tasks.len();
        if pending > 0 {
            debug!(pending, "Cancelling thumbnail fetches");
            self.tasks.abort_all();
            self.tasks = JoinSet::new();
        }
        pending
    }

    /// Wait for the next finished fetch.
    ///
    /// Returns `None` once nothing is in flight.
    pub async fn next_ready(&mut self) -> Option<ThumbnailResult> {
        loop {
            match self.tasks.join_next().await? {
                Ok(result) => return Some(result),
                Err(err) if err.is_cancelled() => continue,
                Err(err) => {
                    warn!(error = %err, "Thumbnail task failed");
                    continue;
                }
            }
        }
    }
}
