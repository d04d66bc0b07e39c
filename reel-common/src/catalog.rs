//! Catalog store: load precedence, CRUD and publish
//!
//! # Load precedence
//!
//! Three sources disagree about what the catalog is. `load()` asks them in
//! strict order and the first one that returns a non-empty list wins
//! outright (no field-level merge):
//!
//! 1. Remote shared document (cache-busted fetch)
//! 2. Bundled fallback document
//! 3. Local cache (`customVideos`), used unchanged, possibly empty
//!
//! A source that errors, times out or returns `[]` is non-authoritative and
//! control falls through. Each read is awaited before the next is issued,
//! so a late remote answer can never overwrite a fallback that already won.
//! When source 1 or 2 wins, its list is written over the local cache.
//!
//! # Mutations
//!
//! Every mutation is applied in memory, snapshotted to the local cache and
//! then announced as `CatalogChanged`. None of them await mid-way.

use crate::events::{CatalogEvent, EventBus};
use crate::models::{self, VideoInput, VideoRecord};
use crate::publish::{ExportArtifact, PublishOutcome};
use crate::sources::{BundledFallback, RemoteCredentials, RemoteStore};
use crate::storage::{KeyValueStore, CATALOG_BACKUP_KEY, CATALOG_KEY};
use crate::{time, Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Which source settled the catalog on the last load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Fallback,
    Cache,
}

impl std::fmt::Display for LoadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadSource::Remote => write!(f, "remote document"),
            LoadSource::Fallback => write!(f, "bundled fallback"),
            LoadSource::Cache => write!(f, "local cache"),
        }
    }
}

/// Owner of the in-memory video catalog
pub struct CatalogStore {
    /// Storage order: oldest first
    videos: Vec<VideoRecord>,
    cache: Arc<dyn KeyValueStore>,
    remote: Arc<dyn RemoteStore>,
    fallback: Arc<dyn BundledFallback>,
    events: EventBus,
    io_timeout: Duration,
    load_source: Option<LoadSource>,
}

impl CatalogStore {
    /// Create an empty catalog wired to its collaborators
    pub fn new(
        cache: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteStore>,
        fallback: Arc<dyn BundledFallback>,
        events: EventBus,
    ) -> Self {
        Self {
            videos: Vec::new(),
            cache,
            remote,
            fallback,
            events,
            io_timeout: time::millis_to_duration(crate::config::DEFAULT_READ_TIMEOUT_MS),
            load_source: None,
        }
    }

    /// Bound every remote/fallback call by `timeout`
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    // ========================================
    // Load
    // ========================================

    /// Settle the catalog from the highest-precedence authoritative source
    pub async fn load(&mut self) -> &[VideoRecord] {
        let remote = Arc::clone(&self.remote);
        let fallback = Arc::clone(&self.fallback);

        let (videos, source) = if let Some(videos) =
            self.read_source(LoadSource::Remote, remote.fetch()).await
        {
            (videos, LoadSource::Remote)
        } else if let Some(videos) = self
            .read_source(LoadSource::Fallback, fallback.fetch())
            .await
        {
            (videos, LoadSource::Fallback)
        } else {
            (self.read_cache(), LoadSource::Cache)
        };

        info!(source = %source, count = videos.len(), "Catalog loaded");

        self.videos = videos;
        self.load_source = Some(source);
        if source != LoadSource::Cache {
            self.persist();
        }
        self.notify_changed();

        &self.videos
    }

    /// Await one source; `Some` only for a non-empty list
    async fn read_source<F>(&self, source: LoadSource, fetch: F) -> Option<Vec<VideoRecord>>
    where
        F: Future<Output = Result<Vec<VideoRecord>>>,
    {
        match tokio::time::timeout(self.io_timeout, fetch).await {
            Ok(Ok(videos)) if !videos.is_empty() => Some(videos),
            Ok(Ok(_)) => {
                debug!(source = %source, "Source returned an empty list, falling through");
                None
            }
            Ok(Err(e)) => {
                debug!(source = %source, error = %e, "Source unavailable, falling through");
                None
            }
            Err(_) => {
                debug!(
                    source = %source,
                    timeout_ms = self.io_timeout.as_millis(),
                    "Source timed out, falling through"
                );
                None
            }
        }
    }

    /// Previously cached list; unreadable cache counts as empty
    ///
    /// A value that is not a video list is copied to the backup key first,
    /// since the next mutation overwrites the cache.
    fn read_cache(&self) -> Vec<VideoRecord> {
        let raw = match self.cache.get(CATALOG_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Local cache unreadable, starting with an empty catalog");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(videos) => videos,
            Err(e) => {
                warn!(error = %e, "Local cache is not a video list, starting with an empty catalog");
                if let Err(e) = self.cache.set(CATALOG_BACKUP_KEY, &raw) {
                    warn!(error = %e, "Failed to back up unreadable local cache");
                }
                Vec::new()
            }
        }
    }

    // ========================================
    // Queries
    // ========================================

    /// Videos in storage order (oldest first)
    pub fn records(&self) -> &[VideoRecord] {
        &self.videos
    }

    /// Videos in render order (newest first)
    pub fn render_order(&self) -> Vec<&VideoRecord> {
        self.videos.iter().rev().collect()
    }

    pub fn get(&self, id: &str) -> Option<&VideoRecord> {
        self.videos.iter().find(|v| v.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Source that won the last `load()`, `None` before the first load
    pub fn load_source(&self) -> Option<LoadSource> {
        self.load_source
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ========================================
    // CRUD
    // ========================================

    /// Append a new video
    ///
    /// Fails `Validation` on a blank ID and `Duplicate` when the ID is
    /// already present. Omitted fields take their placeholders.
    pub fn add(&mut self, input: &VideoInput) -> Result<VideoRecord> {
        let id = input.trimmed_id();
        if id.is_empty() {
            return Err(Error::Validation(
                "Please enter a YouTube video ID".to_string(),
            ));
        }
        if self.contains(&id) {
            return Err(Error::Duplicate(id));
        }

        let record = VideoRecord::from_input(input, time::now_millis());
        debug!(id = %record.id, "Adding video");

        self.videos.push(record.clone());
        self.persist();
        self.notify_changed();

        Ok(record)
    }

    /// Overwrite the video `id` with `input`, keeping its timestamp
    ///
    /// The form may carry a different ID, in which case the record is
    /// re-keyed in place. No collision check is made against other records;
    /// only `add` enforces uniqueness. A blank form ID keeps the old one.
    pub fn update(&mut self, id: &str, input: &VideoInput) -> Result<VideoRecord> {
        let index = self
            .videos
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let timestamp = self.videos[index].timestamp;
        let mut updated = VideoRecord::from_input(input, timestamp);
        if updated.id.is_empty() {
            updated.id = id.to_string();
        }

        if updated.id != id {
            debug!(old_id = %id, new_id = %updated.id, "Updating video with new ID");
        } else {
            debug!(id = %id, "Updating video");
        }

        self.videos[index] = updated.clone();
        self.persist();
        self.notify_changed();

        Ok(updated)
    }

    /// Remove the video `id`
    ///
    /// An absent ID is a successful no-op: the admin list can fire twice.
    /// The catalog knows nothing of the edit session; resetting a session
    /// that was editing `id` is done by [`AdminPanel::remove`].
    ///
    /// [`AdminPanel::remove`]: crate::admin::AdminPanel::remove
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let before = self.videos.len();
        self.videos.retain(|v| v.id != id);

        if self.videos.len() == before {
            debug!(id = %id, "Remove of unknown video ignored");
            return Ok(());
        }

        debug!(id = %id, "Removed video");
        self.persist();
        self.notify_changed();
        Ok(())
    }

    /// Copy of the catalog for transmission or download; never mutates
    pub fn export_snapshot(&self) -> Vec<VideoRecord> {
        self.videos.clone()
    }

    /// Downloadable `videos.json`
    ///
    /// Fails `Persistence` when there is nothing to export.
    pub fn export_artifact(&self) -> Result<ExportArtifact> {
        if self.videos.is_empty() {
            return Err(Error::Persistence("No videos to export".to_string()));
        }
        ExportArtifact::from_videos(&self.videos)
    }

    // ========================================
    // Publish
    // ========================================

    /// Push the catalog to the remote document, or degrade to a download
    ///
    /// With stored credentials, attempts an authenticated write. Missing
    /// credentials or any write failure yields
    /// `DownloadedForManualUpload`, which is not an error.
    pub async fn publish(&self) -> Result<PublishOutcome> {
        let artifact = self.export_artifact()?;

        let credentials = match RemoteCredentials::load(self.cache.as_ref()) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "Could not read remote credentials");
                None
            }
        };

        let Some(credentials) = credentials else {
            info!("No remote credentials stored, export must be uploaded manually");
            return Ok(PublishOutcome::DownloadedForManualUpload(artifact));
        };

        match tokio::time::timeout(
            self.io_timeout,
            self.remote.write(&credentials, &artifact.contents),
        )
        .await
        {
            Ok(Ok(())) => {
                info!(count = self.videos.len(), "Catalog synced to remote document");
                Ok(PublishOutcome::SyncedRemotely)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Remote write failed, falling back to manual upload");
                Ok(PublishOutcome::DownloadedForManualUpload(artifact))
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.io_timeout.as_millis(),
                    "Remote write timed out, falling back to manual upload"
                );
                Ok(PublishOutcome::DownloadedForManualUpload(artifact))
            }
        }
    }

    /// Store credentials used by later publishes
    pub fn save_credentials(&self, credentials: &RemoteCredentials) -> Result<()> {
        credentials.save(self.cache.as_ref())
    }

    // ========================================
    // Signals
    // ========================================

    /// Ask the video modal to play `id`
    pub fn open_video(&self, id: &str) -> Result<String> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::Validation("No video ID to open".to_string()));
        }

        let embed_url = models::embed_url(id);
        self.events.emit_lossy(CatalogEvent::OpenVideo {
            id: id.to_string(),
            embed_url: embed_url.clone(),
            timestamp: time::now(),
        });
        Ok(embed_url)
    }

    /// Snapshot the catalog into the local cache
    ///
    /// A failed write is logged; the in-memory catalog stays authoritative.
    fn persist(&self) {
        let result = serde_json::to_string(&self.videos)
            .map_err(Error::from)
            .and_then(|json| self.cache.set(CATALOG_KEY, &json));

        if let Err(e) = result {
            warn!(error = %e, "Failed to write catalog to local cache");
        }
    }

    fn notify_changed(&self) {
        self.events.emit_lossy(CatalogEvent::CatalogChanged {
            videos: self.render_order().into_iter().cloned().collect(),
            timestamp: time::now(),
        });
    }
}
