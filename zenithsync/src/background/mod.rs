//! Background download adapter.
//!
//! The host scheduler owns the download lifecycle on this path: it asks for
//! the set of downloads a manifest implies, fetches each asset on its own
//! schedule, and calls back per asset with a finished temp file or a
//! failure. This adapter only plans the set and routes finished files into
//! the shared store — through the same commit contract as the foreground
//! engine, with which it shares no lock and may run concurrently.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::fetch::{AssetFetcher, FetchOutcome};
use crate::manifest::Manifest;
use crate::store::{SharedStore, StoreError};

/// Why the host scheduler is asking for downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// First install of the application.
    Install,
    /// Application update.
    Update,
    /// Periodic background refresh.
    Periodic,
}

impl TriggerKind {
    /// Whether downloads for this trigger are essential to the host.
    ///
    /// Install and update content is essential; periodic refreshes are
    /// best-effort. Enforcement is host policy — the flag is passed through
    /// unmodified.
    pub fn is_essential(self) -> bool {
        matches!(self, Self::Install | Self::Update)
    }
}

/// One download handed to the host scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadRequest {
    pub id: String,
    pub url: String,
    pub essential: bool,
    pub estimated_size_bytes: u64,
}

/// Adapter between the host scheduler and the shared store.
pub struct BackgroundAdapter {
    fetcher: Arc<dyn AssetFetcher>,
    store: Arc<SharedStore>,
    last_error: Mutex<Option<SyncError>>,
}

impl BackgroundAdapter {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, store: Arc<SharedStore>) -> Self {
        Self {
            fetcher,
            store,
            last_error: Mutex::new(None),
        }
    }

    /// Plan the download set for a manifest URL.
    ///
    /// Fetches and resolves the manifest; every descriptor becomes one
    /// request. On fetch or parse failure this returns an empty set and
    /// records the error — it never throws into the host.
    pub async fn schedule_downloads(
        &self,
        manifest_url: &str,
        trigger: TriggerKind,
    ) -> HashSet<DownloadRequest> {
        let manifest = match self.fetch_manifest(manifest_url).await {
            Ok(manifest) => manifest,
            Err(error) => {
                warn!(%error, %manifest_url, "failed to process manifest, scheduling nothing");
                *self.last_error.lock() = Some(error);
                return HashSet::new();
            }
        };

        let essential = trigger.is_essential();
        let requests: HashSet<DownloadRequest> = manifest
            .assets
            .into_iter()
            .map(|asset| DownloadRequest {
                id: asset.id,
                url: asset.url,
                essential,
                estimated_size_bytes: asset.estimated_size_bytes,
            })
            .collect();

        info!(
            count = requests.len(),
            ?trigger,
            "scheduled background downloads"
        );
        requests
    }

    /// Route a finished download into the shared store.
    ///
    /// The temp file is consumed either way: committed under the id's
    /// routed path, or discarded when the id is unrecognized (which is not
    /// an error). Returns the committed path, if any.
    pub fn complete_download(
        &self,
        id: &str,
        temp_file: &Path,
    ) -> Result<Option<PathBuf>, StoreError> {
        let Some(relative_path) = self.store.route(id) else {
            debug!(id, "finished download has no route, discarding");
            let _ = fs::remove_file(temp_file);
            return Ok(None);
        };

        let bytes = fs::read(temp_file).map_err(|e| StoreError::Read {
            path: temp_file.to_path_buf(),
            source: e,
        })?;
        self.store.commit(&relative_path, &bytes)?;
        let _ = fs::remove_file(temp_file);

        info!(id, path = %relative_path, "background download committed");
        Ok(Some(self.store.root().join(relative_path)))
    }

    /// Record a failed download.
    ///
    /// Observability only — retry policy belongs to the host scheduler.
    pub fn fail_download(&self, id: &str, error: &SyncError) {
        warn!(id, %error, "background download failed");
        *self.last_error.lock() = Some(error.clone());
    }

    /// The most recently recorded error, if any.
    pub fn last_error(&self) -> Option<SyncError> {
        self.last_error.lock().clone()
    }

    async fn fetch_manifest(&self, manifest_url: &str) -> Result<Manifest, SyncError> {
        match self.fetcher.fetch(manifest_url, None).await? {
            FetchOutcome::Fetched(bytes) => Manifest::resolve(&bytes),
            // Nothing changed upstream: nothing to schedule.
            FetchOutcome::NotModified => Ok(Manifest::default()),
        }
    }
}
