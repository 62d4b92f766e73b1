//! Two-wave sync orchestration.
//!
//! A sync runs two waves of bounded-parallel fetches: the configuration
//! wave (fixed asset set), then the media wave, whose asset set is not
//! known until the configuration has landed and the catalog has been
//! rederived from it. Each wave is fail-fast: the first classified failure
//! cancels the wave's remaining fetches and becomes the sync's terminal
//! result. Commits that already landed are retained — a later failure never
//! rolls the store back.

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::CatalogStore;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::fetch::{AssetFetcher, FetchOutcome, HttpFetcher};
use crate::manifest::AssetDescriptor;
use crate::routing::{media_asset_id, Routing, IMAGE_EXT};
use crate::store::SharedStore;
use crate::sync::state::{SyncPhase, SyncState};
use crate::sync::{Clock, SystemClock};

/// Result of one asset's trip through a wave.
#[derive(Debug)]
enum WaveOutcome {
    /// Fetched and committed to the store.
    Committed,
    /// Server reported the stored copy current; nothing committed.
    NotModified,
    /// A sibling failed first and this fetch was cancelled.
    Cancelled,
}

/// Per-wave commit/skip counters, for logging.
#[derive(Debug, Default)]
struct WaveStats {
    committed: usize,
    not_modified: usize,
    cancelled: usize,
}

impl WaveStats {
    fn record(&mut self, outcome: WaveOutcome) {
        match outcome {
            WaveOutcome::Committed => self.committed += 1,
            WaveOutcome::NotModified => self.not_modified += 1,
            WaveOutcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// The foreground sync engine.
///
/// Constructed with injected dependencies (fetcher, clock) and shared by
/// `Arc`; [`sync`](Self::sync) is fire-and-forget, observable through
/// [`current_phase`](Self::current_phase) and [`subscribe`](Self::subscribe).
pub struct SyncEngine {
    config: SyncConfig,
    fetcher: Arc<dyn AssetFetcher>,
    store: Arc<SharedStore>,
    catalog: Arc<CatalogStore>,
    state: SyncState,
    clock: Arc<dyn Clock>,
}

impl SyncEngine {
    /// Create an engine over the real HTTP fetcher and system clock.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let fetcher = Arc::new(HttpFetcher::new(config.timeout)?);
        Ok(Self::with_parts(config, fetcher, Arc::new(SystemClock)))
    }

    /// Create an engine with an injected fetcher and clock.
    pub fn with_parts(
        config: SyncConfig,
        fetcher: Arc<dyn AssetFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let routing = Routing::new(config.config_files.clone());
        let mut store = SharedStore::new(&config.store_root).with_routing(routing);
        if let Some(dir) = &config.fallback_dir {
            store = store.with_fallback_dir(dir);
        }
        Self {
            config,
            fetcher,
            store: Arc::new(store),
            catalog: Arc::new(CatalogStore::new()),
            state: SyncState::new(),
            clock,
        }
    }

    /// The shared store this engine commits into.
    pub fn store(&self) -> Arc<SharedStore> {
        Arc::clone(&self.store)
    }

    /// The derived catalog the data layer reads from.
    pub fn catalog(&self) -> Arc<CatalogStore> {
        Arc::clone(&self.catalog)
    }

    /// The current sync phase.
    pub fn current_phase(&self) -> SyncPhase {
        self.state.current()
    }

    /// Receiver notified on every phase change.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<SyncPhase> {
        self.state.subscribe()
    }

    /// Resolve an asset name to a readable path (store copy or bundled
    /// fallback). Never fails.
    pub fn resolve_asset_path(&self, name: &str) -> std::path::PathBuf {
        self.store.resolve(name)
    }

    /// Trigger a sync, fire-and-forget.
    ///
    /// A no-op while a sync is already in flight. Progress and the terminal
    /// result are observable through the phase.
    pub fn sync(self: &Arc<Self>) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.run_sync().await;
        });
    }

    /// Run one sync to its terminal phase.
    ///
    /// Returns the phase current when this call returns: the terminal phase
    /// of the sync it ran, or the in-flight phase of a sync that was already
    /// running (in which case nothing new was started).
    pub async fn run_sync(&self) -> SyncPhase {
        if !self.state.begin() {
            debug!("sync already in flight, ignoring trigger");
            return self.state.current();
        }

        match self.execute().await {
            Ok(completed_at) => {
                info!("sync completed");
                self.state.complete(completed_at);
            }
            Err(error) => {
                warn!(%error, "sync failed");
                self.state.fail(error);
            }
        }
        self.state.current()
    }

    /// Both waves plus the catalog rederivation between them.
    async fn execute(&self) -> Result<SystemTime, SyncError> {
        let config_wave = self.config_descriptors();
        info!(assets = config_wave.len(), "fetching configuration wave");
        self.run_wave(config_wave).await?;

        // Media identities are unknown until the fresh configuration has
        // been parsed.
        self.catalog.reload(&self.store)?;
        self.state.media();

        let media_wave = self.media_descriptors();
        info!(assets = media_wave.len(), "fetching media wave");
        self.run_wave(media_wave).await?;

        Ok(self.clock.now())
    }

    /// Wave-one descriptors: the fixed configuration set.
    fn config_descriptors(&self) -> Vec<AssetDescriptor> {
        let base = self.config.config_base_url.trim_end_matches('/');
        self.config
            .config_files
            .iter()
            .map(|entry| AssetDescriptor::new(&entry.id, format!("{base}/{}", entry.filename)))
            .collect()
    }

    /// Wave-two descriptors: one image per hero in the derived catalog.
    fn media_descriptors(&self) -> Vec<AssetDescriptor> {
        let base = self.config.media_base_url.trim_end_matches('/');
        let namespace = &self.config.asset_namespace;
        self.catalog
            .snapshot()
            .heroes()
            .iter()
            .map(|hero| {
                AssetDescriptor::new(
                    media_asset_id(namespace, hero),
                    format!("{base}/{hero}.{IMAGE_EXT}"),
                )
            })
            .collect()
    }

    /// Fetch and commit one wave of descriptors.
    ///
    /// One task per descriptor, bounded by the configured concurrency, all
    /// joined before returning. The first failure cancels the wave's
    /// remaining fetches and is the wave's result; commits that already
    /// landed stay committed.
    async fn run_wave(&self, descriptors: Vec<AssetDescriptor>) -> Result<(), SyncError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_fetches.max(1)));
        let cancel = CancellationToken::new();
        let mut tasks: JoinSet<Result<WaveOutcome, SyncError>> = JoinSet::new();

        for descriptor in descriptors {
            let Some(relative_path) = self.store.route(&descriptor.id) else {
                debug!(id = %descriptor.id, "no route for asset id, dropping");
                continue;
            };
            let fetcher = Arc::clone(&self.fetcher);
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return Ok(WaveOutcome::Cancelled),
                };
                if cancel.is_cancelled() {
                    return Ok(WaveOutcome::Cancelled);
                }

                let prior = store.modified(&relative_path);
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => return Ok(WaveOutcome::Cancelled),
                    result = fetcher.fetch(&descriptor.url, prior) => result?,
                };

                match outcome {
                    FetchOutcome::NotModified => Ok(WaveOutcome::NotModified),
                    FetchOutcome::Fetched(bytes) => {
                        store.commit(&relative_path, &bytes)?;
                        Ok(WaveOutcome::Committed)
                    }
                }
            });
        }

        let mut first_error: Option<SyncError> = None;
        let mut stats = WaveStats::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) => stats.record(outcome),
                Ok(Err(error)) => {
                    cancel.cancel();
                    first_error.get_or_insert(error);
                }
                Err(join_error) => {
                    cancel.cancel();
                    first_error.get_or_insert(SyncError::data_processing(format!(
                        "fetch task failed: {join_error}"
                    )));
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => {
                info!(
                    committed = stats.committed,
                    not_modified = stats.not_modified,
                    "wave complete"
                );
                debug_assert_eq!(stats.cancelled, 0);
                Ok(())
            }
        }
    }
}
