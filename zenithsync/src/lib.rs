//! ZenithSync - asset synchronization for the Zenith Fit catalog
//!
//! This library keeps a workout catalog and its hero images fresh: a
//! manifest-driven pipeline fetches remote configuration and media assets,
//! commits them atomically into a shared cross-process store, and hot-reloads
//! the derived catalog the rest of the application renders from.
//!
//! Two trigger paths write the same store without a shared lock:
//!
//! - the foreground [`sync::SyncEngine`], a two-wave fetch (configuration,
//!   then the media set derived from it) observable through [`sync::SyncPhase`];
//! - the host-scheduled [`background::BackgroundAdapter`], which plans
//!   download sets from a manifest and routes finished files into the store.
//!
//! Safety rests on disjoint paths per asset id ([`routing`]) and the
//! temp-write-then-atomic-rename commit ([`store::SharedStore`]).

pub mod background;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod routing;
pub mod store;
pub mod sync;

pub use background::{BackgroundAdapter, DownloadRequest, TriggerKind};
pub use catalog::{CatalogStore, HeroCatalog};
pub use config::SyncConfig;
pub use error::SyncError;
pub use fetch::{AssetFetcher, FetchOutcome, HttpFetcher};
pub use manifest::{AssetDescriptor, Manifest};
pub use store::SharedStore;
pub use sync::{SyncEngine, SyncPhase};

/// Crate version, surfaced by the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
