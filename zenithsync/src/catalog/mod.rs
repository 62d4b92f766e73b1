//! Derived workout catalog.
//!
//! The data layer's view of the configuration files: hero → weekly plan
//! records from `workouts.json`, plus the definition and description
//! documents. The catalog determines the media wave's asset set (one image
//! per hero).
//!
//! Reload discipline: a new catalog is built completely, then installed by
//! replacing the shared `Arc` wholesale. Readers holding a snapshot keep a
//! consistent catalog; nobody ever observes a half-updated mapping.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::store::SharedStore;

/// Store-relative name of the workout plans document.
pub const WORKOUTS_FILE: &str = "workouts.json";

/// Store-relative name of the exercise definitions document.
pub const DEFINITIONS_FILE: &str = "definitions.json";

/// Store-relative name of the hero descriptions document.
pub const DESCRIPTIONS_FILE: &str = "descriptions.json";

/// Errors from catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A catalog file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// A catalog file exists but is not a parseable record.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One immutable snapshot of the derived catalog.
///
/// Plan and definition payloads stay schemaless records; their exact shape
/// is owned by the content authors, not this crate.
#[derive(Debug, Default)]
pub struct HeroCatalog {
    plans: BTreeMap<String, Vec<Value>>,
    definitions: Vec<Value>,
    descriptions: BTreeMap<String, String>,
}

impl HeroCatalog {
    /// Load a catalog from the store (committed copies first, bundled
    /// fallback otherwise).
    ///
    /// A file present in neither location loads as empty; a file that is
    /// present but unreadable or malformed is an error.
    pub fn load(store: &SharedStore) -> Result<Self, CatalogError> {
        Ok(Self {
            plans: load_or_default(&store.resolve(WORKOUTS_FILE))?,
            definitions: load_or_default(&store.resolve(DEFINITIONS_FILE))?,
            descriptions: load_or_default(&store.resolve(DESCRIPTIONS_FILE))?,
        })
    }

    /// Hero names with a workout plan, sorted.
    pub fn heroes(&self) -> Vec<String> {
        self.plans.keys().cloned().collect()
    }

    /// The weekly plan records for a hero; empty when the hero is unknown.
    pub fn plan(&self, hero: &str) -> &[Value] {
        self.plans.get(hero).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The exercise definition records.
    pub fn definitions(&self) -> &[Value] {
        &self.definitions
    }

    /// The description text for a name, if any.
    pub fn description(&self, name: &str) -> Option<&str> {
        self.descriptions.get(name).map(String::as_str)
    }
}

/// Hot-reloadable holder of the current catalog snapshot.
pub struct CatalogStore {
    current: RwLock<Arc<HeroCatalog>>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Create a store holding an empty catalog.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(HeroCatalog::default())),
        }
    }

    /// The current catalog snapshot.
    pub fn snapshot(&self) -> Arc<HeroCatalog> {
        Arc::clone(&self.current.read())
    }

    /// Rebuild the catalog from the shared store and install it.
    ///
    /// The new catalog is fully built before the swap; on error the previous
    /// snapshot stays installed.
    pub fn reload(&self, store: &SharedStore) -> Result<(), CatalogError> {
        let next = HeroCatalog::load(store)?;
        info!(heroes = next.heroes().len(), "catalog reloaded");
        *self.current.write() = Arc::new(next);
        Ok(())
    }
}

/// Read and parse a catalog file, defaulting when it does not exist.
fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, CatalogError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "catalog file missing, using empty default");
            return Ok(T::default());
        }
        Err(e) => {
            return Err(CatalogError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    serde_json::from_slice(&bytes).map_err(|e| CatalogError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
