//! Shared asset store with atomic commits.
//!
//! The store is a plain directory reachable by every collaborating process:
//! configuration files at the top level, media images under `images/`. It is
//! the only durable owner of asset content, and it is never locked — the two
//! writer paths (foreground sync, background downloads) stay safe because
//! each logical asset routes to its own file and every commit goes through
//! create-temp-then-atomic-rename.
//!
//! Invariant: any file visible under a final name is complete. A reader
//! racing a commit observes either the previous complete content or the new
//! complete content, never a mixture.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use thiserror::Error;
use tracing::debug;

use crate::routing::Routing;

/// Counter distinguishing temp files created by this process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create a directory in the store.
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    /// Failed to write the temporary file for a commit.
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    /// Failed to rename the temporary file over the final path.
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Failed to read a file handed to the store.
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

/// The shared, cross-process-readable asset store.
#[derive(Debug)]
pub struct SharedStore {
    root: PathBuf,
    fallback_dir: Option<PathBuf>,
    routing: Routing,
}

impl SharedStore {
    /// Open a store at the given root with the default routing table.
    ///
    /// No I/O happens here; directories are created lazily on commit.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fallback_dir: None,
            routing: Routing::default(),
        }
    }

    /// Set the bundled fallback directory consulted by [`resolve`](Self::resolve).
    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(dir.into());
        self
    }

    /// Replace the routing table.
    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.routing = routing;
        self
    }

    /// The store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The routing table shared by both writer paths.
    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    /// Resolve an asset id to its store-relative path.
    pub fn route(&self, id: &str) -> Option<String> {
        self.routing.route(id)
    }

    /// Commit bytes under a store-relative path.
    ///
    /// The bytes are written to a temporary file in the destination
    /// directory, flushed, and renamed over the final path. The rename is
    /// what makes the commit atomic: it requires the temp file to live on
    /// the same filesystem as the destination.
    pub fn commit(&self, relative_path: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let final_path = self.root.join(relative_path);
        let parent = final_path.parent().unwrap_or(&self.root).to_path_buf();

        fs::create_dir_all(&parent).map_err(|e| StoreError::CreateDir {
            path: parent.clone(),
            source: e,
        })?;

        let temp_path = parent.join(temp_name(&final_path));
        if let Err(e) = write_all(&temp_path, bytes) {
            // Leave no half-written temp behind on failure.
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StoreError::Rename {
                from: temp_path.clone(),
                to: final_path.clone(),
                source: e,
            }
        })?;

        debug!(path = %final_path.display(), bytes = bytes.len(), "committed asset");
        Ok(())
    }

    /// Route an asset id and commit bytes to the resulting path.
    ///
    /// Returns the committed path, or `None` when the id is unrecognized —
    /// unroutable assets are dropped, not an error.
    pub fn commit_asset(&self, id: &str, bytes: &[u8]) -> Result<Option<PathBuf>, StoreError> {
        match self.routing.route(id) {
            Some(relative_path) => {
                self.commit(&relative_path, bytes)?;
                Ok(Some(self.root.join(relative_path)))
            }
            None => {
                debug!(id, "no route for asset id, dropping");
                Ok(None)
            }
        }
    }

    /// Resolve a store-relative name to a readable path.
    ///
    /// Prefers the committed store copy; falls back to the bundled defaults
    /// directory when the store has none. Never fails — the returned path
    /// may not exist when neither location has the file.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let stored = self.root.join(name);
        if stored.exists() {
            return stored;
        }
        match &self.fallback_dir {
            Some(dir) => dir.join(name),
            None => stored,
        }
    }

    /// Last-modified time of a committed file, if present.
    ///
    /// Used as the conditional-fetch validator; the fallback copy does not
    /// count because it never came from the remote.
    pub fn modified(&self, relative_path: &str) -> Option<SystemTime> {
        fs::metadata(self.root.join(relative_path))
            .and_then(|m| m.modified())
            .ok()
    }
}

/// Unique temp filename alongside the final path.
fn temp_name(final_path: &Path) -> String {
    let base = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());
    format!(
        ".{base}.{}.{}.tmp",
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

/// Write bytes to a fresh file and flush them to disk.
fn write_all(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let err = |e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    let mut file = fs::File::create(path).map_err(err)?;
    file.write_all(bytes).map_err(err)?;
    file.flush().map_err(err)?;
    // The rename must never promote data the kernel has not accepted.
    file.sync_all().map_err(err)?;
    Ok(())
}
