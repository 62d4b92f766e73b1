//! Complete command - route a finished background download into the store.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use zenithsync::config::DEFAULT_TIMEOUT_SECS;
use zenithsync::{BackgroundAdapter, HttpFetcher, SharedStore};

use crate::error::CliError;

/// Arguments for the complete command.
#[derive(Args)]
pub struct CompleteArgs {
    /// Asset id the host finished downloading.
    pub id: String,

    /// Temp file holding the downloaded bytes.
    pub file: PathBuf,
}

/// Run the complete command.
pub fn run(args: CompleteArgs, store_root: PathBuf) -> Result<(), CliError> {
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?);
    let adapter = BackgroundAdapter::new(fetcher, Arc::new(SharedStore::new(store_root)));

    match adapter.complete_download(&args.id, &args.file)? {
        Some(path) => println!("Committed to {}", path.display()),
        None => println!("Unrecognized asset id `{}`; download discarded.", args.id),
    }
    Ok(())
}
