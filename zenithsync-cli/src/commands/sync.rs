//! Sync command - run a foreground sync to a terminal phase.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use zenithsync::{SyncConfig, SyncEngine, SyncPhase};

use crate::error::CliError;

/// Arguments for the sync command.
#[derive(Args)]
pub struct SyncArgs {
    /// Base URL for the configuration documents.
    #[arg(long)]
    pub config_base_url: Option<String>,

    /// Base URL for the hero images.
    #[arg(long)]
    pub media_base_url: Option<String>,

    /// Maximum parallel fetches per wave.
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Bundled defaults directory used when the store has no copy yet.
    #[arg(long)]
    pub fallback_dir: Option<PathBuf>,
}

/// Run the sync command.
pub async fn run(args: SyncArgs, store_root: PathBuf) -> Result<(), CliError> {
    let mut config = SyncConfig::new(store_root);
    if let Some(url) = args.config_base_url {
        config = config.with_config_base_url(url);
    }
    if let Some(url) = args.media_base_url {
        config = config.with_media_base_url(url);
    }
    if let Some(parallel) = args.parallel {
        config = config.with_max_parallel_fetches(parallel);
    }
    if let Some(dir) = args.fallback_dir {
        config = config.with_fallback_dir(dir);
    }

    println!("ZenithSync v{}", zenithsync::VERSION);
    println!("Store: {}", config.store_root.display());
    println!();

    let engine = Arc::new(SyncEngine::new(config)?);
    let mut phases = engine.subscribe();
    engine.sync();

    loop {
        phases
            .changed()
            .await
            .map_err(|_| CliError::Config("sync engine went away".to_string()))?;
        let phase = phases.borrow_and_update().clone();
        match phase {
            SyncPhase::Idle => {}
            SyncPhase::FetchingConfig => println!("Fetching configuration..."),
            SyncPhase::FetchingMedia => {
                let heroes = engine.catalog().snapshot().heroes();
                println!("Fetching images for {} heroes...", heroes.len());
            }
            SyncPhase::Completed(_) => {
                println!("Sync complete.");
                return Ok(());
            }
            SyncPhase::Failed(error) => return Err(CliError::Sync(error)),
        }
    }
}
