//! Schedule command - plan the background download set for a manifest.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};

use zenithsync::config::DEFAULT_TIMEOUT_SECS;
use zenithsync::{BackgroundAdapter, HttpFetcher, SharedStore, TriggerKind};

use crate::error::CliError;

/// Arguments for the schedule command.
#[derive(Args)]
pub struct ScheduleArgs {
    /// Manifest URL to plan downloads from.
    pub manifest_url: String,

    /// Why the host is asking for downloads.
    #[arg(long, value_enum, default_value_t = Trigger::Periodic)]
    pub trigger: Trigger,
}

/// CLI-facing trigger kinds.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Trigger {
    Install,
    Update,
    Periodic,
}

impl From<Trigger> for TriggerKind {
    fn from(trigger: Trigger) -> Self {
        match trigger {
            Trigger::Install => TriggerKind::Install,
            Trigger::Update => TriggerKind::Update,
            Trigger::Periodic => TriggerKind::Periodic,
        }
    }
}

/// Run the schedule command.
pub async fn run(args: ScheduleArgs, store_root: PathBuf) -> Result<(), CliError> {
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?);
    let store = Arc::new(SharedStore::new(store_root));
    let adapter = BackgroundAdapter::new(fetcher, store);

    let requests = adapter
        .schedule_downloads(&args.manifest_url, args.trigger.into())
        .await;

    if requests.is_empty() {
        if let Some(error) = adapter.last_error() {
            return Err(CliError::Sync(error));
        }
        println!("Nothing to download.");
        return Ok(());
    }

    let mut rows: Vec<_> = requests.into_iter().collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    println!("{} downloads planned:", rows.len());
    for request in rows {
        println!(
            "  {:<40} essential={:<5} ~{:>6} KiB  {}",
            request.id,
            request.essential,
            request.estimated_size_bytes / 1024,
            request.url
        );
    }
    Ok(())
}
