//! ZenithSync CLI - command-line interface
//!
//! Exposes the library's two trigger paths (foreground sync, background
//! host callbacks) and the asset path resolver.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod error;

#[derive(Parser)]
#[command(
    name = "zenithsync",
    version,
    about = "Keeps the Zenith Fit workout catalog and hero images in sync"
)]
struct Cli {
    /// Root of the shared asset store.
    #[arg(long, global = true)]
    store_root: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a foreground sync and follow its phases.
    Sync(commands::sync::SyncArgs),
    /// Plan the background download set for a manifest URL.
    Schedule(commands::schedule::ScheduleArgs),
    /// Route a finished background download into the store.
    Complete(commands::complete::CompleteArgs),
    /// Print the resolved path for an asset name.
    Resolve(commands::resolve::ResolveArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    zenithsync::logging::init(&cli.log);

    let store_root = cli.store_root.unwrap_or_else(default_store_root);
    let result = match cli.command {
        Command::Sync(args) => commands::sync::run(args, store_root).await,
        Command::Schedule(args) => commands::schedule::run(args, store_root).await,
        Command::Complete(args) => commands::complete::run(args, store_root),
        Command::Resolve(args) => commands::resolve::run(args, store_root),
    };

    if let Err(error) = result {
        eprintln!("error: {}", error);
        std::process::exit(1);
    }
}

/// Default shared store location, visible to every collaborating process.
fn default_store_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("zenith-fit")
        .join("store")
}
