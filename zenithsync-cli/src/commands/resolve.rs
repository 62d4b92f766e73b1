//! Resolve command - print the readable path for an asset name.

use std::path::PathBuf;

use clap::Args;

use zenithsync::SharedStore;

use crate::error::CliError;

/// Arguments for the resolve command.
#[derive(Args)]
pub struct ResolveArgs {
    /// Asset name, e.g. `workouts.json` or `images/Atlas.jpg`.
    pub name: String,

    /// Bundled defaults directory consulted when the store has no copy.
    #[arg(long)]
    pub fallback_dir: Option<PathBuf>,
}

/// Run the resolve command.
pub fn run(args: ResolveArgs, store_root: PathBuf) -> Result<(), CliError> {
    let mut store = SharedStore::new(store_root);
    if let Some(dir) = args.fallback_dir {
        store = store.with_fallback_dir(dir);
    }
    println!("{}", store.resolve(&args.name).display());
    Ok(())
}
