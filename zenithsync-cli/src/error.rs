//! Error types for the CLI.

use zenithsync::store::StoreError;
use zenithsync::SyncError;

/// Errors surfaced to the CLI user.
#[derive(Debug)]
pub enum CliError {
    /// Invalid configuration or arguments.
    Config(String),

    /// A sync operation failed.
    Sync(SyncError),

    /// A store operation failed.
    Store(StoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "invalid configuration: {}", msg),
            Self::Sync(err) => write!(f, "{}", err),
            Self::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(_) => None,
            Self::Sync(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
