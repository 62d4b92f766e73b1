//! Error classification for sync operations.
//!
//! Every failure a sync surfaces to observers is classified into one of two
//! kinds: the network was unreachable, or the data we got back could not be
//! processed. Lower-level errors (store I/O, catalog parsing) converge into
//! `DataProcessing` at the engine boundary.

use thiserror::Error;

/// Classified failure of a sync operation.
///
/// `Network` covers connectivity and transport-level failures; everything
/// else (malformed manifest, decode failure, unexpected HTTP status, store
/// I/O) is `DataProcessing`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// No connectivity, unreachable host, or transport-level failure.
    #[error("network failure: {0}")]
    Network(String),

    /// Malformed manifest, decode failure, or unexpected status code.
    #[error("data processing failure: {0}")]
    DataProcessing(String),
}

impl SyncError {
    /// Classify a message as a network failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Classify a message as a data processing failure.
    pub fn data_processing(message: impl Into<String>) -> Self {
        Self::DataProcessing(message.into())
    }

    /// Whether this is a transport-level failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<crate::store::StoreError> for SyncError {
    fn from(err: crate::store::StoreError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<crate::catalog::CatalogError> for SyncError {
    fn from(err: crate::catalog::CatalogError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}
