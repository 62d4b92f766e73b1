//! Sync phase state machine.
//!
//! The phase lives in a `watch` channel: observers get a synchronous
//! [`current`](SyncState::current) getter plus a [`subscribe`](SyncState::subscribe)
//! receiver for change notifications, and the engine publishes transitions
//! through guarded mutators. `send_if_modified` serializes transitions, which
//! is what makes [`begin`](SyncState::begin) a race-free single-flight guard.

use std::time::SystemTime;

use tokio::sync::watch;

use crate::error::SyncError;

/// Phase of one sync invocation.
///
/// Legal transitions: `Idle → FetchingConfig → FetchingMedia → Completed(t)`;
/// either fetching phase may move to `Failed(kind)`. `Completed` and `Failed`
/// are re-triggerable: a new sync moves back through `FetchingConfig`.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncPhase {
    /// No sync has run yet.
    Idle,
    /// The configuration wave is in flight.
    FetchingConfig,
    /// The media wave is in flight.
    FetchingMedia,
    /// Both waves landed; the timestamp is the completion instant.
    Completed(SystemTime),
    /// A wave aborted with the classified failure.
    Failed(SyncError),
}

impl SyncPhase {
    /// Whether a wave is currently in flight.
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::FetchingConfig | Self::FetchingMedia)
    }

    /// Whether the phase is a terminal result.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}

/// Observable holder of the current [`SyncPhase`].
#[derive(Debug)]
pub struct SyncState {
    tx: watch::Sender<SyncPhase>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    /// Create a state machine in `Idle`.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SyncPhase::Idle);
        Self { tx }
    }

    /// The current phase.
    pub fn current(&self) -> SyncPhase {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every phase change.
    pub fn subscribe(&self) -> watch::Receiver<SyncPhase> {
        self.tx.subscribe()
    }

    /// Try to start a new sync: the single-flight guard.
    ///
    /// Moves `Idle`/`Completed`/`Failed` to `FetchingConfig` and returns
    /// `true`; returns `false` without any change while a sync is already
    /// in flight.
    pub(crate) fn begin(&self) -> bool {
        self.tx.send_if_modified(|phase| {
            if phase.is_fetching() {
                false
            } else {
                *phase = SyncPhase::FetchingConfig;
                true
            }
        })
    }

    /// Advance from the configuration wave to the media wave.
    pub(crate) fn media(&self) {
        self.tx.send_if_modified(|phase| {
            debug_assert_eq!(*phase, SyncPhase::FetchingConfig);
            *phase = SyncPhase::FetchingMedia;
            true
        });
    }

    /// Terminal success.
    pub(crate) fn complete(&self, at: SystemTime) {
        self.tx.send_if_modified(|phase| {
            debug_assert!(phase.is_fetching());
            *phase = SyncPhase::Completed(at);
            true
        });
    }

    /// Terminal failure.
    pub(crate) fn fail(&self, error: SyncError) {
        self.tx.send_if_modified(|phase| {
            debug_assert!(phase.is_fetching());
            *phase = SyncPhase::Failed(error);
            true
        });
    }
}
