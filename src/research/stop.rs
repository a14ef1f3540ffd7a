//! Cooperative stop signal shared between a run and its caller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

/// Cloneable handle to the cancellation flag of a [`ResearchManager`](super::ResearchManager).
///
/// Each run installs a fresh [`CancellationToken`] via [`StopHandle::reset`];
/// [`StopHandle::request_stop`] cancels whichever token is current. Clones
/// share the same slot, so a handle obtained before a run still stops it.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    current: Arc<Mutex<CancellationToken>>,
}

impl StopHandle {
    /// Creates a handle with an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the current run stop at its next checkpoint.
    ///
    /// Safe to call from any task or thread, any number of times.
    pub fn request_stop(&self) {
        let token = self.lock();
        if !token.is_cancelled() {
            tracing::info!("stop requested");
        }
        token.cancel();
    }

    /// Returns `true` once a stop has been requested for the current run.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.lock().is_cancelled()
    }

    /// Clears the flag for a new run and returns its token.
    pub(crate) fn reset(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.lock() = token.clone();
        token
    }

    fn lock(&self) -> MutexGuard<'_, CancellationToken> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
