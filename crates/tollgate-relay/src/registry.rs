use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

/// Live requests keyed by caller-supplied request id
///
/// Registering the same id twice replaces (and cancels) the earlier
/// entry, so a retried request id cannot leak a running relay.
#[derive(Debug, Default, Clone)]
pub struct InFlightRegistry {
    inner: Arc<DashMap<String, CancellationToken>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request and get the token its relay should watch
    pub fn register(&self, id_request: &str) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.inner.insert(id_request.to_owned(), token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Cancel a live request and drop its entry
    ///
    /// False when the id is unknown or already finished; the caller
    /// treats that as an expected race, not an error.
    pub fn cancel(&self, id_request: &str) -> bool {
        match self.inner.remove(id_request) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Remove a finished request; the token stays valid for any clones
    pub fn deregister(&self, id_request: &str) {
        self.inner.remove(id_request);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Exactly-once gate for post-stream cleanup
///
/// Both the normal completion path and the client-disconnect path race
/// to finalize a request; whichever acquires the latch first does the
/// work and the other becomes a no-op.
#[derive(Debug, Default, Clone)]
pub struct CleanupLatch {
    done: Arc<AtomicBool>,
}

impl CleanupLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once across all clones
    pub fn acquire(&self) -> bool {
        !self.done.swap(true, Ordering::AcqRel)
    }
}
