use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Keeps the awaiting-reply indicator on until dropped, so it is released
/// on every exit path including cancellation and panics.
///
/// Counts rather than flags: a second exchange in flight keeps the
/// indicator on after the first one resolves.
pub(super) struct ReplyGuard {
    in_flight: Arc<AtomicUsize>,
}

impl ReplyGuard {
    pub(super) fn enter(in_flight: &Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::AcqRel);
        Self {
            in_flight: Arc::clone(in_flight),
        }
    }
}

impl Drop for ReplyGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
