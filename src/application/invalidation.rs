//! Data-changed signal.
//!
//! Every successful mutation bumps a generation counter. Readers remember the
//! generation they last fetched at and compare it later to decide whether to
//! re-fetch.

use tokio::sync::watch;

/// Monotonically increasing counter of completed mutations.
pub type Generation = u64;

/// Shared "data changed, refetch" counter. Clones observe the same generation.
#[derive(Debug, Clone)]
pub struct InvalidationSignal {
    sender: watch::Sender<Generation>,
}

impl Default for InvalidationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationSignal {
    /// Creates a signal at generation 0.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self { sender }
    }

    /// Records a change and returns the new generation.
    pub fn notify(&self) -> Generation {
        let mut next = 0;
        self.sender.send_modify(|generation| {
            *generation += 1;
            next = *generation;
        });
        tracing::debug!(generation = next, "Invalidation signal fired");
        next
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> Generation {
        *self.sender.borrow()
    }

    /// Returns true when a change happened after `seen`.
    #[must_use]
    pub fn is_newer_than(&self, seen: Generation) -> bool {
        self.generation() > seen
    }
}
