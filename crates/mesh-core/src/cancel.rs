//! Cooperative cancellation for long-running operators (§5).
//!
//! The crate has no suspension points of its own; a caller embedding the
//! pipeline in a cooperative runtime can share one token across an
//! orchestrator run and flip it from another task to abort early. Every
//! iterative operator (remesh, self-intersection split, the orchestrator
//! itself) checks the token once per outer pass and returns the
//! partially-reduced mesh intact rather than unwinding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply-cloned, thread-shareable cancellation flag.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// A token that never reports cancelled; used by call sites that don't
    /// want to thread one through explicitly.
    pub fn never() -> Self {
        Self::new()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_latches() {
        let tok = CancellationToken::new();
        assert!(!tok.is_cancelled());
        let clone = tok.clone();
        clone.cancel();
        assert!(tok.is_cancelled());
    }
}
