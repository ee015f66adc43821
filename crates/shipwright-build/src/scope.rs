//! Process-wide internal build marker
//!
//! The orchestrator holds an [`InternalBuildScope`] around the compile call.
//! The preprocess hook checks [`is_internal_build_in_progress`] and skips
//! its own versioning and symbol work while a scope is alive.
//!
//! Concurrent orchestrator runs in one process are unsupported; the counter
//! only tells whether *some* orchestrated build is compiling.

use std::sync::atomic::{AtomicUsize, Ordering};

static DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Guard that marks an orchestrated build until dropped
#[derive(Debug)]
#[must_use = "the scope ends when the guard is dropped"]
pub struct InternalBuildScope {
    _private: (),
}

impl InternalBuildScope {
    pub fn enter() -> Self {
        DEPTH.fetch_add(1, Ordering::SeqCst);
        Self { _private: () }
    }
}

impl Drop for InternalBuildScope {
    fn drop(&mut self) {
        let _ = DEPTH.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |depth| {
            Some(depth.saturating_sub(1))
        });
    }
}

/// Whether an orchestrated build is currently compiling
pub fn is_internal_build_in_progress() -> bool {
    DEPTH.load(Ordering::SeqCst) > 0
}
