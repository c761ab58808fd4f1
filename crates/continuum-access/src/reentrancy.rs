//! Single-entry call lock.
//!
//! [`ReentrancyLock::enter`] succeeds for at most one caller at a time; the
//! returned guard releases the lock when dropped, including on early return.

use std::sync::atomic::{AtomicBool, Ordering};

use continuum_types::{ContinuumError, Result};
use tracing::warn;

#[derive(Debug, Default)]
pub struct ReentrancyLock {
    entered: AtomicBool,
}

impl ReentrancyLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// `ReentrantCall` if a guard is already live.
    pub fn enter(&self) -> Result<ReentrancyGuard<'_>> {
        if self
            .entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            warn!("reentrant call rejected");
            return Err(ContinuumError::ReentrantCall);
        }
        Ok(ReentrancyGuard { lock: self })
    }

    #[must_use]
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

/// Holds a [`ReentrancyLock`] until dropped.
#[derive(Debug)]
pub struct ReentrancyGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.lock.entered.store(false, Ordering::Release);
    }
}
