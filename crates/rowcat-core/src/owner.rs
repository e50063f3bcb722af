#![forbid(unsafe_code)]

//! Owner-thread affinity guard.
//!
//! All registry mutation, cache resolution, and diffing is serialized by
//! construction onto one owner thread; no locking guards that state. The
//! guard captures the constructing thread's id and turns mutation from any
//! other thread into [`AdapterError::ConcurrencyViolation`] instead of a
//! silent data race. Cross-thread producers hand updates over through the
//! runtime crate's mailboxes rather than calling mutators directly.

use std::thread::{self, ThreadId};

use crate::error::{AdapterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerThread {
    id: ThreadId,
}

impl OwnerThread {
    /// Capture the calling thread as the owner.
    pub fn current() -> Self {
        Self {
            id: thread::current().id(),
        }
    }

    pub fn is_owner(&self) -> bool {
        thread::current().id() == self.id
    }

    /// Error unless called from the owner thread.
    pub fn ensure(&self) -> Result<()> {
        if self.is_owner() {
            Ok(())
        } else {
            Err(AdapterError::ConcurrencyViolation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_thread_passes_check() {
        let owner = OwnerThread::current();
        assert!(owner.is_owner());
        assert!(owner.ensure().is_ok());
    }

    #[test]
    fn foreign_thread_fails_check() {
        let owner = OwnerThread::current();
        let result = std::thread::spawn(move || owner.ensure()).join().unwrap();
        assert_eq!(result, Err(AdapterError::ConcurrencyViolation));
    }
}
