#![forbid(unsafe_code)]

//! Latest-wins handoff from background section producers.
//!
//! A producer thread computes section snapshots and publishes them into a
//! [`SectionMailbox`]; the owner thread pumps a [`FeedSet`] at its own
//! cadence, applying whatever is newest. Intermediate snapshots published
//! between pumps are overwritten, never queued: the adapter only ever
//! diffs against the latest state, so showing a superseded snapshot first
//! would be wasted work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rowcat_core::{
    ItemModel, ListOp, Result, SectionKey, SectionedListAdapter, SharedSeekable,
};

struct Slot<M> {
    pending: Mutex<Option<SharedSeekable<M>>>,
    disposed: AtomicBool,
}

impl<M> Slot<M> {
    fn lock(&self) -> MutexGuard<'_, Option<SharedSeekable<M>>> {
        // A poisoned slot only means a producer panicked mid-publish; the
        // stored Option is still coherent.
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cross-thread, latest-wins slot for one section's items.
///
/// Cloning shares the slot; producers keep a clone, the owning
/// [`FeedSet`] keeps the other end.
pub struct SectionMailbox<M> {
    slot: Arc<Slot<M>>,
}

impl<M> Clone for SectionMailbox<M> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<M> SectionMailbox<M> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Slot {
                pending: Mutex::new(None),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Publishes a snapshot, replacing any unconsumed one. Returns `false`
    /// once disposed; late publishes from a lingering producer are dropped.
    pub fn publish(&self, items: SharedSeekable<M>) -> bool {
        if self.slot.disposed.load(Ordering::Acquire) {
            return false;
        }
        *self.slot.lock() = Some(items);
        true
    }

    /// Takes the pending snapshot, if any.
    pub fn take(&self) -> Option<SharedSeekable<M>> {
        self.slot.lock().take()
    }

    pub fn has_pending(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Puts an unapplied snapshot back, unless a newer publish or a
    /// dispose arrived meanwhile. Latest-wins still holds.
    fn restore(&self, items: SharedSeekable<M>) {
        if self.slot.disposed.load(Ordering::Acquire) {
            return;
        }
        let mut pending = self.slot.lock();
        if pending.is_none() {
            *pending = Some(items);
        }
    }

    /// Stops accepting publishes and drops any pending snapshot.
    /// Idempotent.
    pub fn dispose(&self) {
        if !self.slot.disposed.swap(true, Ordering::AcqRel) {
            *self.slot.lock() = None;
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.slot.disposed.load(Ordering::Acquire)
    }
}

impl<M> Default for SectionMailbox<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// A group of mailbox-fed sections, pumped together on the owner thread.
pub struct FeedSet<M: ItemModel + 'static> {
    feeds: Vec<(SectionKey, SectionMailbox<M>)>,
    disposed: bool,
}

impl<M: ItemModel + 'static> FeedSet<M> {
    pub fn new() -> Self {
        Self {
            feeds: Vec::new(),
            disposed: false,
        }
    }

    /// Registers a section and returns the producer end of its mailbox.
    /// Pump order follows registration order.
    pub fn register(&mut self, key: SectionKey) -> SectionMailbox<M> {
        let mailbox = SectionMailbox::new();
        self.feeds.push((key, mailbox.clone()));
        mailbox
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Applies every pending snapshot to the adapter, concatenating the
    /// update scripts in application order.
    ///
    /// A failed update puts its snapshot back into the mailbox, so a host
    /// that logs the error and pumps again later does not lose that
    /// section's latest state.
    pub fn pump(&mut self, adapter: &mut SectionedListAdapter<M>) -> Result<Vec<ListOp<M>>> {
        let mut script = Vec::new();
        for (key, mailbox) in &self.feeds {
            if let Some(items) = mailbox.take() {
                match adapter.update_section(*key, items.clone()) {
                    Ok(ops) => script.extend(ops),
                    Err(error) => {
                        mailbox.restore(items);
                        return Err(error);
                    }
                }
            }
        }
        if !script.is_empty() {
            tracing::trace!(ops = script.len(), "pumped section feeds");
        }
        Ok(script)
    }

    /// Disposes every mailbox. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for (_, mailbox) in &self.feeds {
            mailbox.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<M: ItemModel + 'static> Default for FeedSet<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ItemModel + 'static> Drop for FeedSet<M> {
    fn drop(&mut self) {
        self.dispose();
    }
}
