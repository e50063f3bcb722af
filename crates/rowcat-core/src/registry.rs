#![forbid(unsafe_code)]

//! Ordered section bookkeeping.
//!
//! The registry maps section keys to their current item sequences. Insertion
//! order defines the global ordering of the flattened list, and the cached
//! `total` is recomputed after every structural change, never derived lazily
//! from stale per-section sizes.
//!
//! Mutations return a [`SectionTransaction`] capturing everything the diff
//! engine needs: the section's flat offset, its old and new items, and the
//! flattened sizes before and after. The offset is the sum of the sizes of
//! every section registered before the target.

use crate::ids::IdGenerator;
use crate::item::ItemModel;
use crate::seekable::{Seekable, SharedSeekable};
use crate::seekables;

/// Opaque identity of a section. Never reused within one generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionKey(u64);

impl SectionKey {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocate a fresh key from the host's id generator.
    pub fn next(generator: &IdGenerator) -> Self {
        Self(generator.next_id())
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// One section mutation, as handed to the diff engine.
pub struct SectionTransaction<M> {
    /// Flat position of the section's first item (before and after; only the
    /// section's own size changes).
    pub offset: usize,
    pub old_items: SharedSeekable<M>,
    pub new_items: SharedSeekable<M>,
    pub old_total: usize,
    pub new_total: usize,
    /// Whether the section was registered before this mutation. Pre-existing
    /// sections force full cache eviction; fresh ones do not.
    pub existed: bool,
}

/// Where a flat position landed within the registered sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionInSection {
    pub ordinal: u32,
    pub key: SectionKey,
    pub local_index: usize,
}

/// Insertion-ordered mapping of section key to current items.
pub struct SectionRegistry<M: ItemModel> {
    sections: Vec<(SectionKey, SharedSeekable<M>)>,
    total: usize,
}

impl<M: ItemModel + 'static> SectionRegistry<M> {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            total: 0,
        }
    }

    /// Flattened item count across all sections.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of registered sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn contains(&self, key: SectionKey) -> bool {
        self.sections.iter().any(|(k, _)| *k == key)
    }

    pub fn items(&self, key: SectionKey) -> Option<&SharedSeekable<M>> {
        self.sections
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, items)| items)
    }

    /// Replaces a section's items, creating the section at the end of the
    /// ordering if absent.
    pub fn update(&mut self, key: SectionKey, items: SharedSeekable<M>) -> SectionTransaction<M> {
        let (offset, index) = self.offset_of(key);
        let old_total = self.total;
        let old_items = match index {
            Some(i) => std::mem::replace(&mut self.sections[i].1, items.clone()),
            None => {
                self.sections.push((key, items.clone()));
                seekables::empty()
            }
        };
        self.total = self.compute_total();
        tracing::debug!(
            section = key.raw(),
            offset,
            old = old_items.len(),
            new = items.len(),
            total = self.total,
            "section updated"
        );
        SectionTransaction {
            offset,
            old_items,
            new_items: items,
            old_total,
            new_total: self.total,
            existed: index.is_some(),
        }
    }

    /// Removes a section and its items. Unknown keys produce an empty
    /// transaction (`existed == false`, empty old and new items).
    pub fn remove(&mut self, key: SectionKey) -> SectionTransaction<M> {
        let (offset, index) = self.offset_of(key);
        let old_total = self.total;
        let old_items = match index {
            Some(i) => self.sections.remove(i).1,
            None => seekables::empty(),
        };
        self.total = self.compute_total();
        tracing::debug!(
            section = key.raw(),
            offset,
            removed = old_items.len(),
            total = self.total,
            "section removed"
        );
        SectionTransaction {
            offset,
            old_items,
            new_items: seekables::empty(),
            old_total,
            new_total: self.total,
            existed: index.is_some(),
        }
    }

    /// Linear section-offset search: walk sections in order accumulating
    /// sizes until `position` falls within one.
    pub fn locate(&self, position: usize) -> Option<PositionInSection> {
        let mut seen = 0;
        for (ordinal, (key, items)) in self.sections.iter().enumerate() {
            let size = items.len();
            if position < seen + size {
                return Some(PositionInSection {
                    ordinal: ordinal as u32,
                    key: *key,
                    local_index: position - seen,
                });
            }
            seen += size;
        }
        None
    }

    /// Sum of sizes of sections preceding `key`, plus whether/where the key
    /// is registered. For unknown keys the offset equals the current total.
    fn offset_of(&self, key: SectionKey) -> (usize, Option<usize>) {
        let mut seen = 0;
        for (index, (k, items)) in self.sections.iter().enumerate() {
            if *k == key {
                return (seen, Some(index));
            }
            seen += items.len();
        }
        (seen, None)
    }

    fn compute_total(&self) -> usize {
        self.sections.iter().map(|(_, items)| items.len()).sum()
    }
}

impl<M: ItemModel + 'static> Default for SectionRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}
