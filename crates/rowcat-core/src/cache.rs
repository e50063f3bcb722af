#![forbid(unsafe_code)]

//! Position → resolution LRU cache.
//!
//! Resolving a flat position means a linear walk over the registry's
//! sections; the renderer asks for the same handful of on-screen positions
//! over and over, so a small LRU in front of that walk makes every accessor
//! O(1) amortized.
//!
//! # Invariants
//! - Entries are derived data only, re-derivable from the registry on
//!   demand; the cache is never authoritative.
//! - Any mutation of a pre-existing section flushes the entire cache
//!   ([`PositionCache::evict_all`]). A partial invalidation would need to
//!   know exactly which cached positions' section offsets shifted; the full
//!   flush trades an O(capacity) recompute for eliminating that whole class
//!   of stale-offset reads.
//! - The cache never holds more than `capacity` entries; the
//!   least-recently-accessed entry is evicted first when full.

use std::collections::VecDeque;

use crate::error::{AdapterError, Result};
use crate::ids::unique_item_id;
use crate::item::{ItemModel, ViewTypeTable};
use crate::registry::{SectionKey, SectionRegistry};
use crate::seekable::Seekable;

/// Matches the on-screen working set of a typical list plus scroll margin.
pub const DEFAULT_POSITION_CACHE_CAPACITY: usize = 50;

/// Everything the renderer needs to know about one flat position.
#[derive(Debug, Clone)]
pub struct ResolvedItem<M> {
    pub item: M,
    pub view_type_id: u32,
    /// Collision-free stable id; see [`unique_item_id`].
    pub unique_id: u64,
    pub section: SectionKey,
    pub local_index: usize,
}

/// Cache statistics, for tests and instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Bounded LRU keyed by flat position. Back of the deque is most recent.
pub struct PositionCache<M> {
    entries: VecDeque<(usize, ResolvedItem<M>)>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<M: ItemModel + 'static> PositionCache<M> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Resolve a flat position, consulting the registry on miss.
    ///
    /// Fails with [`AdapterError::OutOfRangeLookup`] if `position` does not
    /// fall within any registered section, and with
    /// [`AdapterError::UnknownViewType`] if the item's type tag is not in
    /// the table.
    pub fn resolve(
        &mut self,
        position: usize,
        registry: &SectionRegistry<M>,
        types: &ViewTypeTable<M::Kind>,
    ) -> Result<ResolvedItem<M>> {
        if let Some(index) = self.entries.iter().position(|(p, _)| *p == position) {
            if let Some(entry) = self.entries.remove(index) {
                self.hits += 1;
                let resolved = entry.1.clone();
                self.entries.push_back(entry);
                return Ok(resolved);
            }
        }

        self.misses += 1;
        let hit = registry
            .locate(position)
            .ok_or(AdapterError::OutOfRangeLookup {
                position,
                len: registry.total(),
            })?;
        let items = registry
            .items(hit.key)
            .ok_or(AdapterError::OutOfRangeLookup {
                position,
                len: registry.total(),
            })?;
        let item = items.get(hit.local_index);
        let view_type_id = types.view_type_id(item.kind())?;
        let resolved = ResolvedItem {
            unique_id: unique_item_id(item.stable_id(), view_type_id, hit.ordinal),
            item,
            view_type_id,
            section: hit.key,
            local_index: hit.local_index,
        };

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((position, resolved.clone()));
        Ok(resolved)
    }

    /// Clears every entry unconditionally.
    pub fn evict_all(&mut self) {
        tracing::trace!(evicted = self.entries.len(), "position cache flushed");
        self.entries.clear();
    }

    pub fn contains(&self, position: usize) -> bool {
        self.entries.iter().any(|(p, _)| *p == position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> PositionCacheStats {
        PositionCacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;
    use crate::seekables;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Kind {
        Row,
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Item(u64);

    impl ItemModel for Item {
        type Kind = Kind;

        fn stable_id(&self) -> u64 {
            self.0
        }

        fn kind(&self) -> Kind {
            Kind::Row
        }
    }

    fn fixture(sizes: &[usize]) -> (SectionRegistry<Item>, ViewTypeTable<Kind>, Vec<SectionKey>) {
        let generator = IdGenerator::new();
        let mut registry = SectionRegistry::new();
        let mut keys = Vec::new();
        let mut next = 0u64;
        for &size in sizes {
            let key = SectionKey::next(&generator);
            let items: Vec<Item> = (0..size)
                .map(|_| {
                    next += 1;
                    Item(next)
                })
                .collect();
            registry.update(key, seekables::copy_of(items));
            keys.push(key);
        }
        (registry, ViewTypeTable::new(vec![Kind::Row]), keys)
    }

    #[test]
    fn resolve_hits_after_miss() {
        let (registry, types, keys) = fixture(&[3, 2]);
        let mut cache = PositionCache::new(10);

        let first = cache.resolve(3, &registry, &types).unwrap();
        assert_eq!(first.item, Item(4));
        assert_eq!(first.section, keys[1]);
        assert_eq!(first.local_index, 0);

        let again = cache.resolve(3, &registry, &types).unwrap();
        assert_eq!(again.unique_id, first.unique_id);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn out_of_range_is_an_error() {
        let (registry, types, _) = fixture(&[2]);
        let mut cache = PositionCache::new(10);
        let error = cache.resolve(2, &registry, &types).unwrap_err();
        assert_eq!(
            error,
            AdapterError::OutOfRangeLookup {
                position: 2,
                len: 2
            }
        );
    }

    #[test]
    fn lru_bound_holds_and_oldest_goes_first() {
        let (registry, types, _) = fixture(&[8]);
        let mut cache = PositionCache::new(2);

        cache.resolve(0, &registry, &types).unwrap();
        cache.resolve(1, &registry, &types).unwrap();
        assert_eq!(cache.len(), 2);

        // Touch 0 so 1 becomes least recently used.
        cache.resolve(0, &registry, &types).unwrap();
        cache.resolve(2, &registry, &types).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(0));
        assert!(cache.contains(2));
        assert!(!cache.contains(1), "LRU entry evicted first");
    }

    #[test]
    fn evict_all_forces_recompute() {
        let (registry, types, _) = fixture(&[4]);
        let mut cache = PositionCache::new(10);
        cache.resolve(0, &registry, &types).unwrap();
        cache.resolve(1, &registry, &types).unwrap();

        cache.evict_all();
        assert!(cache.is_empty());

        cache.resolve(0, &registry, &types).unwrap();
        let stats = cache.stats();
        assert_eq!(stats.misses, 3, "post-eviction resolve recomputes");
    }

    #[test]
    fn unique_ids_distinct_across_sections_with_same_model_id() {
        let generator = IdGenerator::new();
        let mut registry = SectionRegistry::new();
        let x = SectionKey::next(&generator);
        let y = SectionKey::next(&generator);
        registry.update(x, seekables::copy_of(vec![Item(7)]));
        registry.update(y, seekables::copy_of(vec![Item(7)]));
        let types = ViewTypeTable::new(vec![Kind::Row]);
        let mut cache = PositionCache::new(10);

        let a = cache.resolve(0, &registry, &types).unwrap();
        let b = cache.resolve(1, &registry, &types).unwrap();
        assert_ne!(a.unique_id, b.unique_id);
    }

    #[test]
    fn capacity_is_clamped_to_one() {
        let cache: PositionCache<Item> = PositionCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }
}
