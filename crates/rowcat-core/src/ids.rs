#![forbid(unsafe_code)]

//! Stable-id utilities.
//!
//! Virtualized renderers want a numeric stable id per visible position. Most
//! data sources only provide unique string identifiers, and the same model id
//! may legitimately appear in different sections or under different view
//! types. This module provides:
//!
//! - [`IdGenerator`]: a monotonic id source with an explicit seed, injected
//!   wherever ids are minted (no hidden process-wide singleton).
//! - [`StableIdMapper`]: memoized string key → dense `u64` id. Hash codes are
//!   not guaranteed unique, so the mapping is tracked explicitly.
//! - [`unique_item_id`]: combines `(model id, view type, section ordinal)`
//!   into one collision-free id for simultaneously visible positions.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;

/// Monotonic id source. `next_id` never returns the same value twice for one
/// generator, and never returns the seed itself.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Start counting from `seed`; the first generated id is `seed + 1`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoized mapping from string keys to generated `u64` stable ids.
///
/// Safe to share across producer threads; the first caller to ask for a key
/// wins and every later caller observes the same id.
#[derive(Debug)]
pub struct StableIdMapper {
    generator: IdGenerator,
    ids: Mutex<AHashMap<String, u64>>,
}

impl StableIdMapper {
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            generator: IdGenerator::with_seed(seed),
            ids: Mutex::new(AHashMap::new()),
        }
    }

    pub fn stable_id(&self, key: &str) -> u64 {
        let mut ids = self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(&id) = ids.get(key) {
            return id;
        }
        let id = self.generator.next_id();
        ids.insert(key.to_owned(), id);
        id
    }

    pub fn len(&self) -> usize {
        self.ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StableIdMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Combines a model id with its view type and section ordinal.
///
/// The section ordinal lands in bits 40.. and the view type in bits 52.., so
/// a model id may repeat across sections, or across view types within one
/// section, without colliding. The result is stable across cache rebuilds as
/// long as the three inputs are unchanged.
#[must_use]
pub fn unique_item_id(stable_id: u64, view_type_id: u32, section_ordinal: u32) -> u64 {
    stable_id ^ ((section_ordinal as u64) << 40) ^ ((view_type_id as u64) << 52)
}
