#![forbid(unsafe_code)]

//! The item model: identity vs. content equality, and the closed view-type
//! table.
//!
//! Two properties of an item keep the list fast and flicker-free: a strong
//! notion of identity (`stable_id` plus type tag) and the ability to compare
//! two items that share an identity by content. The diff engine uses identity
//! to match items across an update and content equality to decide whether a
//! matched item needs a rebind.
//!
//! Items are immutable once handed to the engine; a content change is
//! expressed as a new item value with the same identity.

use std::fmt;

use crate::error::{AdapterError, Result};

/// A value rendered at one position of the flattened list.
///
/// `stable_id` must be unique within `(kind, section)`. Whenever possible,
/// derive it from a unique property of the underlying data (row id, user
/// name, ...) so an item keeps its identity across refreshes; see
/// [`crate::StableIdMapper`] for string-keyed sources.
pub trait ItemModel: Clone {
    /// The item's type tag, drawn from a closed set the renderer registered
    /// up front.
    type Kind: Copy + Eq + fmt::Debug + Send + Sync + 'static;

    fn stable_id(&self) -> u64;

    fn kind(&self) -> Self::Kind;

    /// Whether two items with the same identity carry the same rendered
    /// data. Consulted only after [`ItemModel::same_item`] holds. The default
    /// treats identity as sufficient.
    fn same_content(&self, _other: &Self) -> bool {
        true
    }

    /// Whether two items are the same logical entity.
    fn same_item(&self, other: &Self) -> bool {
        self.stable_id() == other.stable_id() && self.kind() == other.kind()
    }
}

/// The closed set of view types known to the renderer, fixed at
/// construction. Maps a type tag to the dense ordinal id renderers key their
/// recycling pools by.
#[derive(Debug, Clone)]
pub struct ViewTypeTable<K> {
    kinds: Vec<K>,
}

impl<K: Copy + Eq + fmt::Debug> ViewTypeTable<K> {
    /// # Panics
    /// Panics if `kinds` is empty; an adapter without view types cannot
    /// resolve anything.
    pub fn new(kinds: Vec<K>) -> Self {
        assert!(!kinds.is_empty(), "view type table requires at least one kind");
        Self { kinds }
    }

    /// Ordinal id for a type tag.
    pub fn view_type_id(&self, kind: K) -> Result<u32> {
        self.kinds
            .iter()
            .position(|&k| k == kind)
            .map(|id| id as u32)
            .ok_or_else(|| AdapterError::UnknownViewType {
                kind: format!("{kind:?}"),
            })
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
