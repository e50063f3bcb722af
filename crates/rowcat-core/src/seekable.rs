#![forbid(unsafe_code)]

//! Random-access sequences and their combinators.
//!
//! A [`Seekable`] is a fixed-size sequence addressed by position. Sections
//! hand their items to the adapter as seekables, and combinators let callers
//! assemble section contents without copying: concatenate, reverse, splice,
//! overlay sparse updates, or map lazily. Constructors live in
//! [`crate::seekables`].
//!
//! Positional `get` follows slice-indexing conventions: out-of-range access
//! panics. The adapter never issues out-of-range gets because the flattened
//! total size is knowable ahead of any query.

use std::marker::PhantomData;
use std::sync::Arc;

use ahash::AHashMap;

/// Shared handle to a seekable, cheap to clone on section swaps.
pub type SharedSeekable<T> = Arc<dyn Seekable<T> + Send + Sync>;

/// Interface for random-access lookups of a fixed number of items.
pub trait Seekable<T> {
    /// Number of items in this data set.
    fn len(&self) -> usize;

    /// Returns the item at the given position.
    ///
    /// # Panics
    /// Panics if `position >= len()`.
    fn get(&self, position: usize) -> T;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Position-walking iterator over any seekable.
pub struct SeekableIter<'a, T> {
    source: &'a dyn Seekable<T>,
    position: usize,
}

impl<'a, T> SeekableIter<'a, T> {
    pub fn new(source: &'a dyn Seekable<T>) -> Self {
        Self { source, position: 0 }
    }
}

impl<T> Iterator for SeekableIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.position < self.source.len() {
            let item = self.source.get(self.position);
            self.position += 1;
            Some(item)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.source.len() - self.position;
        (remaining, Some(remaining))
    }
}

/// Collect a seekable into a `Vec`.
pub fn to_vec<T>(source: &dyn Seekable<T>) -> Vec<T> {
    SeekableIter::new(source).collect()
}

/// A seekable with zero items.
pub struct EmptySeekable<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> EmptySeekable<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for EmptySeekable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Seekable<T> for EmptySeekable<T> {
    fn len(&self) -> usize {
        0
    }

    fn get(&self, position: usize) -> T {
        panic!("position {position} out of bounds for empty seekable");
    }
}

/// Wraps a `Vec` as a seekable.
#[derive(Debug, Clone)]
pub struct ListSeekable<T> {
    items: Vec<T>,
}

impl<T: Clone> ListSeekable<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T: Clone> From<Vec<T>> for ListSeekable<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Clone> Seekable<T> for ListSeekable<T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, position: usize) -> T {
        self.items[position].clone()
    }
}

/// Two seekables concatenated together.
pub struct AppendedSeekable<T> {
    head: SharedSeekable<T>,
    tail: SharedSeekable<T>,
}

impl<T> AppendedSeekable<T> {
    pub fn new(head: SharedSeekable<T>, tail: SharedSeekable<T>) -> Self {
        Self { head, tail }
    }
}

impl<T> Seekable<T> for AppendedSeekable<T> {
    fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    fn get(&self, position: usize) -> T {
        let head_len = self.head.len();
        if position < head_len {
            self.head.get(position)
        } else {
            self.tail.get(position - head_len)
        }
    }
}

/// A list of seekables concatenated together.
pub struct ConcatSeekable<T> {
    list: Vec<SharedSeekable<T>>,
}

impl<T> ConcatSeekable<T> {
    pub fn new(list: Vec<SharedSeekable<T>>) -> Self {
        Self { list }
    }
}

impl<T> Seekable<T> for ConcatSeekable<T> {
    fn len(&self) -> usize {
        self.list.iter().map(|s| s.len()).sum()
    }

    fn get(&self, position: usize) -> T {
        let mut relative = position;
        for section in &self.list {
            let size = section.len();
            if relative < size {
                return section.get(relative);
            }
            relative -= size;
        }
        panic!("position {position} out of bounds for concat of {} items", self.len());
    }
}

/// A seekable that reverses another seekable.
pub struct ReversingSeekable<T> {
    source: SharedSeekable<T>,
}

impl<T> ReversingSeekable<T> {
    pub fn new(source: SharedSeekable<T>) -> Self {
        Self { source }
    }
}

impl<T> Seekable<T> for ReversingSeekable<T> {
    fn len(&self) -> usize {
        self.source.len()
    }

    fn get(&self, position: usize) -> T {
        self.source.get(self.len() - position - 1)
    }
}

/// A seekable that splices another seekable in at the given position.
///
/// If `splice_position` is beyond the length of `content`, `splice` is
/// appended to the end of `content`.
pub struct SplicingSeekable<T> {
    content: SharedSeekable<T>,
    splice: SharedSeekable<T>,
    splice_position: usize,
}

impl<T> SplicingSeekable<T> {
    pub fn new(content: SharedSeekable<T>, splice: SharedSeekable<T>, splice_position: usize) -> Self {
        Self { content, splice, splice_position }
    }
}

impl<T> Seekable<T> for SplicingSeekable<T> {
    fn len(&self) -> usize {
        self.content.len() + self.splice.len()
    }

    fn get(&self, position: usize) -> T {
        if position < self.splice_position {
            if position < self.content.len() {
                self.content.get(position)
            } else {
                self.splice.get(position - self.content.len())
            }
        } else if self.splice_position < self.content.len() {
            let content_seen = self.splice_position.min(self.content.len());
            let offset = position - content_seen;
            if offset < self.splice.len() {
                self.splice.get(offset)
            } else {
                self.content.get(position - self.splice.len())
            }
        } else {
            self.splice.get(position - self.content.len())
        }
    }
}

/// A seekable with a sparse layer of overlayed updates on top of a source.
pub struct SparseUpdateSeekable<T> {
    source: SharedSeekable<T>,
    updates: AHashMap<usize, T>,
}

impl<T: Clone> SparseUpdateSeekable<T> {
    pub fn new(source: SharedSeekable<T>) -> Self {
        Self { source, updates: AHashMap::new() }
    }

    /// Replaces the item at a specific position.
    ///
    /// # Panics
    /// Panics if `position` exceeds the source size.
    pub fn update(&mut self, position: usize, item: T) {
        assert!(
            position < self.source.len(),
            "update position {position} out of bounds for {} items",
            self.source.len()
        );
        self.updates.insert(position, item);
    }
}

impl<T: Clone> Seekable<T> for SparseUpdateSeekable<T> {
    fn len(&self) -> usize {
        self.source.len()
    }

    fn get(&self, position: usize) -> T {
        match self.updates.get(&position) {
            Some(item) => item.clone(),
            None => self.source.get(position),
        }
    }
}

/// A seekable that maps each item of a source, with access to its position.
pub struct MappedSeekable<S, T> {
    source: SharedSeekable<S>,
    mapping: Arc<dyn Fn(S, usize) -> T + Send + Sync>,
}

impl<S, T> MappedSeekable<S, T> {
    pub fn new(
        source: SharedSeekable<S>,
        mapping: Arc<dyn Fn(S, usize) -> T + Send + Sync>,
    ) -> Self {
        Self { source, mapping }
    }
}

impl<S, T> Seekable<T> for MappedSeekable<S, T> {
    fn len(&self) -> usize {
        self.source.len()
    }

    fn get(&self, position: usize) -> T {
        (self.mapping)(self.source.get(position), position)
    }
}
