#![forbid(unsafe_code)]

//! Constructors for common kinds of [`crate::Seekable`].

use std::sync::Arc;

use crate::seekable::{
    AppendedSeekable, ConcatSeekable, EmptySeekable, ListSeekable, MappedSeekable,
    ReversingSeekable, SharedSeekable, SplicingSeekable,
};

/// A seekable with zero items.
pub fn empty<T: 'static>() -> SharedSeekable<T> {
    Arc::new(EmptySeekable::new())
}

/// An immutable seekable over the given items.
pub fn copy_of<T: Clone + Send + Sync + 'static>(items: Vec<T>) -> SharedSeekable<T> {
    Arc::new(ListSeekable::new(items))
}

/// A seekable of a single item.
pub fn of<T: Clone + Send + Sync + 'static>(item: T) -> SharedSeekable<T> {
    copy_of(vec![item])
}

/// A seekable that reverses another seekable.
pub fn reverse<T: 'static>(source: SharedSeekable<T>) -> SharedSeekable<T> {
    Arc::new(ReversingSeekable::new(source))
}

/// A seekable that maps each item of `source`, with access to its position.
pub fn map<S: 'static, T: 'static>(
    source: SharedSeekable<S>,
    mapping: impl Fn(S, usize) -> T + Send + Sync + 'static,
) -> SharedSeekable<T> {
    Arc::new(MappedSeekable::new(source, Arc::new(mapping)))
}

/// Two seekables concatenated together.
pub fn concat_pair<T: 'static>(head: SharedSeekable<T>, tail: SharedSeekable<T>) -> SharedSeekable<T> {
    Arc::new(AppendedSeekable::new(head, tail))
}

/// A list of seekables concatenated together.
pub fn concat<T: 'static>(list: Vec<SharedSeekable<T>>) -> SharedSeekable<T> {
    Arc::new(ConcatSeekable::new(list))
}

/// Splices `splice` into `content` at `splice_position`. If the position is
/// beyond the length of `content`, `splice` is appended at the end.
pub fn splice<T: 'static>(
    content: SharedSeekable<T>,
    splice: SharedSeekable<T>,
    splice_position: usize,
) -> SharedSeekable<T> {
    Arc::new(SplicingSeekable::new(content, splice, splice_position))
}
