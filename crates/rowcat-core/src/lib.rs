#![forbid(unsafe_code)]

//! Core: section composition, diffing, and position resolution for
//! virtualized lists.
//!
//! # Role in rowcat
//! `rowcat-core` owns the synchronous data path. It composes N independently
//! updatable sections into one flat, position-addressable sequence, computes
//! a minimal update script whenever a single section's items are swapped,
//! and resolves flat positions to items through a small LRU cache.
//!
//! # Primary responsibilities
//! - **ItemModel**: identity vs. content equality for list items.
//! - **Seekable**: random-access sequences and their combinators.
//! - **SectionRegistry**: ordered section bookkeeping and offsets.
//! - **diff**: the single-section composition diff engine.
//! - **PositionCache**: bounded position → resolution LRU.
//! - **SectionedListAdapter**: the facade a renderer talks to.
//!
//! # How it fits in the system
//! The runtime crate (`rowcat-runtime`) layers scheduling policy on top:
//! deferred binding with a politeness budget and latest-wins mailboxes for
//! cross-thread section producers. Everything in this crate runs on the
//! single owner thread captured at adapter construction.

pub mod adapter;
pub mod cache;
pub mod diff;
pub mod error;
pub mod ids;
pub mod item;
pub mod owner;
pub mod registry;
pub mod seekable;
pub mod seekables;

pub use adapter::{AdapterErrorHandler, AttachEvent, SectionedListAdapter};
pub use cache::{PositionCache, ResolvedItem, DEFAULT_POSITION_CACHE_CAPACITY};
pub use diff::{apply_script, diff_section, dispatch_script, ListOp, UpdateSink};
pub use error::{AdapterError, Result};
pub use ids::{unique_item_id, IdGenerator, StableIdMapper};
pub use item::{ItemModel, ViewTypeTable};
pub use owner::OwnerThread;
pub use registry::{SectionKey, SectionRegistry, SectionTransaction};
pub use seekable::{Seekable, SeekableIter, SharedSeekable};
