#![forbid(unsafe_code)]

//! The facade a virtualized renderer talks to.
//!
//! # Role
//! [`SectionedListAdapter`] ties the pieces together: sections registered in
//! a [`SectionRegistry`], position lookups served through a
//! [`PositionCache`], and section swaps turned into update scripts by the
//! diff engine. All mutation and lookup must happen on the owner thread
//! captured at construction; cross-thread calls fail with
//! [`AdapterError::ConcurrencyViolation`] instead of corrupting state.
//!
//! # Invariants
//! - A pre-existing section's update or removal flushes the whole position
//!   cache. Every cached entry at or after the section's offset is stale,
//!   and offsets are not stored per entry, so a full flush is the only
//!   correct cheap option.
//! - Inserting a *new* section at the end leaves earlier positions valid,
//!   so the cache survives.
//! - Lookup fallbacks go through the installed [`AdapterErrorHandler`];
//!   without one, errors propagate to the caller.

use crate::cache::{PositionCache, ResolvedItem, DEFAULT_POSITION_CACHE_CAPACITY};
use crate::diff::{diff_section, dispatch_script, ListOp, UpdateSink};
use crate::error::{AdapterError, Result};
use crate::ids::IdGenerator;
use crate::item::{ItemModel, ViewTypeTable};
use crate::owner::OwnerThread;
use crate::registry::{SectionKey, SectionRegistry};
use crate::seekable::SharedSeekable;

/// Lifecycle notification from the hosting view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachEvent {
    Attached,
    Detached,
}

/// Last-resort collaborator for lookups that fail.
///
/// Each hook may supply a substitute for the failed lookup; returning
/// `None` lets the error propagate. Implementations typically log and
/// serve a placeholder row.
pub trait AdapterErrorHandler<M: ItemModel>: Send {
    fn fallback_item(&mut self, position: usize, error: &AdapterError) -> Option<M> {
        let _ = (position, error);
        None
    }

    fn fallback_view_type_id(&mut self, position: usize, error: &AdapterError) -> Option<u32> {
        let _ = (position, error);
        None
    }

    fn fallback_unique_id(&mut self, position: usize, error: &AdapterError) -> Option<u64> {
        let _ = (position, error);
        None
    }
}

/// Composes independently updatable sections into one flat list and keeps
/// a renderer's view of it current via minimal update scripts.
pub struct SectionedListAdapter<M: ItemModel + 'static> {
    owner: OwnerThread,
    registry: SectionRegistry<M>,
    cache: PositionCache<M>,
    types: ViewTypeTable<M::Kind>,
    keys: IdGenerator,
    error_handler: Option<Box<dyn AdapterErrorHandler<M> + Send>>,
    attach_listener: Option<Box<dyn FnMut(AttachEvent) + Send>>,
    async_binding: bool,
    attached: bool,
}

impl<M: ItemModel + 'static> SectionedListAdapter<M> {
    /// Captures the calling thread as the owner.
    pub fn new(types: ViewTypeTable<M::Kind>) -> Self {
        Self::with_cache_capacity(types, DEFAULT_POSITION_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(types: ViewTypeTable<M::Kind>, capacity: usize) -> Self {
        Self {
            owner: OwnerThread::current(),
            registry: SectionRegistry::new(),
            cache: PositionCache::new(capacity),
            types,
            keys: IdGenerator::new(),
            error_handler: None,
            attach_listener: None,
            async_binding: false,
            attached: false,
        }
    }

    /// Mints a key for a section not yet registered. Keys are unique for
    /// the lifetime of the adapter and stay valid across removal.
    pub fn create_section_key(&self) -> SectionKey {
        SectionKey::next(&self.keys)
    }

    // ── section mutation ──────────────────────────────────────────────

    /// Registers an empty section at the end of the ordering. Idempotent:
    /// a key that already has items keeps them.
    pub fn add_section(&mut self, key: SectionKey) -> Result<()> {
        self.owner.ensure()?;
        if !self.registry.contains(key) {
            self.registry.update(key, crate::seekables::empty());
        }
        Ok(())
    }

    /// Replaces (or first registers) a section's items and returns the
    /// update script against the flattened sequence.
    pub fn update_section(
        &mut self,
        key: SectionKey,
        items: SharedSeekable<M>,
    ) -> Result<Vec<ListOp<M>>> {
        self.owner.ensure()?;
        let tx = self.registry.update(key, items);
        if tx.existed {
            self.cache.evict_all();
        }
        Ok(diff_section(
            tx.offset,
            tx.old_items.as_ref(),
            tx.new_items.as_ref(),
            tx.old_total,
            tx.new_total,
        ))
    }

    /// [`update_section`](Self::update_section), dispatching the script to
    /// `sink` before returning it.
    pub fn update_section_with(
        &mut self,
        key: SectionKey,
        items: SharedSeekable<M>,
        sink: &mut dyn UpdateSink<M>,
    ) -> Result<Vec<ListOp<M>>> {
        let script = self.update_section(key, items)?;
        dispatch_script(&script, sink);
        Ok(script)
    }

    /// Removes a section entirely. Unknown keys are inert and return an
    /// empty script.
    pub fn remove_section(&mut self, key: SectionKey) -> Result<Vec<ListOp<M>>> {
        self.owner.ensure()?;
        let tx = self.registry.remove(key);
        if tx.existed {
            self.cache.evict_all();
        }
        Ok(diff_section(
            tx.offset,
            tx.old_items.as_ref(),
            tx.new_items.as_ref(),
            tx.old_total,
            tx.new_total,
        ))
    }

    pub fn remove_section_with(
        &mut self,
        key: SectionKey,
        sink: &mut dyn UpdateSink<M>,
    ) -> Result<Vec<ListOp<M>>> {
        let script = self.remove_section(key)?;
        dispatch_script(&script, sink);
        Ok(script)
    }

    // ── position lookups ──────────────────────────────────────────────

    pub fn item(&mut self, position: usize) -> Result<M> {
        match self.resolve(position) {
            Ok(resolved) => Ok(resolved.item),
            Err(error) => {
                if let Some(handler) = self.error_handler.as_mut() {
                    if let Some(item) = handler.fallback_item(position, &error) {
                        tracing::warn!(position, %error, "serving fallback item");
                        return Ok(item);
                    }
                }
                Err(error)
            }
        }
    }

    /// Numeric view type for the item at `position`, stable for the
    /// lifetime of the [`ViewTypeTable`].
    pub fn item_view_type_id(&mut self, position: usize) -> Result<u32> {
        match self.resolve(position) {
            Ok(resolved) => Ok(resolved.view_type_id),
            Err(error) => {
                if let Some(handler) = self.error_handler.as_mut() {
                    if let Some(id) = handler.fallback_view_type_id(position, &error) {
                        tracing::warn!(position, %error, "serving fallback view type");
                        return Ok(id);
                    }
                }
                Err(error)
            }
        }
    }

    /// Collision-free stable id for the item at `position`, folding in the
    /// section ordinal and view type so equal model ids in different
    /// sections stay distinct.
    pub fn stable_item_id(&mut self, position: usize) -> Result<u64> {
        match self.resolve(position) {
            Ok(resolved) => Ok(resolved.unique_id),
            Err(error) => {
                if let Some(handler) = self.error_handler.as_mut() {
                    if let Some(id) = handler.fallback_unique_id(position, &error) {
                        tracing::warn!(position, %error, "serving fallback id");
                        return Ok(id);
                    }
                }
                Err(error)
            }
        }
    }

    /// Full resolution for one flat position, bypassing fallbacks.
    pub fn resolve(&mut self, position: usize) -> Result<ResolvedItem<M>> {
        self.owner.ensure()?;
        self.cache.resolve(position, &self.registry, &self.types)
    }

    // ── introspection ─────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.registry.total()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.total() == 0
    }

    pub fn section_count(&self) -> usize {
        self.registry.section_count()
    }

    pub fn contains_section(&self, key: SectionKey) -> bool {
        self.registry.contains(key)
    }

    pub fn section_items(&self, key: SectionKey) -> Option<&SharedSeekable<M>> {
        self.registry.items(key)
    }

    pub fn cache_stats(&self) -> crate::cache::PositionCacheStats {
        self.cache.stats()
    }

    // ── configuration and lifecycle ───────────────────────────────────

    pub fn set_error_handler(&mut self, handler: Box<dyn AdapterErrorHandler<M> + Send>) {
        self.error_handler = Some(handler);
    }

    /// Whether a runtime bind queue defers heavy binds off the hot path.
    /// The adapter itself only records the flag; the runtime crate reads it.
    pub fn set_async_binding(&mut self, enabled: bool) {
        self.async_binding = enabled;
    }

    pub fn async_binding(&self) -> bool {
        self.async_binding
    }

    pub fn set_attach_listener(&mut self, listener: Box<dyn FnMut(AttachEvent) + Send>) {
        self.attach_listener = Some(listener);
    }

    pub fn notify_attached(&mut self) {
        self.attached = true;
        tracing::debug!("adapter attached");
        if let Some(listener) = self.attach_listener.as_mut() {
            listener(AttachEvent::Attached);
        }
    }

    pub fn notify_detached(&mut self) {
        self.attached = false;
        tracing::debug!("adapter detached");
        if let Some(listener) = self.attach_listener.as_mut() {
            listener(AttachEvent::Detached);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}
