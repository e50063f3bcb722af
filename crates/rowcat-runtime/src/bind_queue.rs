#![forbid(unsafe_code)]

//! Deferred binding with a politeness budget.
//!
//! # Role
//! Binding an item into a recycled view can be expensive (layout, text
//! shaping, image decode kickoff). When async binding is enabled, bind
//! requests are queued here instead of running inline, and a flush pass
//! works through the backlog in budgeted slices on the owner thread.
//!
//! # Invariants
//! - Every flush binds at least one pending request before checking the
//!   budget, so the queue always makes progress even under a tiny budget.
//! - A request stores no authoritative position. Section updates between
//!   enqueue and flush shift items around, so the flush asks the host for
//!   the holder's *current* position and binds there.
//! - Requests whose holder was recycled, whose holder no longer has a
//!   position, or whose current position does not resolve are dropped
//!   without consuming budget. All three are normal outcomes of scrolling
//!   during the backlog, not errors.
//! - The scheduled flag is cleared only once the queue is fully drained.
//!   A flush that yields on budget leaves it set, and [`FlushOutcome`]
//!   tells the caller to post another flush.
//! - Items that were hidden for sizing and waited longer than
//!   [`REVEAL_FADE_DELAY`] are revealed with a fade; everything else
//!   appears instantly. The cutoff hides the latency of a deep backlog
//!   without making fast binds flicker.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rowcat_core::{AdapterError, ItemModel, Result, SectionedListAdapter};

use crate::clock::{Clock, MonotonicClock};

/// Budget for one flush slice. Roughly one 60 Hz frame minus headroom.
pub const BIND_BUDGET: Duration = Duration::from_millis(12);

/// Requests older than this when bound are revealed with a fade.
pub const REVEAL_FADE_DELAY: Duration = Duration::from_millis(150);

/// Fade duration for late reveals.
pub const REVEAL_FADE_DURATION: Duration = Duration::from_millis(100);

/// Opaque identity of a recyclable view holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolderId(pub u64);

/// How a bound view should become visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Instant,
    Fade { duration: Duration },
}

/// One pending bind.
#[derive(Debug, Clone, Copy)]
pub struct BindRequest {
    pub holder: HolderId,
    /// Position at enqueue time, kept for diagnostics only; the flush
    /// re-resolves through [`BindHost::current_position`].
    pub position: usize,
    /// The holder was hidden while awaiting measurement, so becoming
    /// visible is a reveal rather than an in-place refresh.
    pub needs_sizing: bool,
    enqueued_at: Duration,
}

/// The renderer-side half of deferred binding.
pub trait BindHost<M: ItemModel> {
    /// Whether the holder was recycled since its request was queued.
    fn is_recycled(&self, holder: HolderId) -> bool;

    /// The holder's position right now, or `None` if it no longer shows
    /// any position. Section updates can shift an item between enqueue
    /// and flush; binds go to this position, never the enqueue-time one.
    fn current_position(&self, holder: HolderId) -> Option<usize>;

    fn bind(&mut self, holder: HolderId, item: &M, position: usize) -> Result<()>;

    fn reveal(&mut self, holder: HolderId, reveal: Reveal);
}

/// What a flush pass accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Queue is empty; the scheduled flag was cleared.
    Drained { bound: usize },
    /// Budget ran out with work left; caller must post another flush.
    Yielded { bound: usize, remaining: usize },
}

/// FIFO of deferred binds, flushed in budgeted slices.
pub struct AsyncBindQueue<C: Clock = MonotonicClock> {
    queue: VecDeque<BindRequest>,
    scheduled: AtomicBool,
    clock: C,
}

impl AsyncBindQueue<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for AsyncBindQueue<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> AsyncBindQueue<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            queue: VecDeque::new(),
            scheduled: AtomicBool::new(false),
            clock,
        }
    }

    /// Queues a bind for `holder` at `position`.
    ///
    /// Returns `true` when the caller must schedule a flush: exactly one
    /// enqueue per idle period wins the compare-and-swap, so at most one
    /// flush is ever outstanding.
    pub fn enqueue(&mut self, holder: HolderId, position: usize, needs_sizing: bool) -> bool {
        self.queue.push_back(BindRequest {
            holder,
            position,
            needs_sizing,
            enqueued_at: self.clock.now_mono(),
        });
        self.scheduled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled.load(Ordering::Acquire)
    }

    /// Works through the backlog until it drains or the budget runs out.
    ///
    /// Each request is re-resolved at flush time: the host supplies the
    /// holder's current position, and the bind goes there. Recycled,
    /// positionless, and unresolvable requests are discarded for free.
    /// After each bind the holder is revealed, fading if it was hidden
    /// for sizing and the request is older than [`REVEAL_FADE_DELAY`]; a
    /// bind error is logged and does not stop the flush or suppress the
    /// reveal.
    pub fn flush<M: ItemModel + 'static>(
        &mut self,
        adapter: &mut SectionedListAdapter<M>,
        host: &mut dyn BindHost<M>,
    ) -> FlushOutcome {
        let started = self.clock.now_mono();
        let mut bound = 0usize;

        while let Some(request) = self.queue.pop_front() {
            if host.is_recycled(request.holder) {
                tracing::trace!(holder = request.holder.0, "skipping recycled holder");
                continue;
            }
            let Some(position) = host.current_position(request.holder) else {
                tracing::trace!(holder = request.holder.0, "holder lost its position");
                continue;
            };
            let resolved = match adapter.resolve(position) {
                Ok(resolved) => resolved,
                Err(AdapterError::OutOfRangeLookup { position, len }) => {
                    tracing::debug!(position, len, "dropping stale bind request");
                    continue;
                }
                Err(error) => {
                    tracing::warn!(position, %error, "bind resolution failed");
                    continue;
                }
            };

            if let Err(error) = host.bind(request.holder, &resolved.item, position) {
                tracing::error!(position, %error, "deferred bind failed");
            }
            let now = self.clock.now_mono();
            let waited_long = now.saturating_sub(request.enqueued_at) > REVEAL_FADE_DELAY;
            let reveal = if request.needs_sizing && waited_long {
                Reveal::Fade {
                    duration: REVEAL_FADE_DURATION,
                }
            } else {
                Reveal::Instant
            };
            host.reveal(request.holder, reveal);
            bound += 1;

            if now.saturating_sub(started) > BIND_BUDGET && !self.queue.is_empty() {
                tracing::debug!(bound, remaining = self.queue.len(), "bind budget exhausted");
                return FlushOutcome::Yielded {
                    bound,
                    remaining: self.queue.len(),
                };
            }
        }

        self.scheduled.store(false, Ordering::Release);
        FlushOutcome::Drained { bound }
    }
}
