#![forbid(unsafe_code)]

//! Scheduling policy on top of `rowcat-core`.
//!
//! # Role in rowcat
//! The core crate is strictly synchronous and single-threaded. This crate
//! adds the two pieces a real UI loop needs around it:
//!
//! - **AsyncBindQueue**: defers expensive item binds off the hot scroll
//!   path, working through them in budgeted slices so a long backlog never
//!   blocks a frame.
//! - **SectionMailbox / FeedSet**: latest-wins handoff slots so background
//!   producers can publish section snapshots from any thread, with the
//!   owner thread pumping them into the adapter at its own pace.
//!
//! Both are driven by a pluggable monotonic [`Clock`] so tests control
//! time explicitly.

pub mod bind_queue;
pub mod clock;
pub mod mailbox;

pub use bind_queue::{
    AsyncBindQueue, BindHost, BindRequest, FlushOutcome, HolderId, Reveal, BIND_BUDGET,
    REVEAL_FADE_DELAY, REVEAL_FADE_DURATION,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use mailbox::{FeedSet, SectionMailbox};
