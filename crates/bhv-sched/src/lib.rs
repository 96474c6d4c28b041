//! `bhv-sched` — sparse per-tick task queue.
//!
//! # Why this exists
//!
//! Most scheduled work (delayed actions, cooldown refreshes) is due on a
//! handful of future ticks.  Scanning every pending task each tick would
//! cost O(N) regardless of how many are actually due.  `Scheduler` inverts
//! the problem: tasks register the tick they fire at, and each tick the
//! caller drains only the tasks due right now — O(due) work instead of O(N).
//!
//! # Performance note
//!
//! `BTreeMap` gives O(log W) insert and pop where W = number of distinct
//! fire ticks currently enqueued.  For typical content (delays of a few
//! dozen ticks) W stays tiny.
//!
//! Timing is pure tick counts — there are no wall-clock timers anywhere in
//! the engine.

mod scheduler;

#[cfg(test)]
mod tests;

pub use scheduler::{Scheduler, TaskId};
