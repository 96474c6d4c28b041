//! `Scheduler<T>` — delayed and repeating task payloads keyed by fire tick.

use std::collections::BTreeMap;

use bhv_core::Tick;

/// Handle for cancelling a scheduled task.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TaskId(u64);

struct Entry<T> {
    id:      TaskId,
    payload: T,
    /// `Some(period)` re-enqueues the payload every `period` ticks after it
    /// fires; `None` is one-shot.
    period: Option<u64>,
}

/// A priority queue mapping simulation ticks → task payloads due at that tick.
///
/// The scheduler holds opaque payloads; the caller decides what firing
/// means.  `drain_due(now)` is expected to be called exactly once per tick
/// from the tick thread.
pub struct Scheduler<T> {
    inner:   BTreeMap<Tick, Vec<Entry<T>>>,
    next_id: u64,
    /// Cached total entry count for O(1) `len()`.
    total: usize,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            inner:   BTreeMap::new(),
            next_id: 0,
            total:   0,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to fire once, `delay` ticks after `now`.
    ///
    /// `schedule(now, 5, t)` fires on exactly the 5th subsequent tick, never
    /// earlier.  A zero delay fires on the next `drain_due` call.
    pub fn schedule(&mut self, now: Tick, delay: u64, payload: T) -> TaskId {
        self.push(now.offset(delay), payload, None)
    }

    /// Schedule `payload` to first fire `delay` ticks after `now` and then
    /// re-fire every `period` ticks until cancelled.
    ///
    /// # Panics
    /// Panics in debug mode if `period == 0`.
    pub fn schedule_repeating(
        &mut self,
        now: Tick,
        delay: u64,
        period: u64,
        payload: T,
    ) -> TaskId {
        debug_assert!(period > 0, "repeating period must be > 0");
        self.push(now.offset(delay), payload, Some(period))
    }

    fn push(&mut self, at: Tick, payload: T, period: Option<u64>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.inner.entry(at).or_default().push(Entry { id, payload, period });
        self.total += 1;
        id
    }

    /// Remove a pending task.  Returns `false` if it already fired (one-shot)
    /// or was never scheduled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let mut found = false;
        self.inner.retain(|_, entries| {
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                entries.remove(pos);
                found = true;
            }
            !entries.is_empty()
        });
        if found {
            self.total -= 1;
        }
        found
    }

    /// Remove and return every payload due at or before `now`, in schedule
    /// order.  Repeating tasks are re-enqueued at `fire_tick + period` with
    /// the same `TaskId`.
    pub fn drain_due(&mut self, now: Tick) -> Vec<T> {
        let mut due = Vec::new();
        let mut reinserts = Vec::new();

        while let Some((&tick, _)) = self.inner.first_key_value() {
            if tick > now {
                break;
            }
            let entries = self.inner.remove(&tick).unwrap_or_default();
            self.total -= entries.len();
            for entry in entries {
                due.push(entry.payload.clone());
                if let Some(period) = entry.period {
                    reinserts.push((tick.offset(period), entry));
                }
            }
        }

        for (at, entry) in reinserts {
            self.inner.entry(at).or_default().push(entry);
            self.total += 1;
        }
        due
    }

    /// The earliest tick with at least one pending task, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// Total pending entries across all future ticks.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct future ticks that have at least one pending task.
    pub fn tick_count(&self) -> usize {
        self.inner.len()
    }
}
