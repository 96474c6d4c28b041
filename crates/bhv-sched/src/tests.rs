//! Unit tests for bhv-sched.

use bhv_core::Tick;

use crate::Scheduler;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Run `sched` forward from `from` (exclusive) to `to` (inclusive),
/// collecting (tick, payload) pairs as they fire.
fn run(sched: &mut Scheduler<&'static str>, from: u64, to: u64) -> Vec<(u64, &'static str)> {
    let mut fired = Vec::new();
    for t in (from + 1)..=to {
        for payload in sched.drain_due(Tick(t)) {
            fired.push((t, payload));
        }
    }
    fired
}

#[cfg(test)]
mod one_shot {
    use super::*;

    #[test]
    fn fires_on_exactly_the_nth_subsequent_tick() {
        let mut sched = Scheduler::new();
        sched.schedule(Tick(0), 5, "task");

        assert!(sched.drain_due(Tick(1)).is_empty());
        assert!(sched.drain_due(Tick(4)).is_empty());
        assert_eq!(sched.drain_due(Tick(5)), vec!["task"]);
        // One-shot: never again.
        assert!(sched.drain_due(Tick(6)).is_empty());
        assert!(sched.is_empty());
    }

    #[test]
    fn zero_delay_fires_on_next_drain() {
        let mut sched = Scheduler::new();
        sched.schedule(Tick(3), 0, "now-ish");
        assert_eq!(sched.drain_due(Tick(3)), vec!["now-ish"]);
    }

    #[test]
    fn same_tick_tasks_fire_in_schedule_order() {
        let mut sched = Scheduler::new();
        sched.schedule(Tick(0), 2, "first");
        sched.schedule(Tick(0), 2, "second");
        assert_eq!(sched.drain_due(Tick(2)), vec!["first", "second"]);
    }

    #[test]
    fn missed_ticks_still_fire() {
        // If the caller skips ahead, everything due in between comes out.
        let mut sched = Scheduler::new();
        sched.schedule(Tick(0), 2, "a");
        sched.schedule(Tick(0), 4, "b");
        assert_eq!(sched.drain_due(Tick(10)), vec!["a", "b"]);
    }
}

#[cfg(test)]
mod repeating {
    use super::*;

    #[test]
    fn refires_every_period() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(Tick(0), 3, 3, "pulse");
        let fired = run(&mut sched, 0, 12);
        assert_eq!(
            fired,
            vec![(3, "pulse"), (6, "pulse"), (9, "pulse"), (12, "pulse")]
        );
        // Still pending — repeats until cancelled.
        assert_eq!(sched.len(), 1);
        assert_eq!(sched.next_tick(), Some(Tick(15)));
    }

    #[test]
    fn delay_and_period_are_independent() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(Tick(0), 1, 4, "pulse");
        let fired = run(&mut sched, 0, 10);
        assert_eq!(fired, vec![(1, "pulse"), (5, "pulse"), (9, "pulse")]);
    }

    #[test]
    fn cancel_stops_refiring() {
        let mut sched = Scheduler::new();
        let id = sched.schedule_repeating(Tick(0), 2, 2, "pulse");
        assert_eq!(run(&mut sched, 0, 4), vec![(2, "pulse"), (4, "pulse")]);
        assert!(sched.cancel(id));
        assert!(run(&mut sched, 4, 20).is_empty());
        assert!(sched.is_empty());
    }
}

#[cfg(test)]
mod cancel_and_bookkeeping {
    use super::*;

    #[test]
    fn cancel_pending_one_shot() {
        let mut sched = Scheduler::new();
        let a = sched.schedule(Tick(0), 5, "a");
        let b = sched.schedule(Tick(0), 5, "b");
        assert!(sched.cancel(a));
        assert!(!sched.cancel(a), "second cancel is a no-op");
        assert_eq!(sched.drain_due(Tick(5)), vec!["b"]);
        let _ = b;
    }

    #[test]
    fn counts() {
        let mut sched = Scheduler::new();
        assert!(sched.is_empty());
        sched.schedule(Tick(0), 1, "x");
        sched.schedule(Tick(0), 1, "y");
        sched.schedule(Tick(0), 9, "z");
        assert_eq!(sched.len(), 3);
        assert_eq!(sched.tick_count(), 2);
        assert_eq!(sched.next_tick(), Some(Tick(1)));
        sched.drain_due(Tick(1));
        assert_eq!(sched.len(), 1);
    }
}
