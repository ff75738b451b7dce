//! Single-threaded queue of delayed tasks.
//!
//! The gadget never sleeps or spawns timers of its own. Every delayed
//! action (the next sample, the echo ring update, a topmost re-check,
//! the deferred position save) is a task in this queue, and the platform
//! layer arms exactly one OS timer for [`Scheduler::next_due`].
//!
//! Time is a [`Duration`] since an arbitrary origin chosen by the caller.
//! Tests drive the clock by hand; the Windows runtime feeds it
//! `Instant::elapsed()`.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

struct Entry<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Delayed-task queue with a manually advanced clock.
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    pending: BinaryHeap<Reverse<Entry<T>>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BinaryHeap::new(),
        }
    }

    /// The scheduler's notion of the current time.
    ///
    /// While tasks are being drained this is the due time of the task
    /// being handled, not the wall clock, so follow-up tasks land at exact
    /// offsets from their parent.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queues `task` to run `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, task: T) {
        self.schedule_at(self.now + delay, task);
    }

    /// Queues `task` at an absolute time. Tasks due at the same time run
    /// in the order they were queued.
    pub fn schedule_at(&mut self, due: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Reverse(Entry { due, seq, task }));
    }

    /// Removes and returns the earliest task due at or before `now`.
    ///
    /// Moves the clock to that task's due time. Returns `None` once no
    /// task is due; call [`Scheduler::advance_to`] afterwards to settle
    /// the clock at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<T> {
        let due = self.pending.peek()?.0.due;
        if due > now {
            return None;
        }
        let Reverse(entry) = self.pending.pop()?;
        self.now = self.now.max(entry.due);
        Some(entry.task)
    }

    /// Moves the clock forward to `now`. Never moves it backwards.
    pub fn advance_to(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.peek().map(|e| e.0.due)
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every pending task. Used when the window closes.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn tasks_come_out_in_due_order() {
        // Arrange
        let mut s = Scheduler::new();
        s.schedule(ms(300), "c");
        s.schedule(ms(100), "a");
        s.schedule(ms(200), "b");

        // Act
        let mut order = Vec::new();
        while let Some(t) = s.pop_due(ms(1000)) {
            order.push(t);
        }

        // Assert
        assert_eq!(order, ["a", "b", "c"]);
        assert!(s.is_empty());
    }

    #[test]
    fn equal_due_times_are_fifo() {
        // Arrange
        let mut s = Scheduler::new();
        for i in 0..5 {
            s.schedule(ms(50), i);
        }

        // Act
        let order: Vec<_> = std::iter::from_fn(|| s.pop_due(ms(50))).collect();

        // Assert
        assert_eq!(order, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn future_tasks_stay_queued() {
        // Arrange
        let mut s = Scheduler::new();
        s.schedule(ms(500), ());

        // Act / Assert
        assert!(s.pop_due(ms(499)).is_none());
        assert_eq!(s.next_due(), Some(ms(500)));
        assert!(s.pop_due(ms(500)).is_some());
    }

    #[test]
    fn clock_follows_task_due_time_while_draining() {
        // Arrange
        let mut s = Scheduler::new();
        s.schedule(ms(100), 1);

        // Act
        let first = s.pop_due(ms(900));
        s.schedule(ms(100), 2);

        // Assert
        assert_eq!(first, Some(1));
        assert_eq!(s.now(), ms(100));
        assert_eq!(s.next_due(), Some(ms(200)));
    }

    #[test]
    fn advance_never_moves_backwards() {
        // Arrange
        let mut s: Scheduler<()> = Scheduler::new();

        // Act
        s.advance_to(ms(1000));
        s.advance_to(ms(10));

        // Assert
        assert_eq!(s.now(), ms(1000));
    }
}
