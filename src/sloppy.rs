//! The sloppy counter primitive.
//!
//! This module provides [`SloppyCounter`], a counter where each worker
//! accumulates increments in a private cache-line-padded slot and flushes
//! the batch into a lock-guarded shared total only every `sloppiness`
//! units.
//!
//! # The Problem
//!
//! A naive shared counter makes every increment fight over one mutex (or
//! one cache line, for a single atomic). With many threads incrementing at
//! high frequency, lock traffic dominates the work being counted.
//!
//! # The Solution
//!
//! Batch locally, flush rarely:
//!
//! ```text
//!                      ┌──────────────────────────────────────┐
//!                      │            SloppyCounter             │
//!                      ├──────────────────────────────────────┤
//!  Worker 0 ─record──► │ local[0] ████ (CachePadded)          │
//!  Worker 1 ─record──► │ local[1] ████ (CachePadded)          │
//!       ...            │   ...                                │
//!  Worker N ─record──► │ local[N] ████ (CachePadded)          │
//!                      │                                      │
//!                      │   every `sloppiness` units:          │
//!                      │   lock ──► shared_total += batch     │
//!                      └──────────────────────────────────────┘
//! ```
//!
//! Each worker touches the lock at most once per `sloppiness` completed
//! units, trading real-time visibility of the total for reduced
//! contention. The trade is *sloppy*, not lossy: once every worker has
//! drained its remainder, the shared total is exact.
//!
//! # Conservation
//!
//! At every instant, `shared_total + Σ local[i]` equals the number of
//! units recorded so far. A flush moves a batch from a slot to the total
//! in one motion (the slot is swapped to zero only while the lock is
//! held), so no unit is ever double-counted or dropped.
//!
//! # Quick Start
//!
//! ```rust
//! use sciatto::sloppy::SloppyCounter;
//!
//! let counter = SloppyCounter::new(2, 3);
//!
//! counter.record_unit(0);
//! counter.record_unit(0);
//! assert_eq!(counter.snapshot().shared_total, 0); // still batching
//!
//! counter.record_unit(0); // third unit hits the threshold
//! assert_eq!(counter.snapshot().shared_total, 3);
//!
//! counter.record_unit(1);
//! counter.flush_remainder(1); // drain the leftover unit
//! assert_eq!(counter.snapshot().shared_total, 4);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crossbeam_utils::CachePadded;
use std::fmt::Debug;

/// A point-in-time read of the counter state.
///
/// `shared_total` is read under the counter's lock and is exact as of the
/// moment the lock was held. The `local` values are read without
/// synchronization against their writers and are advisory: suitable for
/// progress display, never for correctness decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterSnapshot {
    /// The flushed total at the moment of the snapshot.
    pub shared_total: u64,
    /// Advisory copy of every worker's unflushed accumulator.
    pub local: Vec<u64>,
}

impl CounterSnapshot {
    /// Sum of the shared total and every advisory local value.
    ///
    /// Exact only when no worker is mid-record; used for display.
    pub fn approximate_total(&self) -> u64 {
        self.shared_total + self.local.iter().sum::<u64>()
    }
}

/// A batched counter shared by a fixed set of workers.
///
/// Sized at construction for `worker_count` slots. Each slot is written
/// only by its owning worker; the shared total is mutated only under the
/// internal lock. See the [module docs](self) for the protocol.
///
/// Shareable across threads by reference (`&SloppyCounter` is `Sync`);
/// the worker id passed to [`record_unit`](Self::record_unit) selects the
/// slot.
pub struct SloppyCounter {
    sloppiness: u64,
    shared_total: Mutex<u64>,
    local: Box<[CachePadded<AtomicU64>]>,
}

impl SloppyCounter {
    /// Creates a counter with one local slot per worker.
    ///
    /// `sloppiness` is the batch size at which a slot is flushed into the
    /// shared total. Callers validate `worker_count >= 1` and
    /// `sloppiness >= 1` up front (see [`crate::config::SimConfig`]);
    /// a `sloppiness` of 1 degenerates to a plain contended counter.
    pub fn new(worker_count: usize, sloppiness: u64) -> Self {
        let local = (0..worker_count)
            .map(|_| CachePadded::new(AtomicU64::new(0)))
            .collect();
        SloppyCounter {
            sloppiness,
            shared_total: Mutex::new(0),
            local,
        }
    }

    /// Number of local slots (the worker count this counter was sized for).
    pub fn worker_count(&self) -> usize {
        self.local.len()
    }

    /// The flush threshold this counter was built with.
    pub fn sloppiness(&self) -> u64 {
        self.sloppiness
    }

    /// Records one completed work unit for `worker_id`.
    ///
    /// Increments the worker's private slot without taking the lock. When
    /// the slot reaches the sloppiness threshold the whole batch is moved
    /// into the shared total under the lock and the slot resets to zero.
    ///
    /// Must be called only by the thread that owns `worker_id`; slots are
    /// single-writer.
    ///
    /// # Panics
    ///
    /// Panics if `worker_id` is out of range for this counter.
    #[inline]
    pub fn record_unit(&self, worker_id: usize) {
        let slot = &self.local[worker_id];
        let new = slot.fetch_add(1, Ordering::Relaxed) + 1;
        if new >= self.sloppiness {
            self.flush_slot(slot);
        }
    }

    /// Drains whatever remains in `worker_id`'s slot into the shared total.
    ///
    /// Called once as a worker terminates, after its last
    /// [`record_unit`](Self::record_unit). Skipping it would strand the
    /// remainder and permanently under-report the total. A no-op (the
    /// lock is not even taken) when the slot is already zero, so calling
    /// it again is harmless.
    ///
    /// # Panics
    ///
    /// Panics if `worker_id` is out of range for this counter.
    pub fn flush_remainder(&self, worker_id: usize) {
        let slot = &self.local[worker_id];
        if slot.load(Ordering::Relaxed) > 0 {
            self.flush_slot(slot);
        }
    }

    /// Moves a slot's batch into the shared total.
    ///
    /// The swap happens while the lock is held, so a concurrent snapshot
    /// never sees the batch in both places.
    fn flush_slot(&self, slot: &AtomicU64) {
        let mut total = self
            .shared_total
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let batch = slot.swap(0, Ordering::Relaxed);
        *total += batch;
    }

    /// Takes a [`CounterSnapshot`] of the current state.
    ///
    /// The shared total is read under the lock; the local copies are
    /// relaxed reads racing with their owners and may be stale.
    pub fn snapshot(&self) -> CounterSnapshot {
        let shared_total = *self
            .shared_total
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let local = self
            .local
            .iter()
            .map(|slot| slot.load(Ordering::Relaxed))
            .collect();
        CounterSnapshot {
            shared_total,
            local,
        }
    }

    /// Reads the shared total alone, under the lock.
    ///
    /// After every worker has drained, this is the exact count of all
    /// completed work units.
    pub fn shared_total(&self) -> u64 {
        *self
            .shared_total
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for SloppyCounter {
    /// Formats as `SloppyCounter{ total [id]:pending ... }`, showing only
    /// slots with unflushed units.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SloppyCounter{{ {}", self.shared_total())?;
        for (i, slot) in self.local.iter().enumerate() {
            let pending = slot.load(Ordering::Relaxed);
            if pending != 0 {
                write!(f, " [{i}]:{pending}")?;
            }
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_is_zero() {
        let counter = SloppyCounter::new(3, 10);
        assert_eq!(counter.worker_count(), 3);
        assert_eq!(counter.sloppiness(), 10);
        assert_eq!(counter.shared_total(), 0);
        assert_eq!(counter.snapshot().local, vec![0, 0, 0]);
    }

    #[test]
    fn test_record_below_threshold_stays_local() {
        let counter = SloppyCounter::new(1, 5);
        for _ in 0..4 {
            counter.record_unit(0);
        }
        let snap = counter.snapshot();
        assert_eq!(snap.shared_total, 0);
        assert_eq!(snap.local, vec![4]);
    }

    #[test]
    fn test_threshold_flushes_whole_batch() {
        let counter = SloppyCounter::new(1, 5);
        for _ in 0..5 {
            counter.record_unit(0);
        }
        let snap = counter.snapshot();
        assert_eq!(snap.shared_total, 5);
        assert_eq!(snap.local, vec![0]);
    }

    #[test]
    fn test_sloppiness_one_flushes_every_unit() {
        let counter = SloppyCounter::new(1, 1);
        for n in 1..=10 {
            counter.record_unit(0);
            assert_eq!(counter.shared_total(), n);
        }
    }

    #[test]
    fn test_flush_remainder_drains_slot() {
        let counter = SloppyCounter::new(2, 10);
        for _ in 0..3 {
            counter.record_unit(1);
        }
        counter.flush_remainder(1);
        let snap = counter.snapshot();
        assert_eq!(snap.shared_total, 3);
        assert_eq!(snap.local, vec![0, 0]);
    }

    #[test]
    fn test_flush_remainder_on_empty_slot_is_noop() {
        let counter = SloppyCounter::new(1, 10);
        counter.flush_remainder(0);
        assert_eq!(counter.shared_total(), 0);

        // Draining twice is also harmless.
        counter.record_unit(0);
        counter.flush_remainder(0);
        counter.flush_remainder(0);
        assert_eq!(counter.shared_total(), 1);
    }

    #[test]
    fn test_conservation_while_recording() {
        let counter = SloppyCounter::new(2, 7);
        let mut recorded = 0u64;
        for i in 0..25 {
            counter.record_unit(i % 2);
            recorded += 1;
            let snap = counter.snapshot();
            assert_eq!(snap.approximate_total(), recorded);
        }
    }

    #[test]
    fn test_workers_do_not_share_slots() {
        let counter = SloppyCounter::new(3, 100);
        counter.record_unit(0);
        counter.record_unit(2);
        counter.record_unit(2);
        assert_eq!(counter.snapshot().local, vec![1, 0, 2]);
    }

    #[test]
    fn test_concurrent_conservation() {
        const WORKERS: usize = 4;
        const UNITS: u64 = 1_000;

        let counter = SloppyCounter::new(WORKERS, 13);
        thread::scope(|s| {
            for id in 0..WORKERS {
                let counter = &counter;
                s.spawn(move || {
                    for _ in 0..UNITS {
                        counter.record_unit(id);
                    }
                    counter.flush_remainder(id);
                });
            }
        });
        assert_eq!(counter.shared_total(), WORKERS as u64 * UNITS);
    }

    #[test]
    fn test_snapshot_totals_are_monotone() {
        let counter = SloppyCounter::new(2, 3);
        let mut last = 0;
        for i in 0..20 {
            counter.record_unit(i % 2);
            let total = counter.shared_total();
            assert!(total >= last);
            last = total;
        }
    }

    #[test]
    fn test_debug_shows_pending_slots() {
        let counter = SloppyCounter::new(2, 10);
        counter.record_unit(1);
        counter.record_unit(1);
        let debug_str = format!("{:?}", counter);
        assert!(debug_str.starts_with("SloppyCounter{"));
        assert!(debug_str.contains("[1]:2"));
        assert!(!debug_str.contains("[0]:"));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_worker_panics() {
        let counter = SloppyCounter::new(1, 10);
        counter.record_unit(1);
    }
}
