//! Periodic progress observation.
//!
//! When logging is enabled the harness runs one [`Observer`] alongside the
//! workers. It sleeps for a tenth of the expected run time, snapshots the
//! counter, and hands a [`ProgressRecord`] to a caller-supplied sink; ten
//! samples roughly span the run.
//!
//! The observer is read-only and advisory. It takes the counter lock only
//! for the instant of a snapshot, so it never blocks workers in any
//! meaningful way, and the per-worker values it reports may be stale.

use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::sloppy::{CounterSnapshot, SloppyCounter};

/// Samples per observer run, spread across the expected run time.
const SAMPLES: u32 = 10;

/// One periodic progress sample.
///
/// `shared_total` is exact as of the sample; `local` is the advisory
/// per-worker view from [`SloppyCounter::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressRecord {
    /// Milliseconds since the observer started.
    pub elapsed_ms: u64,
    /// The flushed shared total.
    pub shared_total: u64,
    /// Advisory unflushed per-worker accumulators.
    pub local: Vec<u64>,
}

impl ProgressRecord {
    /// Builds a record from a snapshot taken `elapsed` after run start.
    pub fn new(elapsed: Duration, snapshot: CounterSnapshot) -> Self {
        ProgressRecord {
            elapsed_ms: elapsed.as_millis() as u64,
            shared_total: snapshot.shared_total,
            local: snapshot.local,
        }
    }
}

/// The progress-sampling loop.
///
/// Constructed by the harness with the interval derived from the
/// configuration; [`Observer::run`] performs the fixed number of samples
/// and returns. The observer holds no reference to worker state and needs
/// no cancellation: it finishes on its own shortly after the expected run
/// time.
pub struct Observer {
    interval: Duration,
}

impl Observer {
    /// Creates an observer sampling every `interval_ms` milliseconds.
    pub fn new(interval_ms: u64) -> Self {
        Observer {
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// Sleeps and samples ten times, pushing each record into `sink`.
    pub fn run<F>(&self, counter: &SloppyCounter, mut sink: F)
    where
        F: FnMut(ProgressRecord),
    {
        let start = Instant::now();
        for sample in 0..SAMPLES {
            thread::sleep(self.interval);
            let record = ProgressRecord::new(start.elapsed(), counter.snapshot());
            trace!(sample, total = record.shared_total, "progress sample");
            sink(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emits_fixed_number_of_records() {
        let counter = SloppyCounter::new(2, 10);
        let mut records = Vec::new();
        Observer::new(0).run(&counter, |r| records.push(r));
        assert_eq!(records.len(), SAMPLES as usize);
    }

    #[test]
    fn test_elapsed_is_non_decreasing() {
        let counter = SloppyCounter::new(1, 1);
        let mut records = Vec::new();
        Observer::new(1).run(&counter, |r| records.push(r));
        for pair in records.windows(2) {
            assert!(pair[0].elapsed_ms <= pair[1].elapsed_ms);
        }
    }

    #[test]
    fn test_record_reflects_counter_state() {
        let counter = SloppyCounter::new(2, 10);
        counter.record_unit(0);
        counter.record_unit(0);
        let mut last = None;
        Observer::new(0).run(&counter, |r| last = Some(r));

        let record = last.unwrap();
        assert_eq!(record.shared_total, 0);
        assert_eq!(record.local, vec![2, 0]);
    }

    #[test]
    fn test_record_new_converts_elapsed() {
        let snap = CounterSnapshot {
            shared_total: 7,
            local: vec![1, 2],
        };
        let record = ProgressRecord::new(Duration::from_millis(1500), snap);
        assert_eq!(record.elapsed_ms, 1500);
        assert_eq!(record.shared_total, 7);
        assert_eq!(record.local, vec![1, 2]);
    }
}
