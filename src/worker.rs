//! Worker thread bodies.
//!
//! A [`Worker`] is the loop a spawned thread runs: complete a fixed number
//! of simulated work units, record each one on the shared
//! [`SloppyCounter`], then drain the leftover batch exactly once before
//! the thread ends.
//!
//! The lifecycle is Created -> Running -> Draining -> Terminated, and it
//! is enforced by ownership: [`Worker::run`] consumes the worker, the
//! drain flush sits on the single exit path of the loop, and once `run`
//! returns there is no value left to touch the counter with.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::debug;

use crate::config::SimConfig;
use crate::sloppy::SloppyCounter;
use crate::work::perform_unit;

/// One worker's parameters, fixed at spawn time.
///
/// The RNG is owned by the worker and seeded from the harness seed plus
/// the worker index, so two runs with the same seed draw the same I/O
/// delays.
pub struct Worker {
    id: usize,
    iterations: u64,
    work_duration_ms: u64,
    cpu_bound: bool,
    rng: SmallRng,
}

impl Worker {
    /// Builds the worker with index `id` for a validated configuration.
    pub fn new(id: usize, config: &SimConfig, harness_seed: u64) -> Self {
        Worker {
            id,
            iterations: config.iterations_per_worker,
            work_duration_ms: config.work_duration_ms,
            cpu_bound: config.cpu_bound,
            rng: SmallRng::seed_from_u64(mix_seed(harness_seed, id)),
        }
    }

    /// The worker's index, also its slot in the counter.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Runs the worker to completion.
    ///
    /// Performs `iterations` units, recording each on `counter`, then
    /// drains the remainder. Consumes `self`: a terminated worker cannot
    /// interact with the counter again.
    pub fn run(mut self, counter: &SloppyCounter) {
        debug!(worker = self.id, iterations = self.iterations, "worker started");
        for _ in 0..self.iterations {
            perform_unit(self.cpu_bound, self.work_duration_ms, &mut self.rng);
            counter.record_unit(self.id);
        }
        counter.flush_remainder(self.id);
        debug!(worker = self.id, "worker drained and terminated");
    }
}

/// Derives a per-worker seed from the harness seed and worker index.
///
/// SplitMix64 finalizer over `seed + id`, so adjacent worker indices do
/// not produce correlated generator states.
fn mix_seed(harness_seed: u64, worker_id: usize) -> u64 {
    let mut z = harness_seed
        .wrapping_add(worker_id as u64)
        .wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
