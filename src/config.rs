//! Simulation configuration and validation.
//!
//! This module provides [`SimConfig`], the immutable parameter record a
//! simulation run is built from, and [`ConfigError`], the rejection type
//! returned when a configuration cannot be run.
//!
//! A configuration is validated exactly once, before any thread is spawned.
//! Everything that reaches the workers is therefore known-good, and the
//! counter and simulator never need to re-check their inputs.
//!
//! # Examples
//!
//! ```rust
//! use sciatto::config::SimConfig;
//!
//! let config = SimConfig::default()
//!     .with_workers(4)
//!     .with_sloppiness(5)
//!     .with_iterations(20);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.worker_count, 4);
//! ```

use thiserror::Error;

/// Error returned when a configuration is rejected.
///
/// Detected before any worker thread starts; a rejected configuration
/// spawns nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The run needs at least one worker.
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    /// A flush threshold below 1 can never be reached.
    #[error("sloppiness must be at least 1")]
    ZeroSloppiness,
}

/// Parameters for one simulation run.
///
/// Created once, validated once, then shared read-only with every worker
/// and the observer. The defaults match a small I/O-bound run:
///
/// | Field | Default |
/// |-------|---------|
/// | `worker_count` | 2 |
/// | `sloppiness` | 10 |
/// | `work_duration_ms` | 10 |
/// | `iterations_per_worker` | 100 |
/// | `cpu_bound` | false |
/// | `logging_enabled` | false |
/// | `seed` | `None` (derived from wall-clock time) |
///
/// # Examples
///
/// ```rust
/// use sciatto::config::{ConfigError, SimConfig};
///
/// let bad = SimConfig::default().with_workers(0);
/// assert_eq!(bad.validate(), Err(ConfigError::ZeroWorkers));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Number of worker threads to spawn.
    pub worker_count: usize,
    /// Batch size a worker accumulates locally before flushing to the
    /// shared total.
    pub sloppiness: u64,
    /// Nominal duration of one work unit, in milliseconds. Zero is a
    /// valid no-op duration.
    pub work_duration_ms: u64,
    /// Work units each worker completes before draining. Zero means the
    /// worker drains immediately.
    pub iterations_per_worker: u64,
    /// `true` selects the busy-computation workload, `false` the
    /// randomized-sleep workload.
    pub cpu_bound: bool,
    /// Whether the observer thread runs and emits progress records.
    pub logging_enabled: bool,
    /// Harness-level RNG seed for the sleep workload. `None` derives a
    /// seed from wall-clock time, so runs differ unless pinned.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            worker_count: 2,
            sloppiness: 10,
            work_duration_ms: 10,
            iterations_per_worker: 100,
            cpu_bound: false,
            logging_enabled: false,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Sets the number of workers, returning `self` for chaining.
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Sets the flush batch size, returning `self` for chaining.
    pub fn with_sloppiness(mut self, sloppiness: u64) -> Self {
        self.sloppiness = sloppiness;
        self
    }

    /// Sets the per-unit work duration in milliseconds.
    pub fn with_work_duration_ms(mut self, work_duration_ms: u64) -> Self {
        self.work_duration_ms = work_duration_ms;
        self
    }

    /// Sets the number of work units per worker.
    pub fn with_iterations(mut self, iterations_per_worker: u64) -> Self {
        self.iterations_per_worker = iterations_per_worker;
        self
    }

    /// Selects CPU-bound (`true`) or I/O-bound (`false`) work.
    pub fn with_cpu_bound(mut self, cpu_bound: bool) -> Self {
        self.cpu_bound = cpu_bound;
        self
    }

    /// Enables or disables the progress observer.
    pub fn with_logging(mut self, logging_enabled: bool) -> Self {
        self.logging_enabled = logging_enabled;
        self
    }

    /// Pins the harness RNG seed for reproducible sleep timing.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that the configuration can be run.
    ///
    /// Rejects `worker_count < 1` and `sloppiness < 1`. Must succeed
    /// before any thread is spawned; [`crate::harness::run`] calls this
    /// first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count < 1 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.sloppiness < 1 {
            return Err(ConfigError::ZeroSloppiness);
        }
        Ok(())
    }

    /// Total work units the run will complete once every worker drains.
    pub fn expected_total(&self) -> u64 {
        self.worker_count as u64 * self.iterations_per_worker
    }

    /// Interval between observer samples, in milliseconds.
    ///
    /// One tenth of the expected per-worker run time, so ten samples
    /// roughly span the run.
    pub fn observer_interval_ms(&self) -> u64 {
        self.work_duration_ms * self.iterations_per_worker / 10
    }
}
