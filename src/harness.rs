//! Run orchestration: spawn, observe, join, report.
//!
//! [`run`] (and [`run_with_sink`], when progress records are wanted)
//! validates the configuration, builds one [`SloppyCounter`] sized for
//! the worker count, spawns the workers on named scoped threads, runs the
//! observer if logging is enabled, joins everything, and reports the
//! final total — which is exact: every worker drains its remainder before
//! terminating, so the total equals `worker_count x iterations_per_worker`.
//!
//! Failure is clean or not at all. A rejected configuration spawns
//! nothing. If thread creation fails mid-spawn, the workers that did
//! start still run to completion and are joined, but no total is
//! reported; the caller gets [`SimError::Spawn`] instead of a misleading
//! partial result.

use std::io;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, SimConfig};
use crate::observer::{Observer, ProgressRecord};
use crate::sloppy::SloppyCounter;
use crate::worker::Worker;

/// Why a run produced no total.
#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration was rejected before any thread started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The host refused to create a worker thread. Already-started
    /// workers were joined; the run is aborted without a total.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
}

/// The single final record of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimReport {
    /// Exact count of work units completed across all workers.
    pub final_total: u64,
    /// Wall-clock duration of the run, in milliseconds.
    pub elapsed_ms: u64,
}

/// Runs a simulation to completion, discarding progress records.
pub fn run(config: &SimConfig) -> Result<SimReport, SimError> {
    run_with_sink(config, |_| {})
}

/// Runs a simulation to completion, pushing each observer sample into
/// `sink`.
///
/// The sink is called from the observer thread, at most ten times, and
/// only when `config.logging_enabled` is set. After the function returns
/// no thread of the run remains alive.
pub fn run_with_sink<F>(config: &SimConfig, sink: F) -> Result<SimReport, SimError>
where
    F: FnMut(ProgressRecord) + Send,
{
    config.validate()?;

    let seed = config.seed.unwrap_or_else(clock_seed);
    let counter = SloppyCounter::new(config.worker_count, config.sloppiness);
    let start = Instant::now();
    debug!(
        workers = config.worker_count,
        sloppiness = config.sloppiness,
        seed,
        "starting run"
    );

    let mut spawn_failure = None;
    thread::scope(|s| {
        for id in 0..config.worker_count {
            let worker = Worker::new(id, config, seed);
            let counter = &counter;
            let spawned = thread::Builder::new()
                .name(format!("sloppy-worker-{id}"))
                .spawn_scoped(s, move || worker.run(counter));
            if let Err(err) = spawned {
                spawn_failure = Some(err);
                break;
            }
        }

        // Only once every worker is actually up; a partial run emits no
        // progress and reports no total.
        if spawn_failure.is_none() && config.logging_enabled {
            let observer = Observer::new(config.observer_interval_ms());
            let counter = &counter;
            s.spawn(move || observer.run(counter, sink));
        }

        // Scope exit joins every spawned worker and the observer.
    });

    if let Some(err) = spawn_failure {
        return Err(SimError::Spawn(err));
    }

    let final_total = counter.shared_total();
    let elapsed = start.elapsed();
    info!(final_total, elapsed_ms = elapsed.as_millis() as u64, "run complete");
    Ok(SimReport {
        final_total,
        elapsed_ms: elapsed.as_millis() as u64,
    })
}

/// Wall-clock fallback seed for runs that did not pin one.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_config() -> SimConfig {
        SimConfig::default().with_work_duration_ms(0).with_seed(42)
    }

    #[test]
    fn test_final_total_is_exact() {
        let config = instant_config()
            .with_workers(4)
            .with_sloppiness(5)
            .with_iterations(20);
        let report = run(&config).unwrap();
        assert_eq!(report.final_total, 80);
    }

    #[test]
    fn test_remainder_flush_reaches_total() {
        // sloppiness 7 over 10 iterations: one threshold flush plus a
        // remainder of 3 per worker.
        let config = instant_config()
            .with_workers(3)
            .with_sloppiness(7)
            .with_iterations(10);
        let report = run(&config).unwrap();
        assert_eq!(report.final_total, 30);
    }

    #[test]
    fn test_sloppiness_one() {
        let config = instant_config()
            .with_workers(2)
            .with_sloppiness(1)
            .with_iterations(25);
        let report = run(&config).unwrap();
        assert_eq!(report.final_total, 50);
    }

    #[test]
    fn test_sloppiness_above_iterations() {
        // Threshold never reached; everything arrives via the drain.
        let config = instant_config()
            .with_workers(2)
            .with_sloppiness(1_000)
            .with_iterations(9);
        let report = run(&config).unwrap();
        assert_eq!(report.final_total, 18);
    }

    #[test]
    fn test_cpu_bound_run() {
        let config = instant_config()
            .with_workers(2)
            .with_iterations(10)
            .with_cpu_bound(true);
        let report = run(&config).unwrap();
        assert_eq!(report.final_total, 20);
    }

    #[test]
    fn test_rejected_config_spawns_nothing() {
        let config = SimConfig::default().with_workers(0);
        match run(&config) {
            Err(SimError::Config(ConfigError::ZeroWorkers)) => {}
            other => panic!("expected config rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_sloppiness_rejected() {
        let config = SimConfig::default().with_sloppiness(0);
        assert!(matches!(
            run(&config),
            Err(SimError::Config(ConfigError::ZeroSloppiness))
        ));
    }

    #[test]
    fn test_no_records_when_logging_disabled() {
        let config = instant_config().with_iterations(5);
        let mut records = Vec::new();
        run_with_sink(&config, |r| records.push(r)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_ten_records_when_logging_enabled() {
        let config = instant_config().with_iterations(5).with_logging(true);
        let mut records = Vec::new();
        run_with_sink(&config, |r| records.push(r)).unwrap();
        assert_eq!(records.len(), 10);
        for pair in records.windows(2) {
            assert!(pair[0].elapsed_ms <= pair[1].elapsed_ms);
            assert!(pair[0].shared_total <= pair[1].shared_total);
        }
    }

    #[test]
    fn test_zero_iterations_run() {
        let config = instant_config().with_iterations(0);
        let report = run(&config).unwrap();
        assert_eq!(report.final_total, 0);
    }

    #[test]
    fn test_error_display() {
        let err = SimError::Config(ConfigError::ZeroWorkers);
        assert_eq!(
            err.to_string(),
            "invalid configuration: worker count must be at least 1"
        );
    }
}
