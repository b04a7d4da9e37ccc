//! Simulated work units.
//!
//! One call to [`perform_unit`] completes one abstract unit of work by
//! consuming roughly `duration_ms` of wall-clock time, in one of two
//! shapes:
//!
//! - **CPU-bound**: a deterministic busy computation whose iteration
//!   count scales linearly with the duration. No sleeping, no allocation,
//!   no randomness.
//! - **I/O-bound**: a sleep drawn uniformly from `[0.5x, 1.5x]` the
//!   nominal duration, modeling variable-latency I/O. The caller supplies
//!   the generator, so timing is reproducible under a pinned seed.
//!
//! The simulator touches no shared state and cannot fail; a duration of
//! zero returns immediately.

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::Rng;

/// Spin iterations per simulated millisecond of CPU-bound work.
///
/// A crude linear proxy for CPU work, deliberately so: the point is a
/// workload that occupies a core, not an accurate clock.
const SPINS_PER_MS: u64 = 1_000_000;

/// Completes one work unit, blocking the caller for roughly `duration_ms`.
///
/// See the [module docs](self) for the two workload shapes. The generator
/// is only consulted on the I/O-bound path.
pub fn perform_unit(cpu_bound: bool, duration_ms: u64, rng: &mut SmallRng) {
    if cpu_bound {
        busy_spin(duration_ms);
    } else {
        thread::sleep(io_delay(duration_ms, rng));
    }
}

/// Busy computation scaled linearly by `duration_ms`.
fn busy_spin(duration_ms: u64) {
    for i in 0..duration_ms.saturating_mul(SPINS_PER_MS) {
        black_box(i);
    }
}

/// Draws an I/O delay uniform in `[0.5, 1.5]` times the nominal duration.
///
/// Microsecond granularity, so short durations still vary: 1 ms nominal
/// yields 500..=1500 us.
fn io_delay(duration_ms: u64, rng: &mut SmallRng) -> Duration {
    let lo = duration_ms * 500;
    let hi = duration_ms * 1500;
    Duration::from_micros(rng.gen_range(lo..=hi))
}
