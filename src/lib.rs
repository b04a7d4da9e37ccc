//! # Sciatto - Sloppy Counters Under Simulated Load
//!
//! A Rust library implementing the **sloppy counter** pattern - a shared
//! counter where each worker thread batches increments in a private,
//! cache-line-padded accumulator and flushes into the lock-guarded shared
//! total only every `sloppiness` units - together with a multi-threaded
//! harness that drives it under simulated CPU-bound or I/O-bound work and
//! reports progress.
//!
//! ## The Problem
//!
//! A single mutex-protected counter updated by many threads turns every
//! increment into a lock handoff. As thread count and update frequency
//! grow, the lock (and the cache line under it) becomes the bottleneck:
//! threads spend more time queuing for the counter than doing the work
//! being counted.
//!
//! ## The Solution: Sloppy Counting
//!
//! Count privately, publish in batches:
//!
//! ```text
//!                        ┌──────────────────────────────────────┐
//!                        │            SloppyCounter             │
//!                        ├──────────────────────────────────────┤
//!   Worker 0 ──record──► │ local[0] ████ (CachePadded)          │
//!   Worker 1 ──record──► │ local[1] ████ (CachePadded)          │
//!        ...             │    ...                               │
//!   Worker N ──record──► │ local[N] ████ (CachePadded)          │
//!                        │                                      │
//!                        │         one lock acquisition         │
//!                        │         per `sloppiness` units       │
//!                        │              ▼                       │
//!                        │      shared_total (Mutex)            │
//!                        └──────────────────────────────────────┘
//! ```
//!
//! The shared total lags reality by up to `sloppiness - 1` units per
//! worker while the run is in flight - that is the "sloppy" part - but
//! nothing is ever lost: each worker drains its remainder exactly once
//! before terminating, so the final total is exact.
//!
//! ## Quick Start
//!
//! ```rust
//! use sciatto::config::SimConfig;
//! use sciatto::harness;
//!
//! let config = SimConfig::default()
//!     .with_workers(4)
//!     .with_sloppiness(5)
//!     .with_work_duration_ms(0)
//!     .with_iterations(20)
//!     .with_seed(42);
//!
//! let report = harness::run(&config).unwrap();
//! assert_eq!(report.final_total, 80); // 4 workers x 20 units, exactly
//! ```
//!
//! Or drive the primitive directly:
//!
//! ```rust
//! use sciatto::sloppy::SloppyCounter;
//! use std::thread;
//!
//! let counter = SloppyCounter::new(4, 10);
//!
//! thread::scope(|s| {
//!     for id in 0..4 {
//!         let counter = &counter;
//!         s.spawn(move || {
//!             for _ in 0..25 {
//!                 counter.record_unit(id);
//!             }
//!             counter.flush_remainder(id);
//!         });
//!     }
//! });
//!
//! assert_eq!(counter.shared_total(), 100);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`sloppy`] | The counter primitive: batched slots, flush protocol, snapshots |
//! | [`config`] | Run parameters, defaults, validation |
//! | [`work`] | Simulated work units (busy spin or randomized sleep) |
//! | [`worker`] | The per-thread run/drain loop |
//! | [`observer`] | Periodic advisory progress sampling |
//! | [`harness`] | Spawn, join, and final reporting |
//!
//! ## Guarantees
//!
//! - **Conservation**: at every instant, shared total plus the sum of all
//!   local accumulators equals the number of units recorded so far.
//! - **Exact final total**: after all workers terminate, the shared total
//!   equals `worker_count x iterations_per_worker`.
//! - **Bounded contention**: a worker takes the lock at most once per
//!   `sloppiness` completed units, plus once while draining.
//!
//! The shared total is *not* updated in real time; mid-run reads are
//! advisory by design.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serde derives on snapshots, records, and reports |
//! | `json` | [`render::JsonRenderer`] via `serde_json` |
//! | `table` | [`render::TableRenderer`] via `tabled` |
//! | `full` | `table` + `json` |
//! | `demo` | Everything plus the `sloppy_sim` CLI example |

pub mod config;
pub mod harness;
pub mod observer;
pub mod sloppy;
pub mod work;
pub mod worker;

#[cfg(any(feature = "table", feature = "json"))]
pub mod render;
