//! # microgauge
//!
//! Adaptive statistical measurement of time and memory per call.
//!
//! This crate measures two noisy physical quantities produced by
//! repeatedly executing a unit of work, elapsed time per call and bytes
//! allocated per call, and decides for itself how many repetitions and
//! samples are needed to report them at 99% confidence, while rejecting
//! samples contaminated by external interference (scheduling jitter,
//! background reclamation pauses).
//!
//! The measured code and the runtime's memory instrumentation stay
//! outside the crate: callers supply a [`HotLoop`] ("given N, return
//! elapsed nanoseconds for N invocations") and meters implementing the
//! [`measurement::meter`] contracts. Everything statistical lives here:
//! batch scaling, the trailing outlier model, retroactive sample
//! removal, and the convergence rule.
//!
//! ## Quick Start
//!
//! ```ignore
//! use microgauge::Gauge;
//!
//! let result = Gauge::new().measure(&mut hot_loop, &mut meter)?;
//! println!("{result}");   // e.g. "104 ns (±1.20 ns), 24B"
//! ```
//!
//! ## Memory assertions
//!
//! ```ignore
//! use microgauge::{assert_that_running, Bytes};
//!
//! assert_that_running(&mut meter, || build_small_thing())
//!     .allocates(Bytes::bytes(24))?;
//! ```
//!
//! Failing assertions escalate their sample counts (5 → 25 → 200) before
//! giving up, then suggest a predicate that would not be flaky.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod gauge;
mod result;

pub mod constants;
pub mod units;

// Functional modules
pub mod measurement;
pub mod memory;
pub mod output;
pub mod statistics;

// Re-exports for public API
pub use config::Config;
pub use error::{Error, Result};
pub use gauge::Gauge;
pub use measurement::{
    black_box, AllocationMeter, HotLoop, InterferenceMonitor, ReclamationEvent, ReclamationQueue,
    ReclamationSource, ResidentMeter, TimeSampler, Unmonitored, WorkloadError,
};
pub use memory::{assert_that_running, memory_consumption, object_size, MemoryAssertions};
pub use result::BenchmarkResult;
pub use units::{format_nanos, Bytes};
