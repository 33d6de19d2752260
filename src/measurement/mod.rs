//! Measurement infrastructure: the adaptive sampler and the contracts it
//! consumes.
//!
//! This module provides:
//! - The hot-loop provider contract and workload failure signals
//! - Meter contracts for the allocation, resident-size, and reclamation
//!   collaborators
//! - The engine-side reclamation queue with its hard poll deadline
//! - Interference monitoring hooks
//! - The adaptive time sampler itself

pub mod hot_loop;
pub mod meter;
mod reclamation;
mod sampler;

pub mod monitor;

pub use hot_loop::{black_box, HotLoop, WorkloadError};
pub use meter::{AllocationMeter, ReclamationEvent, ReclamationSource, ResidentMeter};
pub use monitor::{InterferenceMonitor, Unmonitored};
pub use reclamation::ReclamationQueue;
pub use sampler::TimeSampler;
