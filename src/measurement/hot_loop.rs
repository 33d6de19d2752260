//! Hot-loop provider contract.
//!
//! The engine never runs the measured code directly: it asks a hot loop
//! to execute the unit of work N times back-to-back and report elapsed
//! nanoseconds for the whole batch. Producing that loop, and isolating
//! the measured code from cross-benchmark interference, is the
//! provider's job; the engine only consumes the "given N, return elapsed
//! nanoseconds" contract.

use std::hint::black_box as std_black_box;

use thiserror::Error;

/// Signals a workload can raise instead of an elapsed-time reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkloadError {
    /// The measured code failed. Reported as the measurement's failure,
    /// tagged with the workload's own classification and message.
    #[error("{kind}: {message}")]
    Failed {
        /// The workload's error classification.
        kind: String,
        /// The workload's error message.
        message: String,
    },

    /// A precondition of the measured code did not hold. Reported as
    /// skipped, not failed.
    #[error("assumption not met: {0}")]
    AssumptionNotMet(String),
}

/// A hot loop executes the unit of work `iterations` times back-to-back
/// and reports elapsed nanoseconds for the batch.
///
/// Implementations must return or consume a value derived from the work
/// performed (route it through [`black_box`]) so the loop body cannot
/// be eliminated as dead code.
///
/// Any closure `FnMut(u64) -> Result<u64, WorkloadError>` is a hot loop.
pub trait HotLoop {
    /// Run `iterations` invocations, returning elapsed nanoseconds for
    /// the whole batch.
    fn run(&mut self, iterations: u64) -> Result<u64, WorkloadError>;
}

impl<F> HotLoop for F
where
    F: FnMut(u64) -> Result<u64, WorkloadError>,
{
    fn run(&mut self, iterations: u64) -> Result<u64, WorkloadError> {
        self(iterations)
    }
}

/// Wrapper around `std::hint::black_box` for preventing compiler
/// optimizations.
///
/// Hot loops and memory workloads should route their results through
/// this so the compiler cannot optimize the measured computation away or
/// reorder it relative to the surrounding bookkeeping.
#[inline]
pub fn black_box<T>(x: T) -> T {
    std_black_box(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_hot_loops() {
        let mut calls = 0u64;
        let mut loop_fn = |iterations: u64| {
            calls += iterations;
            Ok(iterations * 10)
        };
        assert_eq!(loop_fn.run(3), Ok(30));
        assert_eq!(loop_fn.run(4), Ok(40));
        assert_eq!(calls, 7);
    }

    #[test]
    fn workload_errors_render_their_own_message() {
        let failed = WorkloadError::Failed {
            kind: "Panic".to_string(),
            message: "index out of bounds".to_string(),
        };
        assert_eq!(failed.to_string(), "Panic: index out of bounds");

        let skipped = WorkloadError::AssumptionNotMet("needs >1 core".to_string());
        assert_eq!(skipped.to_string(), "assumption not met: needs >1 core");
    }
}
