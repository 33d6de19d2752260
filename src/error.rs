//! Error taxonomy of the measurement engine.
//!
//! Only two kinds of condition are fatal: statistical non-convergence
//! (the signal never stabilized, reported with the raw samples) and an
//! unresponsive external collaborator. Short batches and rejected
//! outliers are retried internally and never surface.

use thiserror::Error;

use crate::measurement::hot_loop::WorkloadError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything a measurement can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// The measured unit of work failed. The measurement is reported as
    /// failed, tagged with the workload's own kind and message.
    #[error("workload failed: {kind}: {message}")]
    Workload {
        /// The workload's error classification.
        kind: String,
        /// The workload's error message.
        message: String,
    },

    /// The workload signalled an unmet precondition. Reported as skipped,
    /// distinct from failure.
    #[error("assumption not met: {0}")]
    AssumptionNotMet(String),

    /// The reclamation listener missed the poll deadline. The external
    /// event source is broken, not merely slow.
    #[error("reclamation listener not responding")]
    UnresponsiveMeter,

    /// Resident-size sampling never stabilized. Both raw distributions
    /// are attached for diagnosis.
    #[error(
        "resident size did not stabilize after {} samples\n\
         without: {without:?}\n\
         with: {with:?}",
        .without.len() + .with.len()
    )]
    DidNotStabilize {
        /// Noise-only snapshot deltas, in collection order.
        without: Vec<i64>,
        /// Object-alive snapshot deltas, in collection order.
        with: Vec<i64>,
    },

    /// The allocation sample set stayed malformed after escalation.
    #[error("too much noise; could not sample allocations: {estimates:?}")]
    TooNoisy {
        /// The sorted per-round estimates that failed to agree.
        estimates: Vec<i64>,
    },

    /// An assertion judge verdict, carrying the suggested replacement
    /// predicate when one could be phrased.
    #[error("{0}")]
    AssertionFailed(String),
}

impl From<WorkloadError> for Error {
    fn from(err: WorkloadError) -> Self {
        match err {
            WorkloadError::Failed { kind, message } => Error::Workload { kind, message },
            WorkloadError::AssumptionNotMet(reason) => Error::AssumptionNotMet(reason),
        }
    }
}
