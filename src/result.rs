//! Measurement report types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::{format_nanos, Bytes};

/// Resolved outcome of one adaptive measurement.
///
/// Times are nanoseconds per call; the confidence half-width is the
/// sample standard deviation scaled to 99%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Mean elapsed time per call.
    pub mean_ns: f64,

    /// Half-width of the 99% confidence interval around the mean.
    pub confidence_99_ns: f64,

    /// Sample standard deviation of the accepted timing samples.
    pub std_dev_ns: f64,

    /// Accepted timing samples, net of retroactive outlier removal.
    pub timing_samples: usize,

    /// Completed memory sampling turns.
    pub memory_samples: usize,

    /// Estimated bytes allocated per call.
    pub bytes_per_call: f64,

    /// Final hot-loop batch size.
    pub iterations_per_batch: u64,
}

impl BenchmarkResult {
    /// The allocation estimate as a byte quantity.
    pub fn bytes(&self) -> Bytes {
        Bytes::bytes(self.bytes_per_call.max(0.0) as u64)
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (±{}), {}",
            format_nanos(self.mean_ns),
            format_nanos(self.confidence_99_ns),
            self.bytes()
        )
    }
}
