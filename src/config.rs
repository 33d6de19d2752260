//! Configuration for adaptive measurement.

use std::time::Duration;

/// Tunable knobs for [`Gauge`](crate::Gauge).
///
/// The statistical machinery itself (confidence z-score, outlier window
/// and rejection threshold, EWMA weight) is fixed in [`crate::constants`]
/// and deliberately not configurable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum wall time the whole measurement must cover before the
    /// sampler may stop (default: zero, i.e. no floor).
    pub min_total_time: Duration,

    /// Minimum accepted timing samples before the sampler may stop
    /// (default: 5).
    pub min_samples: usize,

    /// Batches shorter than this are discarded and the batch plan grown;
    /// they never count as samples (default: 50 ms).
    pub min_batch_duration: Duration,

    /// Target relative error of the mean at 99% confidence
    /// (default: 0.01).
    pub target_relative_error: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_total_time: Duration::ZERO,
            min_samples: 5,
            min_batch_duration: Duration::from_millis(50),
            target_relative_error: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.min_total_time, Duration::ZERO);
        assert_eq!(config.min_samples, 5);
        assert_eq!(config.min_batch_duration, Duration::from_millis(50));
        assert_eq!(config.target_relative_error, 0.01);
    }
}
