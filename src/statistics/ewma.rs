//! Exponentially-weighted trailing statistics for outlier classification.
//!
//! The model keeps a decayed mean and mean-of-squares over accepted
//! samples, alongside a decayed "effective count" that converges toward 1
//! rather than growing without bound. Old evidence is deliberately
//! discounted: a sample is judged against what the stream has looked like
//! recently, not since the beginning of time.

use crate::constants::{EWMA_WEIGHT, OUTLIER_SD_THRESHOLD};

/// Trailing mean/variance estimate with a decayed effective sample count.
///
/// The effective count is a float, not an integer: it is the normalizer
/// of the decayed accumulators, and modelling it as a count invites
/// off-by-one bias-correction errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct EwmaStats {
    effective_count: f64,
    ewma: f64,
    ewma_of_squares: f64,
}

impl EwmaStats {
    /// A fresh estimate with no evidence folded in.
    pub fn new() -> Self {
        Self::default()
    }

    /// A trailing estimate over `values`, oldest first, as if each had
    /// been folded in order.
    pub fn over(values: &[f64]) -> Self {
        let mut stats = Self::new();
        for &value in values {
            stats.update(value);
        }
        stats
    }

    /// Fold an accepted sample into the trailing estimate.
    pub fn update(&mut self, value: f64) {
        self.effective_count = decay(self.effective_count, 1.0);
        self.ewma = decay(self.ewma, value);
        self.ewma_of_squares = decay(self.ewma_of_squares, value * value);
    }

    /// The trailing mean.
    pub fn trailing_mean(&self) -> f64 {
        self.ewma / self.effective_count
    }

    /// Classify `value` against the trailing estimate.
    ///
    /// `samples` is the number of values actually folded into this
    /// estimate; it drives the bias correction of the trailing variance.
    pub fn is_outlier(&self, value: f64, samples: usize) -> bool {
        classify(
            value,
            self.ewma / self.effective_count,
            self.ewma_of_squares / self.effective_count,
            samples,
        )
    }
}

fn decay(state: f64, value: f64) -> f64 {
    EWMA_WEIGHT * value + (1.0 - EWMA_WEIGHT) * state
}

/// Discard samples more than three standard deviations above the mean of
/// the trailing readings.
///
/// About 99.7% of points lie within this range under a roughly normal
/// noise model, so values above it are attributed to external pauses
/// rather than the measured work. Unusually fast samples are never
/// rejected.
fn classify(value: f64, mean: f64, mean_of_squares: f64, samples: usize) -> bool {
    let n = samples as f64;
    let trailing_sd = ((mean_of_squares - mean * mean) * n / (n - 1.0)).sqrt();
    value > mean + trailing_sd * OUTLIER_SD_THRESHOLD
}
