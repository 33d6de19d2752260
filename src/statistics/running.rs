//! Running sample accumulator with retroactive removal.

use crate::constants::CONFIDENCE_INTERVAL_99;

/// An ordered, growable window of accepted samples plus two scalar
/// accumulators kept exactly consistent with the window contents.
///
/// Every insertion adds to `sum` and `sum_of_squares`; every retroactive
/// removal subtracts from both and compacts the sequence. Removals are
/// always near the tail, so compaction cost is bounded by the outlier
/// window size.
#[derive(Debug, Clone, Default)]
pub struct SampleWindow {
    samples: Vec<f64>,
    sum: f64,
    sum_of_squares: f64,
}

impl SampleWindow {
    /// An empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a sample.
    pub fn push(&mut self, value: f64) {
        self.samples.push(value);
        self.sum += value;
        self.sum_of_squares += value * value;
    }

    /// Retroactively remove the sample at `index`, compacting the
    /// sequence. Returns the removed value.
    pub fn remove(&mut self, index: usize) -> f64 {
        let value = self.samples.remove(index);
        self.sum -= value;
        self.sum_of_squares -= value * value;
        value
    }

    /// Discard all samples and zero both accumulators.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
        self.sum_of_squares = 0.0;
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The sample at `index`, oldest first.
    pub fn get(&self, index: usize) -> f64 {
        self.samples[index]
    }

    /// All samples, oldest first.
    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// Σ samples.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Σ samples².
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Arithmetic mean of the held samples.
    pub fn mean(&self) -> f64 {
        self.sum / self.samples.len() as f64
    }

    /// Sample standard deviation of the held samples.
    pub fn sample_sd(&self) -> f64 {
        let n = self.samples.len() as f64;
        ((self.sum_of_squares - self.sum * self.sum / n) / (n - 1.0)).sqrt()
    }

    /// Half-width of the 99% confidence interval around the mean.
    pub fn confidence_99(&self) -> f64 {
        self.sample_sd() * CONFIDENCE_INTERVAL_99
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(window: &SampleWindow) {
        let sum: f64 = window.as_slice().iter().sum();
        let sum_sq: f64 = window.as_slice().iter().map(|v| v * v).sum();
        assert!((window.sum() - sum).abs() < 1e-9);
        assert!((window.sum_of_squares() - sum_sq).abs() < 1e-9);
    }

    #[test]
    fn accumulators_track_insertions() {
        let mut window = SampleWindow::new();
        for value in [1.0, 2.0, 3.0, 4.0] {
            window.push(value);
        }
        assert_eq!(window.len(), 4);
        assert_eq!(window.sum(), 10.0);
        assert_eq!(window.sum_of_squares(), 30.0);
        assert_consistent(&window);
    }

    #[test]
    fn removal_subtracts_and_compacts() {
        let mut window = SampleWindow::new();
        for value in [5.0, 100.0, 6.0, 7.0] {
            window.push(value);
        }
        let removed = window.remove(1);
        assert_eq!(removed, 100.0);
        assert_eq!(window.len(), 3);
        assert_eq!(window.get(1), 6.0);
        assert_consistent(&window);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut window = SampleWindow::new();
        window.push(3.0);
        window.reset();
        assert!(window.is_empty());
        assert_eq!(window.sum(), 0.0);
        assert_eq!(window.sum_of_squares(), 0.0);
    }

    #[test]
    fn mean_and_sd_match_direct_computation() {
        let mut window = SampleWindow::new();
        for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            window.push(value);
        }
        assert!((window.mean() - 5.0).abs() < 1e-12);
        // Sample (n-1) standard deviation of the set above.
        assert!((window.sample_sd() - 2.138_089_935).abs() < 1e-6);
        assert!((window.confidence_99() - 2.138_089_935 * 2.58).abs() < 1e-5);
    }
}
