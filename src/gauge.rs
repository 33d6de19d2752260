//! Main `Gauge` entry point and builder.

use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::measurement::monitor::Unmonitored;
use crate::measurement::{AllocationMeter, HotLoop, InterferenceMonitor, TimeSampler};
use crate::result::BenchmarkResult;

/// Main entry point for adaptive measurement.
///
/// Use the builder pattern to configure and run a measurement. The
/// gauge decides how many repetitions per batch and how many samples it
/// needs; callers supply the hot loop and the allocation meter.
///
/// # Example
///
/// ```ignore
/// use microgauge::Gauge;
///
/// let result = Gauge::new()
///     .target_relative_error(0.01)
///     .measure(&mut hot_loop, &mut meter)?;
///
/// println!("{result}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    config: Config,
}

impl Gauge {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the minimum wall time the measurement must cover before it
    /// may stop.
    pub fn min_total_time(mut self, duration: Duration) -> Self {
        self.config.min_total_time = duration;
        self
    }

    /// Set the minimum number of accepted timing samples.
    pub fn min_samples(mut self, samples: usize) -> Self {
        self.config.min_samples = samples;
        self
    }

    /// Set the minimum duration a batch must run to count.
    pub fn min_batch_duration(mut self, duration: Duration) -> Self {
        self.config.min_batch_duration = duration;
        self
    }

    /// Set the target relative error of the mean at 99% confidence.
    pub fn target_relative_error(mut self, error: f64) -> Self {
        self.config.target_relative_error = error;
        self
    }

    /// The effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Measure `hot_loop`, reporting mean time per call at 99%
    /// confidence alongside bytes allocated per call.
    pub fn measure<H, M>(&self, hot_loop: &mut H, meter: &mut M) -> Result<BenchmarkResult>
    where
        H: HotLoop + ?Sized,
        M: AllocationMeter + ?Sized,
    {
        self.measure_monitored(hot_loop, meter, &mut Unmonitored)
    }

    /// Measure with an interference monitor watching the run.
    ///
    /// Interference reports are logged at WARN; they never fail the
    /// measurement.
    pub fn measure_monitored<H, M, I>(
        &self,
        hot_loop: &mut H,
        meter: &mut M,
        monitor: &mut I,
    ) -> Result<BenchmarkResult>
    where
        H: HotLoop + ?Sized,
        M: AllocationMeter + ?Sized,
        I: InterferenceMonitor + ?Sized,
    {
        TimeSampler::new(self.config.clone()).measure(hot_loop, meter, monitor)
    }
}
