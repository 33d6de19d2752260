//! The adaptive sampling loop.
//!
//! Scales repetitions-per-batch until a batch runs long enough to time
//! reliably, then collects per-call samples through the outlier model
//! until the running 99% confidence interval is tight enough. Samples
//! the trailing window has since learned to distrust are removed
//! retroactively, so the convergence check never acts on contaminated
//! data.

use std::time::Instant;

use crate::config::Config;
use crate::constants::{CONFIDENCE_INTERVAL_99, OUTLIER_WINDOW};
use crate::error::Result;
use crate::measurement::hot_loop::HotLoop;
use crate::measurement::meter::AllocationMeter;
use crate::measurement::monitor::InterferenceMonitor;
use crate::result::BenchmarkResult;
use crate::statistics::{EwmaStats, SampleWindow};

/// The adaptive sampling loop behind [`Gauge`](crate::Gauge).
#[derive(Debug, Clone, Default)]
pub struct TimeSampler {
    config: Config,
}

impl TimeSampler {
    /// A sampler with the given measurement knobs.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run one full measurement: adapt the batch size, sample until the
    /// termination rule fires, and report time and memory per call.
    pub fn measure<H, M, I>(
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
        sample(&self.config, hot_loop, meter, monitor)
    }
}

fn sample<H, M, I>(
    config: &Config,
    hot_loop: &mut H,
    meter: &mut M,
    monitor: &mut I,
) -> Result<BenchmarkResult>
where
    H: HotLoop + ?Sized,
    M: AllocationMeter + ?Sized,
    I: InterferenceMonitor + ?Sized,
{
    let started = Instant::now();
    let min_batch_nanos = config.min_batch_duration.as_nanos() as u64;
    let window = OUTLIER_WINDOW as i64;

    // Invocations per batch
    let mut iterations: u64 = 1;

    // Accepted per-call times and their accumulators
    let mut samples = SampleWindow::new();

    // Trailing estimate for outlier classification; survives restarts
    let mut trailing = EwmaStats::new();

    // Memory usage across all timed turns
    let mut usage_before: i64 = 0;
    let usage_after: i64;

    // Samples taken so far; -1 marks a restart that the end-of-turn
    // increment turns back into 0
    let mut timing_samples: i64 = 0;
    let mut memory_samples: i64 = 0;

    loop {
        if memory_samples == 0 {
            meter.reclaim();
            usage_before = meter.used_bytes();
            monitor.start();
        }
        if timing_samples == 0 {
            samples.reset();
        }

        let elapsed = hot_loop.run(iterations)?;

        if elapsed < min_batch_nanos {
            // Too short to time reliably; grow the batch and start over
            iterations = iterations + (iterations >> 1) + 1;
            timing_samples = -1;
            memory_samples = -1;
        } else {
            let iteration_time = elapsed as f64 / iterations as f64;

            if timing_samples >= window
                && trailing.is_outlier(iteration_time, timing_samples as usize)
            {
                // Contaminated; retry the batch without counting anything
                continue;
            }

            samples.push(iteration_time);
            trailing.update(iteration_time);

            // Remove old outliers as we run, so the sample error below is
            // never computed over data we have since learned to distrust
            if timing_samples >= window {
                let mut first_index = timing_samples - window;
                let mut index = first_index;
                while index >= first_index {
                    if rejected_by_followers(&samples, index as usize) {
                        samples.remove(index as usize);
                        first_index = (index - window).max(0);
                        timing_samples -= 1;
                    }
                    index -= 1;
                }
            }

            // Ongoing sample error over the n+1 samples currently held.
            // The termination inequality is kept in this exact form; an
            // algebraically equivalent rewrite changes rounding near the
            // convergence boundary.
            let n = timing_samples as f64;
            let s = samples.sum();
            let ss = samples.sum_of_squares();
            let sample_error = ((ss - s * s / (n + 1.0)) / ((n + 1.0) * n)).sqrt();
            let confidence_interval = sample_error * CONFIDENCE_INTERVAL_99;
            let low_sample_error = confidence_interval * n < s * config.target_relative_error;

            let enough_samples = timing_samples >= config.min_samples as i64;
            let enough_time = started.elapsed() >= config.min_total_time;
            if enough_samples && enough_time && low_sample_error {
                monitor.stop();
                usage_after = meter.used_bytes();
                timing_samples += 1;
                break;
            }
        }

        timing_samples += 1;
        memory_samples += 1;
    }

    if let Some(report) = monitor.report() {
        tracing::warn!(interference = %report, "interference observed during measurement");
    }

    let n = timing_samples as f64;
    let mean = samples.sum() / n;
    let std_dev =
        ((samples.sum_of_squares() - samples.sum() * samples.sum() / n) / (n - 1.0)).sqrt();
    let batch_usage =
        (usage_after - usage_before - meter.baseline_error_bytes()) as f64 / iterations as f64;
    let bytes_per_call = batch_usage / memory_samples as f64;

    Ok(BenchmarkResult {
        mean_ns: mean,
        confidence_99_ns: std_dev * CONFIDENCE_INTERVAL_99,
        std_dev_ns: std_dev,
        timing_samples: timing_samples as usize,
        memory_samples: memory_samples as usize,
        bytes_per_call,
        iterations_per_batch: iterations,
    })
}

/// Re-evaluate an accepted sample against the trailing statistics of the
/// samples that came after it: a forward-looking estimate over however
/// many followers it has, up to the window size.
fn rejected_by_followers(samples: &SampleWindow, index: usize) -> bool {
    let followers = &samples.as_slice()[index + 1..];
    EwmaStats::over(followers).is_outlier(samples.get(index), followers.len())
}
