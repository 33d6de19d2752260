//! Fixed statistical constants of the measurement engine.
//!
//! These are deliberately not configurable: the outlier model, the
//! confidence level, and the assertion checkpoints encode statistical
//! guarantees, not performance knobs. Changing them changes what a
//! passing measurement means.

use std::time::Duration;

/// Weight of the newest sample in the outlier model's exponential decay.
pub const EWMA_WEIGHT: f64 = 0.1;

/// Trailing samples re-examined by the retroactive outlier sweep.
pub const OUTLIER_WINDOW: usize = 20;

/// Samples more than this many trailing standard deviations above the
/// trailing mean are classified as contaminated.
pub const OUTLIER_SD_THRESHOLD: f64 = 3.0;

/// z-score for a 99% confidence interval.
pub const CONFIDENCE_INTERVAL_99: f64 = 2.58;

/// Allocation rounding unit; estimates are truncated to multiples of this.
pub const WORD_BYTES: i64 = 8;

/// Estimate rounds taken by the allocation estimator before it decides
/// whether the data looks sketchy.
pub const ALLOCATION_ROUNDS: usize = 5;

/// Estimate rounds after escalation.
pub const ESCALATED_ROUNDS: usize = 25;

/// Escalating sample-size checkpoints of the assertion judge.
pub const CHECKPOINTS: [usize; 3] = [5, 25, 200];

/// Allocation readings at or below this many bytes are matched exactly;
/// above it a 1% margin applies.
pub const EXACT_BYTES_LIMIT: i64 = 995;

/// Upper bound on counter polls while waiting for a block to retire.
pub const MAX_COUNTER_POLLS: i64 = 4096;

/// How long to wait on the reclamation event channel before declaring the
/// listener broken.
pub const RECLAMATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Samples in each resident-size array before the first stabilization check.
pub const RESIDENT_INITIAL_SAMPLES: usize = 7;

/// Samples added to each resident-size array per growth round.
pub const RESIDENT_GROWTH: usize = 4;

/// Hard cap on total resident-size samples before giving up.
pub const MAX_RESIDENT_SAMPLES: usize = 1000;
