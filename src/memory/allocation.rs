//! Bytes-allocated-per-call estimation.
//!
//! The nursery counter only advances in block-sized jumps, so a single
//! call's allocation is invisible unless amplified: the estimator runs
//! the unit of work enough times that even one word per call must move
//! the counter by a full rounding unit, then works back to a per-call
//! figure.

use crate::constants::{ALLOCATION_ROUNDS, ESCALATED_ROUNDS, MAX_COUNTER_POLLS, WORD_BYTES};
use crate::error::{Error, Result};
use crate::measurement::hot_loop::black_box;
use crate::measurement::meter::AllocationMeter;
use crate::units::Bytes;

/// Engine-side view of the nursery counter.
///
/// Turns irregular counter updates into allocated-byte deltas between
/// readings: the counter only moves when a block is retired, so
/// [`sample`](AllocationSampler::sample) polls until it does, then
/// charges the meter's own allocation cost back out of the delta.
#[derive(Debug)]
pub struct AllocationSampler<'a, M: AllocationMeter + ?Sized> {
    meter: &'a mut M,
    last: i64,
}

impl<'a, M: AllocationMeter + ?Sized> AllocationSampler<'a, M> {
    /// Wrap `meter`, synchronizing on its current reading.
    pub fn new(meter: &'a mut M) -> Self {
        let last = meter.used_bytes();
        Self { meter, last }
    }

    /// The number of work repetitions guaranteed to move the counter by
    /// at least one rounding unit.
    pub fn repeats(&self) -> i64 {
        (self.meter.granularity_bytes() / WORD_BYTES).max(1)
    }

    /// Force a collection and resynchronize on the settled counter.
    pub fn reclaim(&mut self) {
        self.meter.reclaim();
        self.last = self.meter.used_bytes();
    }

    /// Bytes allocated since the previous reading, net of the meter's
    /// own sampling cost.
    ///
    /// Each poll allocates a little itself, so a stalled counter is
    /// eventually pushed over a block boundary; the per-poll cost is
    /// subtracted along with the fixed per-reading header.
    pub fn sample(&mut self) -> i64 {
        let mut polls: i64 = 1;
        let mut now = self.meter.used_bytes();
        while now == self.last && polls < MAX_COUNTER_POLLS {
            now = self.meter.used_bytes();
            polls += 1;
        }
        let delta = now - self.last
            - polls * self.meter.poll_overhead_bytes()
            - self.meter.header_bytes();
        self.last = now;
        delta
    }
}

/// Returns the bytes allocated per call of `work`.
///
/// Accurate to the byte for calls allocating under ~5 kB. `work` should
/// return a value derived from its allocations so they cannot be
/// optimized away; the estimator routes every result through
/// [`black_box`].
///
/// # Errors
///
/// [`Error::TooNoisy`] if the sample set stays malformed after
/// escalation to 25 rounds.
pub fn memory_consumption<M, F, T>(meter: &mut M, mut work: F) -> Result<Bytes>
where
    M: AllocationMeter + ?Sized,
    F: FnMut() -> T,
{
    meter.reclaim();
    let mut sampler = AllocationSampler::new(meter);
    let repeats = sampler.repeats();

    let mut estimates: Vec<i64> = Vec::with_capacity(ALLOCATION_ROUNDS);
    let mut rounds = ALLOCATION_ROUNDS;
    while estimates.len() < rounds {
        for _ in 0..repeats {
            black_box(work());
        }
        estimates.push((sampler.sample() / repeats) & !(WORD_BYTES - 1));

        // After five rounds, decide whether the data looks sketchy
        // enough to need more samples
        if estimates.len() == ALLOCATION_ROUNDS && rounds == ALLOCATION_ROUNDS {
            estimates.sort_unstable();
            if (estimates[0] != estimates[1] && estimates[1] != estimates[2]) || estimates[1] < 0 {
                rounds = ESCALATED_ROUNDS;
                sampler.reclaim();
            }
        }
    }

    if estimates.len() > ALLOCATION_ROUNDS {
        // Strip the optimistic and pessimistic tails and average the
        // middle, preferring the lower, less-contaminated end
        estimates.sort_unstable();
        let skip = estimates.len() / 5;
        let take = 2 * estimates.len() / 5;
        let middle = &estimates[skip..skip + take];
        let average = middle.iter().sum::<i64>() as f64 / middle.len() as f64;
        if average < 0.0 {
            return Err(Error::TooNoisy { estimates });
        }
        return Ok(Bytes::bytes(average as u64));
    }

    // The second-smallest value empirically dodges single-round
    // contamination without needing a distribution
    Ok(Bytes::bytes(estimates[1].max(0) as u64))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Handle on a shared counter that publishes in whole blocks, like a
    /// real nursery.
    #[derive(Clone)]
    struct BlockMeter {
        allocated: Rc<RefCell<i64>>,
        granularity: i64,
    }

    impl BlockMeter {
        fn new(granularity: i64) -> Self {
            Self {
                allocated: Rc::new(RefCell::new(0)),
                granularity,
            }
        }

        fn alloc(&self, bytes: i64) {
            *self.allocated.borrow_mut() += bytes;
        }
    }

    impl AllocationMeter for BlockMeter {
        fn used_bytes(&mut self) -> i64 {
            *self.allocated.borrow() / self.granularity * self.granularity
        }

        fn granularity_bytes(&self) -> i64 {
            self.granularity
        }

        fn poll_overhead_bytes(&self) -> i64 {
            0
        }

        fn header_bytes(&self) -> i64 {
            0
        }

        fn baseline_error_bytes(&self) -> i64 {
            0
        }

        fn reclaim(&mut self) {}
    }

    #[test]
    fn word_aligned_costs_are_recovered_exactly() {
        let heap = BlockMeter::new(4096);
        let mut meter = heap.clone();
        let estimate = memory_consumption(&mut meter, || heap.alloc(24)).unwrap();
        assert_eq!(estimate, Bytes::bytes(24));
    }

    #[test]
    fn no_op_work_reports_zero() {
        let heap = BlockMeter::new(4096);
        let mut meter = heap.clone();
        let estimate = memory_consumption(&mut meter, || ()).unwrap();
        assert_eq!(estimate, Bytes::bytes(0));
    }

    #[test]
    fn repeats_amplify_past_the_counter_granularity() {
        let heap = BlockMeter::new(4096);
        let mut meter = heap.clone();
        let sampler = AllocationSampler::new(&mut meter);
        assert_eq!(sampler.repeats(), 512);
    }
}
