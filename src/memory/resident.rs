//! Retained-size estimation for produced objects.
//!
//! Resident-memory counters are noisy: background activity shifts the
//! heap between any two snapshots. The estimator therefore samples two
//! distributions, snapshot deltas with no new object alive and deltas
//! attributable to one object living and dying, and only answers once
//! the two have visibly stabilized.

use crate::constants::{MAX_RESIDENT_SAMPLES, RESIDENT_GROWTH, RESIDENT_INITIAL_SAMPLES};
use crate::error::{Error, Result};
use crate::measurement::meter::{ReclamationSource, ResidentMeter};
use crate::measurement::ReclamationQueue;
use crate::units::Bytes;

/// Returns the memory retained by the object `factory` produces, once it
/// is unreferenced and reclaimed.
///
/// Each array starts at 7 samples and grows by 4 per round. A round
/// stabilizes when, in both sorted arrays, the first-quartile value
/// equals the median; the answer is then `median(with) −
/// median(without)`. Past 30 total samples, a majority value among the
/// sorted per-index paired differences is accepted instead.
///
/// # Errors
///
/// [`Error::DidNotStabilize`] once 1000 total samples have been taken
/// without either test succeeding, with both raw distributions attached;
/// [`Error::UnresponsiveMeter`] if a reclamation report misses the poll
/// deadline.
pub fn object_size<S, M, F, T>(source: S, meter: &mut M, mut factory: F) -> Result<Bytes>
where
    S: ReclamationSource,
    M: ResidentMeter + ?Sized,
    F: FnMut() -> T,
{
    let mut queue = ReclamationQueue::new(source);
    let mut without: Vec<i64> = Vec::with_capacity(RESIDENT_INITIAL_SAMPLES);
    let mut with: Vec<i64> = Vec::with_capacity(RESIDENT_INITIAL_SAMPLES);
    let mut target = RESIDENT_INITIAL_SAMPLES;

    loop {
        while with.len() < target {
            // Noise between two quiescent snapshots
            settle(&mut queue)?;
            let before = meter.total_used_bytes();
            settle(&mut queue)?;
            let after = meter.total_used_bytes();
            without.push(after - before);

            // Delta while one object is alive, minus the delta once it
            // has been dropped and reclaimed
            let object = factory();
            settle(&mut queue)?;
            let while_alive = meter.total_used_bytes();
            drop(object);
            settle(&mut queue)?;
            let after_drop = meter.total_used_bytes();
            with.push(while_alive - after_drop);
        }

        let mut sorted_without = without.clone();
        sorted_without.sort_unstable();
        let mut sorted_with = with.clone();
        sorted_with.sort_unstable();

        if stabilized(&sorted_without) && stabilized(&sorted_with) {
            let estimate = median(&sorted_with) - median(&sorted_without);
            return Ok(Bytes::bytes(estimate.max(0) as u64));
        }

        if without.len() + with.len() > 30 {
            // When the noise floor repeats on both sides, the paired
            // differences concentrate on the object size
            let mut diffs: Vec<i64> = with
                .iter()
                .zip(without.iter())
                .map(|(w, n)| w - n)
                .collect();
            diffs.sort_unstable();
            if let Some(value) = majority_value(&diffs) {
                return Ok(Bytes::bytes(value.max(0) as u64));
            }
        }

        if without.len() + with.len() >= MAX_RESIDENT_SAMPLES {
            return Err(Error::DidNotStabilize { without, with });
        }
        target += RESIDENT_GROWTH;
    }
}

/// Force a collection and consume its report, so the next snapshot only
/// sees a settled heap.
fn settle<S: ReclamationSource>(queue: &mut ReclamationQueue<S>) -> Result<()> {
    queue.collect();
    queue.last_reclaimed()?;
    Ok(())
}

/// A sorted distribution has stabilized when its first-quartile value
/// equals its median value.
fn stabilized(sorted: &[i64]) -> bool {
    sorted[sorted.len() / 4] == sorted[sorted.len() / 2]
}

fn median(sorted: &[i64]) -> i64 {
    sorted[sorted.len() / 2]
}

/// A value occupying at least half of all slots in a sorted sequence.
fn majority_value(sorted: &[i64]) -> Option<i64> {
    let mut run = 0usize;
    let mut current = 0i64;
    for &value in sorted {
        if run > 0 && value == current {
            run += 1;
        } else {
            current = value;
            run = 1;
        }
        if run * 2 >= sorted.len() {
            return Some(current);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartile_median_agreement_means_stable() {
        assert!(stabilized(&[0, 0, 0, 0, 0, 0, 8]));
        assert!(!stabilized(&[0, 8, 16, 24, 32, 40, 48]));
    }

    #[test]
    fn majority_needs_half_the_slots() {
        assert_eq!(majority_value(&[24, 40, 40, 40, 40, 48, 56]), Some(40));
        assert_eq!(majority_value(&[0, 8, 16, 24, 32, 40, 48]), None);
    }

    #[test]
    fn majority_counts_runs_not_totals() {
        // Four of seven slots is a majority; three is not.
        assert_eq!(majority_value(&[8, 8, 8, 8, 16, 24, 32]), Some(8));
        assert_eq!(majority_value(&[8, 8, 8, 16, 24, 32, 40]), None);
    }
}
