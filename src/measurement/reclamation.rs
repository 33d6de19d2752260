//! Engine-side consumer of the reclamation event stream.

use crate::constants::RECLAMATION_TIMEOUT;
use crate::error::{Error, Result};
use crate::measurement::meter::{ReclamationEvent, ReclamationSource};

/// Orders reclamation reports behind a blocking poll with a hard
/// timeout.
///
/// A queue owns its subscription for the duration of one measurement and
/// releases it on drop, failure paths included. A poll that misses the
/// deadline is fatal: the event source is assumed broken, not slow.
#[derive(Debug)]
pub struct ReclamationQueue<S: ReclamationSource> {
    source: S,
    last_collection: u64,
}

impl<S: ReclamationSource> ReclamationQueue<S> {
    /// Subscribe to `source`, treating its current collection count as
    /// already consumed.
    pub fn new(source: S) -> Self {
        let last_collection = source.collection_count();
        Self {
            source,
            last_collection,
        }
    }

    /// Whether any collection completed since the last report dequeued.
    pub fn has_next(&self) -> bool {
        self.last_collection != self.source.collection_count()
    }

    /// Trigger a full collection of the watched region.
    pub fn collect(&mut self) {
        self.source.collect();
    }

    /// Bytes reclaimed by the next enqueued collection.
    pub fn next_reclaimed(&mut self) -> Result<i64> {
        let event = self.poll()?;
        self.last_collection = event.collection_id;
        Ok(event.bytes_freed)
    }

    /// Bytes reclaimed by the most recent collection, discarding any
    /// intermediate reports.
    pub fn last_reclaimed(&mut self) -> Result<i64> {
        let target = self.source.collection_count();
        loop {
            let event = self.poll()?;
            self.last_collection = event.collection_id;
            if self.last_collection == target {
                return Ok(event.bytes_freed);
            }
        }
    }

    fn poll(&mut self) -> Result<ReclamationEvent> {
        self.source
            .poll_event(RECLAMATION_TIMEOUT)
            .ok_or(Error::UnresponsiveMeter)
    }
}

impl<S: ReclamationSource> Drop for ReclamationQueue<S> {
    fn drop(&mut self) {
        self.source.close();
    }
}
