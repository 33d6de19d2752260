//! Synthetic meters for exercising the engine without a managed runtime.
//!
//! The nursery publishes its counter in whole blocks, like a real
//! bump-allocated region; the old generation tracks live objects through
//! guard values whose `Drop` marks them reclaimable at the next
//! collection.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use microgauge::{AllocationMeter, ReclamationEvent, ReclamationSource, ResidentMeter};

#[derive(Debug)]
struct NurseryState {
    allocated: i64,
    granularity: i64,
    poll_overhead: i64,
}

/// Handle on a nursery-like region with a block-granular counter.
#[derive(Clone, Debug)]
pub struct Nursery(Rc<RefCell<NurseryState>>);

impl Nursery {
    pub fn new(granularity: i64) -> Self {
        Self::with_poll_overhead(granularity, 0)
    }

    /// A nursery whose counter reads themselves allocate
    /// `poll_overhead` bytes, like a meter that boxes its own samples.
    pub fn with_poll_overhead(granularity: i64, poll_overhead: i64) -> Self {
        Self(Rc::new(RefCell::new(NurseryState {
            allocated: 0,
            granularity,
            poll_overhead,
        })))
    }

    /// Record `bytes` allocated by the workload.
    pub fn alloc(&self, bytes: i64) {
        self.0.borrow_mut().allocated += bytes;
    }
}

impl AllocationMeter for Nursery {
    fn used_bytes(&mut self) -> i64 {
        let mut state = self.0.borrow_mut();
        state.allocated += state.poll_overhead;
        state.allocated / state.granularity * state.granularity
    }

    fn granularity_bytes(&self) -> i64 {
        self.0.borrow().granularity
    }

    fn poll_overhead_bytes(&self) -> i64 {
        self.0.borrow().poll_overhead
    }

    fn header_bytes(&self) -> i64 {
        0
    }

    fn baseline_error_bytes(&self) -> i64 {
        0
    }

    fn reclaim(&mut self) {}
}

#[derive(Debug)]
struct OldGenState {
    resident: i64,
    pending_free: i64,
    collections: u64,
    events: VecDeque<ReclamationEvent>,
    responsive: bool,
    closes: u64,
}

/// Handle on a synthetic old generation with asynchronous-style
/// reclamation reports.
#[derive(Clone, Debug)]
pub struct OldGen(Rc<RefCell<OldGenState>>);

impl OldGen {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(OldGenState {
            resident: 1 << 20,
            pending_free: 0,
            collections: 0,
            events: VecDeque::new(),
            responsive: true,
            closes: 0,
        })))
    }

    /// An old generation whose listener never reports back.
    pub fn unresponsive() -> Self {
        let heap = Self::new();
        heap.0.borrow_mut().responsive = false;
        heap
    }

    /// Produce an object of `size` bytes, resident until dropped and
    /// collected.
    pub fn track(&self, size: i64) -> Tracked {
        self.0.borrow_mut().resident += size;
        Tracked {
            heap: Rc::clone(&self.0),
            size,
        }
    }

    /// How many times the subscription has been released.
    pub fn closes(&self) -> u64 {
        self.0.borrow().closes
    }
}

/// Guard for one synthetic object; dropping it marks the bytes
/// reclaimable at the next collection.
#[derive(Debug)]
pub struct Tracked {
    heap: Rc<RefCell<OldGenState>>,
    size: i64,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.heap.borrow_mut().pending_free += self.size;
    }
}

impl ResidentMeter for OldGen {
    fn total_used_bytes(&mut self) -> i64 {
        self.0.borrow().resident
    }
}

impl ReclamationSource for OldGen {
    fn collection_count(&self) -> u64 {
        self.0.borrow().collections
    }

    fn collect(&mut self) {
        let mut state = self.0.borrow_mut();
        let freed = state.pending_free;
        state.resident -= freed;
        state.pending_free = 0;
        state.collections += 1;
        let id = state.collections;
        state.events.push_back(ReclamationEvent {
            collection_id: id,
            bytes_freed: freed,
        });
    }

    fn poll_event(&mut self, _timeout: Duration) -> Option<ReclamationEvent> {
        let mut state = self.0.borrow_mut();
        if !state.responsive {
            return None;
        }
        state.events.pop_front()
    }

    fn close(&mut self) {
        let mut state = self.0.borrow_mut();
        state.closes += 1;
    }
}
