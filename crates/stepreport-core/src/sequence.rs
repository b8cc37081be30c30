use std::sync::atomic::{AtomicU32, Ordering};

/// Monotonic per-run action index, shared by every write and update batch.
/// One allocator per writer instance so parallel runs never cross-contaminate.
#[derive(Debug, Default)]
pub struct SequenceAllocator {
    counter: AtomicU32,
}

impl SequenceAllocator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }

    /// Allocates the next index. The first allocation returns 1.
    pub fn next(&self) -> u32 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last allocated index, 0 before the first allocation.
    pub fn current(&self) -> u32 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Returns the counter to its start-of-run state.
    pub fn reset(&self) {
        self.counter.store(0, Ordering::SeqCst);
    }
}
