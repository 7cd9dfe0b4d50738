//! Memory accounting
//!
//! Two views of the same question. [`Document::memory_usage`] sums what one
//! document holds: arena blocks, owned replacement strings and an owned
//! parse buffer. The process-wide counters come from a counting global
//! allocator installed by the `memory_tracking` feature; without it they
//! read 0.

use crate::dom::document::Document;

/// Heap bytes held by one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentMemory {
    /// Node and attribute arena blocks, by reserved capacity
    pub arena: usize,
    /// Names and values replaced after parsing
    pub strings: usize,
    /// Parse buffer, when the document owns it
    pub buffer: usize,
}

impl DocumentMemory {
    #[inline]
    pub fn total(&self) -> usize {
        self.arena + self.strings + self.buffer
    }
}

impl Document<'_> {
    /// Heap usage of this document; a borrowed parse buffer counts as 0
    pub fn memory_usage(&self) -> DocumentMemory {
        let node_strings: usize = self
            .nodes
            .iter()
            .map(|n| n.name.heap_bytes() + n.value.heap_bytes())
            .sum();
        let attribute_strings: usize = self
            .attributes
            .iter()
            .map(|a| a.name.heap_bytes() + a.value.heap_bytes())
            .sum();

        DocumentMemory {
            arena: self.nodes.reserved_bytes() + self.attributes.reserved_bytes(),
            strings: node_strings + attribute_strings,
            buffer: self.buffer.heap_bytes(),
        }
    }
}

#[cfg(feature = "memory_tracking")]
mod counting {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(super) static LIVE: AtomicUsize = AtomicUsize::new(0);
    pub(super) static HIGH_WATER: AtomicUsize = AtomicUsize::new(0);

    #[cfg(feature = "mimalloc")]
    type Inner = mimalloc::MiMalloc;
    #[cfg(feature = "mimalloc")]
    const INNER: Inner = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    type Inner = std::alloc::System;
    #[cfg(not(feature = "mimalloc"))]
    const INNER: Inner = std::alloc::System;

    /// Global allocator that keeps a live byte count and its high-water mark
    pub struct CountingAlloc(Inner);

    impl CountingAlloc {
        pub const fn new() -> Self {
            CountingAlloc(INNER)
        }
    }

    unsafe impl GlobalAlloc for CountingAlloc {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            // SAFETY: the caller's layout contract is passed through unchanged
            let ptr = unsafe { self.0.alloc(layout) };
            if !ptr.is_null() {
                let live = LIVE.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                HIGH_WATER.fetch_max(live, Ordering::Relaxed);
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            LIVE.fetch_sub(layout.size(), Ordering::Relaxed);
            // SAFETY: `ptr` was returned by `alloc` on the same inner allocator
            unsafe { self.0.dealloc(ptr, layout) }
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: counting::CountingAlloc = counting::CountingAlloc::new();

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Bytes currently allocated by the process
#[cfg(feature = "memory_tracking")]
pub fn allocated_bytes() -> usize {
    counting::LIVE.load(std::sync::atomic::Ordering::SeqCst)
}

/// Highest [`allocated_bytes`] seen since start or the last reset
#[cfg(feature = "memory_tracking")]
pub fn peak_allocated_bytes() -> usize {
    counting::HIGH_WATER.load(std::sync::atomic::Ordering::SeqCst)
}

/// Lower the peak to the current count; returns `(current, previous peak)`
#[cfg(feature = "memory_tracking")]
pub fn reset_memory_stats() -> (usize, usize) {
    use std::sync::atomic::Ordering;
    let live = counting::LIVE.load(Ordering::SeqCst);
    (live, counting::HIGH_WATER.swap(live, Ordering::SeqCst))
}

#[cfg(not(feature = "memory_tracking"))]
pub fn allocated_bytes() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
pub fn peak_allocated_bytes() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
pub fn reset_memory_stats() -> (usize, usize) {
    (0, 0)
}
