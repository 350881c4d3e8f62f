//! Heap allocation accounting.
//!
//! [`CountingAlloc`] wraps the system allocator and counts, per thread,
//! how many allocations were made and how many bytes they requested. It
//! only counts once a binary installs it:
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: mp_bench::CountingAlloc = mp_bench::CountingAlloc;
//! ```
//!
//! Counters are thread-local, so [`measure`] sees only the allocations made
//! on the calling thread. Work handed to other threads (the rayon workers of
//! the parallel kernel) is not included.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ops::Sub;
use std::sync::atomic::{AtomicBool, Ordering};

static INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static ALLOCS: Cell<u64> = const { Cell::new(0) };
    static BYTES: Cell<u64> = const { Cell::new(0) };
}

fn record(size: usize) {
    INSTALLED.store(true, Ordering::Relaxed);
    // try_with: the thread's locals may already be gone during teardown
    let _ = ALLOCS.try_with(|n| n.set(n.get() + 1));
    let _ = BYTES.try_with(|n| n.set(n.get() + size as u64));
}

/// System allocator that counts allocations on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record(new_size);
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

/// Allocation counts over some span of work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Calls to `alloc`, `alloc_zeroed` and `realloc`.
    pub allocs: u64,
    /// Bytes requested by those calls.
    pub bytes: u64,
}

impl Sub for AllocStats {
    type Output = AllocStats;

    fn sub(self, rhs: AllocStats) -> AllocStats {
        AllocStats {
            allocs: self.allocs.saturating_sub(rhs.allocs),
            bytes: self.bytes.saturating_sub(rhs.bytes),
        }
    }
}

/// True once any allocation has gone through [`CountingAlloc`].
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

/// Running totals for the current thread.
pub fn snapshot() -> AllocStats {
    AllocStats {
        allocs: ALLOCS.with(Cell::get),
        bytes: BYTES.with(Cell::get),
    }
}

/// Run `f` and return its result with the allocations it made on this
/// thread. The stats are `None` when [`CountingAlloc`] is not installed.
pub fn measure<R, F: FnOnce() -> R>(f: F) -> (R, Option<AllocStats>) {
    let before = snapshot();
    let out = f();
    let after = snapshot();
    (out, is_installed().then(|| after - before))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_saturates() {
        let a = AllocStats { allocs: 5, bytes: 100 };
        let b = AllocStats { allocs: 2, bytes: 40 };
        assert_eq!(a - b, AllocStats { allocs: 3, bytes: 60 });
        assert_eq!(b - a, AllocStats::default());
    }

    #[test]
    fn test_not_installed_in_unit_tests() {
        // the lib test harness keeps the system allocator
        let (v, stats) = measure(|| vec![1u8; 64]);
        assert_eq!(v.len(), 64);
        assert_eq!(stats, None);
        assert!(!is_installed());
    }
}
