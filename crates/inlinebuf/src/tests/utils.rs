//! Instrumented allocators shared by the unit tests.

use core::{cell::Cell, ptr::NonNull};

use crate::{AllocError, Allocator, Global};

/// Delegates to [`Global`] and counts every call.
#[derive(Debug, Default)]
pub(crate) struct CountingAlloc {
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    live_bytes: Cell<usize>,
}

impl CountingAlloc {
    pub(crate) fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub(crate) fn deallocations(&self) -> usize {
        self.deallocations.get()
    }

    pub(crate) fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }
}

// SAFETY: blocks come from `Global` and go back to it unchanged.
unsafe impl Allocator for CountingAlloc {
    fn allocate(&self, len: usize) -> Result<NonNull<u8>, AllocError> {
        let block = Global.allocate(len)?;
        self.allocations.set(self.allocations.get() + 1);
        self.live_bytes.set(self.live_bytes.get() + len);
        Ok(block)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, len: usize) {
        self.deallocations.set(self.deallocations.get() + 1);
        self.live_bytes.set(self.live_bytes.get() - len);
        // SAFETY: forwarded contract.
        unsafe { Global.deallocate(block, len) }
    }
}

/// Grants a fixed number of allocations, then refuses every request.
#[derive(Debug)]
pub(crate) struct FailingAlloc {
    remaining: Cell<usize>,
    inner: CountingAlloc,
}

impl FailingAlloc {
    pub(crate) fn after(successes: usize) -> Self {
        Self {
            remaining: Cell::new(successes),
            inner: CountingAlloc::default(),
        }
    }
}

// SAFETY: see `CountingAlloc`.
unsafe impl Allocator for FailingAlloc {
    fn allocate(&self, len: usize) -> Result<NonNull<u8>, AllocError> {
        let remaining = self.remaining.get().checked_sub(1).ok_or(AllocError)?;
        self.remaining.set(remaining);
        self.inner.allocate(len)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, len: usize) {
        // SAFETY: forwarded contract.
        unsafe { self.inner.deallocate(block, len) }
    }
}

/// Asks `clone_from` to hand the source's allocator to the destination.
#[derive(Debug)]
pub(crate) struct PropagatingAlloc {
    id: u8,
    inner: CountingAlloc,
}

impl PropagatingAlloc {
    pub(crate) fn new(id: u8) -> Self {
        Self {
            id,
            inner: CountingAlloc::default(),
        }
    }

    pub(crate) fn id(&self) -> u8 {
        self.id
    }

    pub(crate) fn live_bytes(&self) -> usize {
        self.inner.live_bytes()
    }
}

// SAFETY: see `CountingAlloc`.
unsafe impl Allocator for PropagatingAlloc {
    const PROPAGATE_ON_CLONE_FROM: bool = true;

    fn allocate(&self, len: usize) -> Result<NonNull<u8>, AllocError> {
        self.inner.allocate(len)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, len: usize) {
        // SAFETY: forwarded contract.
        unsafe { self.inner.deallocate(block, len) }
    }
}

/// Number of quickcheck cases to run.
pub(crate) fn quickcheck_tests() -> u64 {
    if cfg!(any(miri, feature = "test-fast")) {
        10
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}
