//! Pluggable allocation strategy for the dynamic representation.
//!
//! A [`ByteBuffer`](crate::ByteBuffer) only ever asks its allocator for
//! byte-aligned blocks, so the interface is reduced to `allocate(len)` and
//! `deallocate(block, len)`. Stateful strategies (arenas, counters, fault
//! injectors) are usually shared by reference: `&A` implements `Allocator`
//! whenever `A` does.

use core::{alloc::Layout, ptr::NonNull};

use crate::error::AllocError;

/// Source of the separately owned blocks backing a promoted buffer.
///
/// # Safety
///
/// A block returned by [`allocate`](Allocator::allocate) must be valid for
/// reads and writes of `len` bytes and must stay valid until it is passed to
/// [`deallocate`](Allocator::deallocate) on the same allocator, or on one
/// that reports itself [interchangeable](Allocator::is_interchangeable).
pub unsafe trait Allocator {
    /// Whether `clone_from` hands the source's allocator to the destination.
    ///
    /// When `false` the destination keeps the allocator it already had.
    const PROPAGATE_ON_CLONE_FROM: bool = false;

    /// Allocates a block of `len` bytes with alignment 1.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when the request cannot be satisfied.
    fn allocate(&self, len: usize) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block previously obtained from [`allocate`](Allocator::allocate).
    ///
    /// # Safety
    ///
    /// `block` must have been allocated by this allocator (or an
    /// interchangeable one) with exactly `len` bytes, and must not be used
    /// afterwards.
    unsafe fn deallocate(&self, block: NonNull<u8>, len: usize);

    /// Allocator used by a freshly cloned buffer.
    fn select_on_clone(&self) -> Self
    where
        Self: Clone,
    {
        self.clone()
    }

    /// Whether blocks allocated by `other` may be released through `self`.
    fn is_interchangeable(&self, other: &Self) -> bool {
        let _ = other;
        false
    }
}

/// The global heap, via `alloc::alloc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Global;

// SAFETY: blocks come straight from the global allocator with the layout
// they are released with.
unsafe impl Allocator for Global {
    fn allocate(&self, len: usize) -> Result<NonNull<u8>, AllocError> {
        if len == 0 {
            return Ok(NonNull::dangling());
        }
        let layout = Layout::array::<u8>(len).map_err(|_| AllocError)?;
        // SAFETY: `layout` has a non-zero size.
        NonNull::new(unsafe { alloc::alloc::alloc(layout) }).ok_or(AllocError)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, len: usize) {
        if len == 0 {
            return;
        }
        // SAFETY: the caller guarantees `block` came from `allocate(len)`,
        // which validated this layout.
        unsafe {
            alloc::alloc::dealloc(block.as_ptr(), Layout::from_size_align_unchecked(len, 1));
        }
    }

    fn is_interchangeable(&self, _other: &Self) -> bool {
        true
    }
}

// SAFETY: forwards every call to `A`, which upholds the contract.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    const PROPAGATE_ON_CLONE_FROM: bool = A::PROPAGATE_ON_CLONE_FROM;

    fn allocate(&self, len: usize) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(len)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, len: usize) {
        // SAFETY: same contract as the caller's.
        unsafe { (**self).deallocate(block, len) }
    }

    fn is_interchangeable(&self, other: &Self) -> bool {
        core::ptr::addr_eq(*self, *other) || (**self).is_interchangeable(*other)
    }
}
