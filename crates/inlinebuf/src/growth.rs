//! Capacity growth policies.
//!
//! A policy only decides *how much* to allocate once a buffer has run out of
//! room. The buffer rejects any answer smaller than the required length or
//! larger than `isize::MAX`.

/// Chooses the capacity of a new block when a buffer must grow.
pub trait GrowthPolicy {
    /// Capacity to allocate so that `required` bytes fit, given the current
    /// capacity (the inline capacity when the buffer is still inline).
    ///
    /// Returns `None` when the computation overflows. Policies must grow
    /// geometrically in `required` or `current` to keep repeated appends
    /// amortized O(1).
    fn grow(current: usize, required: usize) -> Option<usize>;
}

/// Allocates one and a half times the new length, rounded up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneAndHalf;

impl GrowthPolicy for OneAndHalf {
    #[inline]
    fn grow(_current: usize, required: usize) -> Option<usize> {
        required.checked_add(required.div_ceil(2))
    }
}

/// Doubles the current capacity, or jumps straight to the required length if
/// doubling is not enough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Doubling;

impl GrowthPolicy for Doubling {
    #[inline]
    fn grow(current: usize, required: usize) -> Option<usize> {
        Some(current.checked_mul(2)?.max(required))
    }
}
