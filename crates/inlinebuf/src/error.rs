use core::alloc::Layout;

use thiserror::Error;

/// Returned by an [`Allocator`](crate::Allocator) that could not satisfy a
/// request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("memory allocation failed")]
pub struct AllocError;

/// Failure of a fallible buffer operation.
///
/// Every operation that returns a `BufferError` leaves the buffer exactly as
/// it was before the call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The requested length or the capacity computed for it does not fit in
    /// `isize::MAX` bytes.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The allocator refused a block of `capacity` bytes.
    #[error("failed to allocate {capacity} bytes")]
    AllocFailed {
        /// Size of the block that was requested.
        capacity: usize,
    },
    /// `shrink` was asked to remove more bytes than the buffer holds.
    #[error("cannot shrink by {requested} bytes: only {len} bytes buffered")]
    ShrinkOutOfBounds {
        /// Number of bytes the caller asked to remove.
        requested: usize,
        /// Length of the buffer at the time of the call.
        len: usize,
    },
}

/// Unwraps the result of a growth operation, treating failure as fatal the
/// way `alloc` collections do.
#[track_caller]
pub(crate) fn unwrap_or_abort<T>(result: Result<T, BufferError>) -> T {
    match result {
        Ok(value) => value,
        Err(BufferError::AllocFailed { capacity }) => match Layout::array::<u8>(capacity) {
            Ok(layout) => alloc::alloc::handle_alloc_error(layout),
            Err(_) => capacity_overflow(),
        },
        Err(BufferError::CapacityOverflow) => capacity_overflow(),
        Err(err @ BufferError::ShrinkOutOfBounds { .. }) => panic!("{err}"),
    }
}

#[cold]
#[track_caller]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages() {
        assert_eq!(AllocError.to_string(), "memory allocation failed");
        assert_eq!(
            BufferError::AllocFailed { capacity: 182 }.to_string(),
            "failed to allocate 182 bytes"
        );
        assert_eq!(
            BufferError::ShrinkOutOfBounds { requested: 5, len: 3 }.to_string(),
            "cannot shrink by 5 bytes: only 3 bytes buffered"
        );
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn overflow_is_fatal() {
        unwrap_or_abort::<()>(Err(BufferError::CapacityOverflow));
    }

    #[test]
    #[should_panic(expected = "cannot shrink by 2 bytes")]
    fn shrink_error_is_fatal() {
        unwrap_or_abort::<()>(Err(BufferError::ShrinkOutOfBounds { requested: 2, len: 1 }));
    }
}
