//! A growable byte buffer with inline small-buffer storage.
//!
//! [`ByteBuffer`] keeps short payloads inside its own fixed footprint and
//! moves to an allocated block only when a payload outgrows the inline
//! storage. Both representations overlap in the same bytes; one bit of the
//! length word tells them apart. It is meant as scratch space for
//! serializers and formatters: reserve a tail with
//! [`append`](ByteBuffer::append), write into it, then give back what was not
//! used with [`shrink`](ByteBuffer::shrink).
//!
//! ```rust
//! use inlinebuf::ByteBuffer;
//!
//! fn write_decimal(buf: &mut ByteBuffer, mut value: u64) {
//!     let tail = buf.append(20);
//!     let mut at = tail.len();
//!     loop {
//!         at -= 1;
//!         tail[at] = b'0' + (value % 10) as u8;
//!         value /= 10;
//!         if value == 0 {
//!             break;
//!         }
//!     }
//!     let used = tail.len() - at;
//!     tail.copy_within(at.., 0);
//!     buf.shrink(20 - used);
//! }
//!
//! let mut buf: ByteBuffer = ByteBuffer::new();
//! buf.push_str("id=");
//! write_decimal(&mut buf, 4096);
//! assert_eq!(buf, "id=4096");
//! assert!(buf.is_inline());
//! ```
//!
//! # Features
//!
//! - `std`: implements `std::io::Write`.
//! - `serde`: `Serialize` / `Deserialize` as a byte string.
//! - `tracing`: trace events on promotion and reallocation, debug events on
//!   allocation failure.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

/// Emits a `tracing` event when the `tracing` feature is enabled, and nothing
/// otherwise.
macro_rules! event {
    (trace, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)+);
    };
    (debug, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)+);
    };
}

mod allocator;
mod buffer;
mod error;
mod growth;
mod repr;
#[cfg(feature = "serde")]
mod serde;
mod value;
mod view;
mod write;

#[cfg(test)]
mod tests;

pub use allocator::{Allocator, Global};
pub use buffer::{ByteBuffer, DEFAULT_INLINE_CAPACITY};
pub use error::{AllocError, BufferError};
pub use growth::{Doubling, GrowthPolicy, OneAndHalf};
