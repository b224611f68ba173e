//! Representation store: two overlapping layouts sharing one tagged length.
//!
//! ```text
//! little-endian                              big-endian
//! +---------------------------+--------+     +--------+---------------------------+
//! | payload (union)           | len|T  |     | T|len  | payload (union)           |
//! |  inline: [u8; N]          |        |     |        |  inline: [u8; N]          |
//! |  dynamic: ptr, cap        |        |     |        |  dynamic: ptr, cap        |
//! +---------------------------+--------+     +--------+---------------------------+
//!                                     ^        ^
//!                                     tag byte (most significant byte of len)
//! ```
//!
//! The length word is ordered after the payload on little-endian targets and
//! before it on big-endian ones, so the byte holding the tag bit is always the
//! outermost byte of the record and sits at the same offset for both layouts.

use core::{
    mem::MaybeUninit,
    ptr::NonNull,
};

/// Most significant bit of the length word. Set while the dynamic layout is
/// active.
pub(crate) const TAG_MASK: usize = 1 << (usize::BITS - 1);

/// Largest capacity a block may have. Keeps every length clear of the tag.
pub(crate) const MAX_CAPACITY: usize = !TAG_MASK;

/// Owning reference to a separately allocated block.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub(crate) struct DynamicRecord {
    pub(crate) ptr: NonNull<u8>,
    pub(crate) cap: usize,
}

#[derive(Clone, Copy)]
#[repr(C)]
union Payload<const N: usize> {
    inline: [MaybeUninit<u8>; N],
    dynamic: DynamicRecord,
}

#[cfg(target_endian = "little")]
#[repr(C)]
pub(crate) struct Repr<const N: usize> {
    payload: Payload<N>,
    tagged_len: usize,
}

#[cfg(target_endian = "big")]
#[repr(C)]
pub(crate) struct Repr<const N: usize> {
    tagged_len: usize,
    payload: Payload<N>,
}

impl<const N: usize> Repr<N> {
    /// Offset, from the start of the record, of the byte carrying the tag bit.
    #[cfg(all(test, target_endian = "little"))]
    pub(crate) const TAG_BYTE_OFFSET: usize =
        core::mem::offset_of!(Self, tagged_len) + size_of::<usize>() - 1;
    #[cfg(all(test, target_endian = "big"))]
    pub(crate) const TAG_BYTE_OFFSET: usize = core::mem::offset_of!(Self, tagged_len);

    pub(crate) const fn new() -> Self {
        const { assert!(N < TAG_MASK, "inline capacity collides with the tag bit") };
        Self {
            payload: Payload {
                inline: [MaybeUninit::uninit(); N],
            },
            tagged_len: 0,
        }
    }

    #[inline]
    pub(crate) const fn is_dynamic(&self) -> bool {
        self.tagged_len & TAG_MASK != 0
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.tagged_len & !TAG_MASK
    }

    /// # Safety
    ///
    /// `len` must not exceed [`capacity`](Self::capacity), and the first
    /// `len` bytes must be initialized before they are read.
    #[inline]
    pub(crate) unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.capacity());
        self.tagged_len = len | (self.tagged_len & TAG_MASK);
    }

    #[inline]
    pub(crate) fn dynamic(&self) -> Option<DynamicRecord> {
        if self.is_dynamic() {
            // SAFETY: the tag says the dynamic record is the active field.
            Some(unsafe { self.payload.dynamic })
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.dynamic().map_or(N, |record| record.cap)
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const u8 {
        match self.dynamic() {
            Some(record) => record.ptr.as_ptr(),
            // SAFETY: inline is active; taking its address reads nothing.
            None => unsafe { self.payload.inline.as_ptr().cast() },
        }
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        match self.dynamic() {
            Some(record) => record.ptr.as_ptr(),
            // SAFETY: inline is active; taking its address reads nothing.
            None => unsafe { self.payload.inline.as_mut_ptr().cast() },
        }
    }

    /// Switches to (or replaces) the dynamic record.
    ///
    /// The previous block, if any, must already have been released or handed
    /// elsewhere.
    ///
    /// # Safety
    ///
    /// `record.ptr` must be valid for `record.cap` bytes with the first `len`
    /// initialized, `len <= record.cap`, and `N < record.cap <= MAX_CAPACITY`.
    #[inline]
    pub(crate) unsafe fn install_dynamic(&mut self, record: DynamicRecord, len: usize) {
        debug_assert!(len <= record.cap && record.cap <= MAX_CAPACITY && record.cap > N);
        self.payload.dynamic = record;
        self.tagged_len = len | TAG_MASK;
    }

    /// Re-establishes the empty inline layout.
    ///
    /// The block referenced by the dynamic record, if any, must already have
    /// been released or handed elsewhere.
    #[inline]
    pub(crate) fn clear_to_inline(&mut self) {
        self.tagged_len = 0;
    }
}
