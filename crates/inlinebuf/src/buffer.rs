use core::{
    marker::PhantomData,
    mem::{MaybeUninit, size_of},
    ptr, slice,
};

use crate::{
    allocator::{Allocator, Global},
    error::{AllocError, BufferError, unwrap_or_abort},
    growth::{GrowthPolicy, OneAndHalf},
    repr::{DynamicRecord, MAX_CAPACITY, Repr},
};

/// Inline capacity that gives [`ByteBuffer`] a footprint of 128 bytes.
pub const DEFAULT_INLINE_CAPACITY: usize = 128 - size_of::<usize>();

/// A growable byte buffer that stores up to `N` bytes inline.
///
/// Short payloads live inside the buffer value itself. Once a payload
/// outgrows `N` bytes the buffer promotes to a block obtained from its
/// [`Allocator`]; from then on it stays promoted and keeps its capacity across
/// [`shrink`](Self::shrink) and [`reset`](Self::reset). The size of the value
/// is the same in both cases (see [`FOOTPRINT`](Self::FOOTPRINT)).
///
/// The typical write cycle is: [`append`](Self::append) reserves a tail and
/// hands it out for filling, [`shrink`](Self::shrink) gives back whatever was
/// over-provisioned, the contents are read through the slice view, and
/// [`reset`](Self::reset) starts over.
///
/// ```rust
/// use inlinebuf::ByteBuffer;
///
/// let mut buf: ByteBuffer = ByteBuffer::new();
/// buf.append(4).copy_from_slice(b"abcd");
/// assert_eq!(buf, "abcd");
/// assert!(buf.is_inline());
///
/// buf.extend_from_slice(&[b'!'; 200]);
/// assert!(buf.is_dynamic());
/// buf.reset();
/// assert!(buf.is_empty());
/// assert!(buf.capacity() >= 204);
/// ```
pub struct ByteBuffer<
    const N: usize = DEFAULT_INLINE_CAPACITY,
    A: Allocator = Global,
    G: GrowthPolicy = OneAndHalf,
> {
    pub(crate) repr: Repr<N>,
    pub(crate) alloc: A,
    growth: PhantomData<fn() -> G>,
}

// SAFETY: the block is owned exclusively by the buffer, as a `Vec<u8>` owns
// its heap allocation.
unsafe impl<const N: usize, A: Allocator + Send, G: GrowthPolicy> Send for ByteBuffer<N, A, G> {}

// SAFETY: shared access only reads the block.
unsafe impl<const N: usize, A: Allocator + Sync, G: GrowthPolicy> Sync for ByteBuffer<N, A, G> {}

impl<const N: usize> ByteBuffer<N> {
    /// Creates an empty inline buffer backed by the global heap.
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty buffer able to hold `capacity` bytes without further
    /// allocation.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds `isize::MAX`; aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) if the
    /// allocation fails.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> ByteBuffer<N, A, G> {
    /// Number of bytes held without allocating.
    pub const INLINE_CAPACITY: usize = N;

    /// Size of a buffer value in bytes, whichever representation is active.
    pub const FOOTPRINT: usize = size_of::<Self>();

    /// Creates an empty inline buffer that will allocate from `alloc` once it
    /// outgrows its inline storage.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            repr: Repr::new(),
            alloc,
            growth: PhantomData,
        }
    }

    /// Like [`with_capacity`](ByteBuffer::with_capacity), with an explicit
    /// allocator.
    ///
    /// # Panics
    ///
    /// See [`with_capacity`](ByteBuffer::with_capacity).
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        unwrap_or_abort(Self::try_with_capacity_in(capacity, alloc))
    }

    /// Fallible version of [`with_capacity_in`](Self::with_capacity_in).
    ///
    /// # Errors
    ///
    /// [`BufferError::CapacityOverflow`] if `capacity > isize::MAX`,
    /// [`BufferError::AllocFailed`] if the allocator refuses the block.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, BufferError> {
        let mut buf = Self::new_in(alloc);
        if capacity > N {
            if capacity > MAX_CAPACITY {
                return Err(BufferError::CapacityOverflow);
            }
            buf.relocate(capacity)?;
        }
        Ok(buf)
    }

    /// Number of bytes currently held.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.repr.len()
    }

    /// Whether the buffer holds no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.repr.len() == 0
    }

    /// Number of bytes the buffer can hold before it has to allocate.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.repr.capacity()
    }

    /// Whether the contents live inside the buffer value.
    #[inline]
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        !self.repr.is_dynamic()
    }

    /// Whether the contents live in an allocated block.
    #[inline]
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.repr.is_dynamic()
    }

    /// The allocator blocks are obtained from.
    #[inline]
    #[must_use]
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Extends the buffer by `amt` zeroed bytes and returns them for filling.
    ///
    /// Stays inline, without allocating, while the total fits in `N` bytes.
    /// Repeated calls cost amortized O(1) per byte.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) if allocation
    /// fails.
    pub fn append(&mut self, amt: usize) -> &mut [u8] {
        unwrap_or_abort(self.try_append(amt))
    }

    /// Fallible version of [`append`](Self::append).
    ///
    /// # Errors
    ///
    /// Fails with [`BufferError::CapacityOverflow`] or
    /// [`BufferError::AllocFailed`], leaving the buffer untouched.
    pub fn try_append(&mut self, amt: usize) -> Result<&mut [u8], BufferError> {
        // SAFETY: the whole tail is initialized before it is handed out.
        let tail = unsafe { self.try_append_uninit(amt)? };
        tail.fill(MaybeUninit::new(0));
        // SAFETY: every element was just written.
        Ok(unsafe { &mut *(ptr::from_mut(tail) as *mut [u8]) })
    }

    /// Extends the buffer by `amt` bytes without initializing them.
    ///
    /// # Safety
    ///
    /// Every byte of the returned range must be written before the contents
    /// of the buffer are read in any way (slice view, comparison, clone,
    /// formatting).
    ///
    /// # Panics
    ///
    /// As [`append`](Self::append).
    pub unsafe fn append_uninit(&mut self, amt: usize) -> &mut [MaybeUninit<u8>] {
        // SAFETY: forwarded to the caller.
        unwrap_or_abort(unsafe { self.try_append_uninit(amt) })
    }

    /// Fallible version of [`append_uninit`](Self::append_uninit).
    ///
    /// # Safety
    ///
    /// As [`append_uninit`](Self::append_uninit).
    ///
    /// # Errors
    ///
    /// As [`try_append`](Self::try_append).
    pub unsafe fn try_append_uninit(
        &mut self,
        amt: usize,
    ) -> Result<&mut [MaybeUninit<u8>], BufferError> {
        let len = self.repr.len();
        let new_len = len.checked_add(amt).ok_or(BufferError::CapacityOverflow)?;
        if new_len > self.repr.capacity() {
            self.grow_to(new_len)?;
        }
        // SAFETY: capacity covers `new_len` and the caller initializes the
        // tail before anything reads it.
        unsafe {
            self.repr.set_len(new_len);
            Ok(slice::from_raw_parts_mut(
                self.repr.as_mut_ptr().add(len).cast(),
                amt,
            ))
        }
    }

    /// Ensures room for `additional` more bytes without changing the length.
    ///
    /// # Panics
    ///
    /// As [`append`](Self::append).
    pub fn reserve(&mut self, additional: usize) {
        unwrap_or_abort(self.try_reserve(additional));
    }

    /// Fallible version of [`reserve`](Self::reserve).
    ///
    /// # Errors
    ///
    /// As [`try_append`](Self::try_append).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        let required = self
            .repr
            .len()
            .checked_add(additional)
            .ok_or(BufferError::CapacityOverflow)?;
        if required > self.repr.capacity() {
            self.grow_to(required)?;
        }
        Ok(())
    }

    /// Appends a single byte.
    ///
    /// # Panics
    ///
    /// As [`append`](Self::append).
    pub fn push(&mut self, byte: u8) {
        unwrap_or_abort(self.try_push(byte));
    }

    /// Fallible version of [`push`](Self::push).
    ///
    /// # Errors
    ///
    /// As [`try_append`](Self::try_append).
    pub fn try_push(&mut self, byte: u8) -> Result<(), BufferError> {
        self.try_extend_from_slice(&[byte])
    }

    /// Appends a copy of `bytes`.
    ///
    /// # Panics
    ///
    /// As [`append`](Self::append).
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        unwrap_or_abort(self.try_extend_from_slice(bytes));
    }

    /// Fallible version of [`extend_from_slice`](Self::extend_from_slice).
    ///
    /// # Errors
    ///
    /// As [`try_append`](Self::try_append).
    pub fn try_extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        // SAFETY: the tail is filled from `bytes` right away.
        let tail = unsafe { self.try_append_uninit(bytes.len())? };
        // SAFETY: `bytes` is borrowed independently of `self`, so it cannot
        // overlap the fresh tail, and both are `bytes.len()` long.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), tail.as_mut_ptr().cast(), bytes.len());
        }
        Ok(())
    }

    /// Appends the UTF-8 bytes of `s`.
    ///
    /// # Panics
    ///
    /// As [`append`](Self::append).
    pub fn push_str(&mut self, s: &str) {
        self.extend_from_slice(s.as_bytes());
    }

    /// Removes `n` bytes from the end. Capacity and representation are kept.
    ///
    /// # Panics
    ///
    /// Panics if `n > self.len()`.
    #[track_caller]
    pub fn shrink(&mut self, n: usize) {
        if let Err(err) = self.try_shrink(n) {
            panic!("{err}");
        }
    }

    /// Checked version of [`shrink`](Self::shrink).
    ///
    /// # Errors
    ///
    /// [`BufferError::ShrinkOutOfBounds`] if `n > self.len()`; the buffer is
    /// left unchanged.
    pub fn try_shrink(&mut self, n: usize) -> Result<(), BufferError> {
        let len = self.repr.len();
        let Some(new_len) = len.checked_sub(n) else {
            return Err(BufferError::ShrinkOutOfBounds { requested: n, len });
        };
        // SAFETY: a prefix of initialized bytes.
        unsafe { self.repr.set_len(new_len) };
        Ok(())
    }

    /// Shortens the buffer to `len` bytes. Does nothing if it is already
    /// that short.
    pub fn truncate(&mut self, len: usize) {
        if let Some(excess) = self.repr.len().checked_sub(len) {
            self.shrink(excess);
        }
    }

    /// Empties the buffer, keeping its representation and capacity.
    #[inline]
    pub fn reset(&mut self) {
        // SAFETY: zero bytes are trivially initialized.
        unsafe { self.repr.set_len(0) };
    }

    #[cold]
    #[inline(never)]
    fn grow_to(&mut self, required: usize) -> Result<(), BufferError> {
        if required > MAX_CAPACITY {
            return Err(BufferError::CapacityOverflow);
        }
        let capacity = G::grow(self.repr.capacity(), required)
            .map(|cap| cap.min(MAX_CAPACITY))
            .filter(|&cap| cap >= required)
            .ok_or(BufferError::CapacityOverflow)?;
        self.relocate(capacity)
    }

    /// Moves the contents into a fresh block of exactly `capacity` bytes.
    fn relocate(&mut self, capacity: usize) -> Result<(), BufferError> {
        let len = self.repr.len();
        let record = Self::fresh_block(&self.alloc, self.as_slice(), capacity)?;
        event!(
            trace,
            from_capacity = self.repr.capacity(),
            to_capacity = capacity,
            len,
            "buffer relocated"
        );
        // SAFETY: `record` came from our allocator and holds our `len` bytes.
        unsafe { self.replace_dynamic(record, len) };
        Ok(())
    }

    /// Allocates `capacity` bytes from `alloc` and copies `bytes` to the
    /// front. Nothing is mutated if the allocation fails.
    pub(crate) fn fresh_block(
        alloc: &A,
        bytes: &[u8],
        capacity: usize,
    ) -> Result<DynamicRecord, BufferError> {
        debug_assert!(N < capacity && bytes.len() <= capacity && capacity <= MAX_CAPACITY);
        let ptr = alloc.allocate(capacity).map_err(|AllocError| {
            event!(debug, capacity, "buffer allocation failed");
            BufferError::AllocFailed { capacity }
        })?;
        // SAFETY: the block is fresh, so disjoint from `bytes`, and large
        // enough to hold them.
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len()) };
        Ok(DynamicRecord { ptr, cap: capacity })
    }

    /// Installs `record` as the active block and releases the previous one.
    ///
    /// # Safety
    ///
    /// `record` must come from `self.alloc` (or an allocator interchangeable
    /// with it) and hold `len` initialized bytes, with `N < record.cap`.
    pub(crate) unsafe fn replace_dynamic(&mut self, record: DynamicRecord, len: usize) {
        let previous = self.repr.dynamic();
        // SAFETY: forwarded to the caller.
        unsafe { self.repr.install_dynamic(record, len) };
        if let Some(old) = previous {
            // SAFETY: the old block was ours and is no longer referenced.
            unsafe { self.alloc.deallocate(old.ptr, old.cap) };
        }
    }

    /// Gives the block back to the allocator and returns to the empty inline
    /// layout.
    pub(crate) fn release(&mut self) {
        if let Some(record) = self.repr.dynamic() {
            self.repr.clear_to_inline();
            // SAFETY: the record is unreachable from now on.
            unsafe { self.alloc.deallocate(record.ptr, record.cap) };
        }
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> Drop for ByteBuffer<N, A, G> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<const N: usize, A: Allocator + Default, G: GrowthPolicy> Default for ByteBuffer<N, A, G> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}
