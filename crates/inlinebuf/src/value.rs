//! Copy, copy-assign and move-out transitions.
//!
//! Representation rules for `clone_from`:
//!
//! | source  | destination before          | destination after                 |
//! |---------|-----------------------------|-----------------------------------|
//! | inline  | inline                      | inline, bytes copied              |
//! | inline  | dynamic                     | dynamic, same block               |
//! | dynamic | dynamic, `cap >= len`       | dynamic, same block               |
//! | dynamic | inline, or dynamic too small| dynamic, fresh block of source cap|
//!
//! A destination that switches to a non-interchangeable allocator
//! ([`Allocator::PROPAGATE_ON_CLONE_FROM`]) cannot keep its block: it gives
//! it back and ends up inline (inline source) or in a fresh block from the new
//! allocator (dynamic source).

use core::{mem, ptr};

use crate::{
    allocator::Allocator,
    buffer::ByteBuffer,
    error::{BufferError, unwrap_or_abort},
    growth::GrowthPolicy,
};

impl<const N: usize, A: Allocator, G: GrowthPolicy> ByteBuffer<N, A, G> {
    /// Fallible version of [`Clone::clone`].
    ///
    /// An inline source is copied inline. A dynamic source is copied into a
    /// block of the same capacity, taken from
    /// [`select_on_clone`](Allocator::select_on_clone).
    ///
    /// # Errors
    ///
    /// [`BufferError::AllocFailed`] if the block cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, BufferError>
    where
        A: Clone,
    {
        let mut out = Self::new_in(self.alloc.select_on_clone());
        match self.repr.dynamic() {
            Some(record) => {
                let fresh = Self::fresh_block(&out.alloc, self.as_slice(), record.cap)?;
                // SAFETY: allocated by `out.alloc` and holding our bytes.
                unsafe { out.replace_dynamic(fresh, self.len()) };
            }
            None => out.copy_in_place(self.as_slice()),
        }
        Ok(out)
    }

    /// Fallible version of [`Clone::clone_from`]. See the module docs for the
    /// representation the destination ends up in.
    ///
    /// # Errors
    ///
    /// [`BufferError::AllocFailed`] if a block is needed and cannot be
    /// allocated; `self` is unchanged in that case.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), BufferError>
    where
        A: Clone,
    {
        let bytes = source.as_slice();

        if A::PROPAGATE_ON_CLONE_FROM && !self.alloc.is_interchangeable(&source.alloc) {
            let alloc = source.alloc.clone();
            let fresh = match source.repr.dynamic() {
                Some(record) => Some(Self::fresh_block(&alloc, bytes, record.cap)?),
                None => None,
            };
            self.release();
            self.alloc = alloc;
            match fresh {
                // SAFETY: allocated by the allocator `self` now holds.
                Some(record) => unsafe { self.replace_dynamic(record, bytes.len()) },
                None => self.copy_in_place(bytes),
            }
            return Ok(());
        }

        let fits = bytes.len() <= self.capacity();
        if fits && (self.is_dynamic() || source.is_inline()) {
            self.copy_in_place(bytes);
        } else {
            let capacity = source.capacity();
            let fresh = Self::fresh_block(&self.alloc, bytes, capacity)?;
            // SAFETY: allocated by `self.alloc` and holding the source bytes.
            unsafe { self.replace_dynamic(fresh, bytes.len()) };
        }
        if A::PROPAGATE_ON_CLONE_FROM {
            self.alloc = source.alloc.clone();
        }
        Ok(())
    }

    /// Moves the contents out, leaving `self` empty and inline.
    ///
    /// A dynamic buffer hands over its block without copying a byte; an
    /// inline one is copied along with the value. `self` keeps a clone of its
    /// allocator. Move-assignment is `*dst = src.take()`.
    #[must_use = "use `reset` to discard the contents"]
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::new_in(self.alloc.clone());
        mem::replace(self, empty)
    }

    /// Copies `bytes` into the active storage, replacing the contents.
    fn copy_in_place(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= self.capacity());
        // SAFETY: `bytes` belongs to another buffer (or is otherwise borrowed
        // independently of `self`) and fits in our storage.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.repr.as_mut_ptr(), bytes.len());
            self.repr.set_len(bytes.len());
        }
    }
}

impl<const N: usize, A: Allocator + Clone, G: GrowthPolicy> Clone for ByteBuffer<N, A, G> {
    fn clone(&self) -> Self {
        unwrap_or_abort(self.try_clone())
    }

    fn clone_from(&mut self, source: &Self) {
        unwrap_or_abort(self.try_clone_from(source));
    }
}
