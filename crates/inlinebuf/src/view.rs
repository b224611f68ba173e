//! Read-only access to the buffered bytes.
//!
//! Every accessor resolves the active representation through the tag bit, so
//! the view costs the same whether the buffer is inline or dynamic. Comparisons
//! look only at the bytes.

use alloc::vec::Vec;
use core::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    slice,
};

use bstr::BStr;

use crate::{allocator::Allocator, buffer::ByteBuffer, growth::GrowthPolicy};

impl<const N: usize, A: Allocator, G: GrowthPolicy> ByteBuffer<N, A, G> {
    /// The buffered bytes.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the first `len` bytes of the active storage are initialized
        // and the pointer is never null.
        unsafe { slice::from_raw_parts(self.repr.as_ptr(), self.repr.len()) }
    }

    /// The buffered bytes as a byte string, for lossy text inspection.
    #[inline]
    #[must_use]
    pub fn as_bstr(&self) -> &BStr {
        BStr::new(self.as_slice())
    }

    /// Pointer to the first buffered byte. Stable until the next operation
    /// that reallocates.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.repr.as_ptr()
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> Deref for ByteBuffer<N, A, G> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> AsRef<[u8]> for ByteBuffer<N, A, G> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> Borrow<[u8]> for ByteBuffer<N, A, G> {
    #[inline]
    fn borrow(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<'a, const N: usize, A: Allocator, G: GrowthPolicy> IntoIterator for &'a ByteBuffer<N, A, G> {
    type Item = &'a u8;
    type IntoIter = slice::Iter<'a, u8>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<const N: usize, const M: usize, A, B, G, H> PartialEq<ByteBuffer<M, B, H>>
    for ByteBuffer<N, A, G>
where
    A: Allocator,
    B: Allocator,
    G: GrowthPolicy,
    H: GrowthPolicy,
{
    #[inline]
    fn eq(&self, other: &ByteBuffer<M, B, H>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> Eq for ByteBuffer<N, A, G> {}

macro_rules! impl_eq_bytes {
    ($($rhs:ty),* $(,)?) => {$(
        impl<const N: usize, A: Allocator, G: GrowthPolicy> PartialEq<$rhs> for ByteBuffer<N, A, G> {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool {
                self.as_slice() == AsRef::<[u8]>::as_ref(other)
            }
        }

        impl<const N: usize, A: Allocator, G: GrowthPolicy> PartialEq<ByteBuffer<N, A, G>> for $rhs {
            #[inline]
            fn eq(&self, other: &ByteBuffer<N, A, G>) -> bool {
                AsRef::<[u8]>::as_ref(self) == other.as_slice()
            }
        }
    )*};
}

impl_eq_bytes!([u8], &[u8], str, &str, Vec<u8>, BStr);

impl<const N: usize, const K: usize, A: Allocator, G: GrowthPolicy> PartialEq<[u8; K]>
    for ByteBuffer<N, A, G>
{
    #[inline]
    fn eq(&self, other: &[u8; K]) -> bool {
        self.as_slice() == other
    }
}

impl<const N: usize, const K: usize, A: Allocator, G: GrowthPolicy> PartialEq<&[u8; K]>
    for ByteBuffer<N, A, G>
{
    #[inline]
    fn eq(&self, other: &&[u8; K]) -> bool {
        self.as_slice() == *other
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> PartialOrd for ByteBuffer<N, A, G> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> Ord for ByteBuffer<N, A, G> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> Hash for ByteBuffer<N, A, G> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> fmt::Debug for ByteBuffer<N, A, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_bstr(), f)
    }
}
