//! Adapters that let formatting and output layers write into a buffer.

use core::fmt;

use crate::{allocator::Allocator, buffer::ByteBuffer, growth::GrowthPolicy};

impl<const N: usize, A: Allocator, G: GrowthPolicy> fmt::Write for ByteBuffer<N, A, G> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.try_extend_from_slice(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

#[cfg(feature = "std")]
impl<const N: usize, A: Allocator, G: GrowthPolicy> std::io::Write for ByteBuffer<N, A, G> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.try_extend_from_slice(buf).map_err(std::io::Error::other)?;
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.try_extend_from_slice(buf).map_err(std::io::Error::other)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<const N: usize, A: Allocator, G: GrowthPolicy> Extend<u8> for ByteBuffer<N, A, G> {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for byte in iter {
            self.push(byte);
        }
    }
}

impl<'a, const N: usize, A: Allocator, G: GrowthPolicy> Extend<&'a u8> for ByteBuffer<N, A, G> {
    fn extend<I: IntoIterator<Item = &'a u8>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<const N: usize, A: Allocator + Default, G: GrowthPolicy> FromIterator<u8>
    for ByteBuffer<N, A, G>
{
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut buf = Self::default();
        buf.extend(iter);
        buf
    }
}

impl<const N: usize, A: Allocator + Default, G: GrowthPolicy> From<&[u8]> for ByteBuffer<N, A, G> {
    fn from(bytes: &[u8]) -> Self {
        let mut buf = Self::default();
        buf.extend_from_slice(bytes);
        buf
    }
}

impl<const N: usize, A: Allocator + Default, G: GrowthPolicy> From<&str> for ByteBuffer<N, A, G> {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes())
    }
}
