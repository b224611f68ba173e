use core::{fmt, marker::PhantomData};

use ::serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{Error, SeqAccess, Visitor},
};

use crate::{allocator::Allocator, buffer::ByteBuffer, growth::GrowthPolicy};

/// Upper bound on what a sequence's own size hint may preallocate. Larger
/// inputs still grow through the normal append path.
const MAX_PREALLOCATION: usize = 4096;

impl<const N: usize, A: Allocator, G: GrowthPolicy> Serialize for ByteBuffer<N, A, G> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.as_slice())
    }
}

impl<'de, const N: usize, A: Allocator + Default, G: GrowthPolicy> Deserialize<'de>
    for ByteBuffer<N, A, G>
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_byte_buf(BufferVisitor(PhantomData))
    }
}

struct BufferVisitor<const N: usize, A: Allocator, G: GrowthPolicy>(
    PhantomData<fn() -> ByteBuffer<N, A, G>>,
);

impl<'de, const N: usize, A: Allocator + Default, G: GrowthPolicy> Visitor<'de>
    for BufferVisitor<N, A, G>
{
    type Value = ByteBuffer<N, A, G>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a byte string")
    }

    fn visit_bytes<E: Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        let mut buf = ByteBuffer::default();
        buf.try_extend_from_slice(v).map_err(E::custom)?;
        Ok(buf)
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        self.visit_bytes(v.as_bytes())
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
        let mut buf = ByteBuffer::default();
        if let Some(hint) = seq.size_hint() {
            buf.try_reserve(hint.min(MAX_PREALLOCATION))
                .map_err(S::Error::custom)?;
        }
        while let Some(byte) = seq.next_element::<u8>()? {
            buf.try_push(byte).map_err(S::Error::custom)?;
        }
        Ok(buf)
    }
}
