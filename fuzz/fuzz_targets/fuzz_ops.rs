#![no_main]
use std::{cell::Cell, ptr::NonNull};

use arbitrary::Arbitrary;
use inlinebuf::{AllocError, Allocator, ByteBuffer, Doubling, Global, GrowthPolicy, OneAndHalf};
use libfuzzer_sys::fuzz_target;

const INLINE: usize = 24;

/// Allocator that refuses requests once the fuzzer has armed it, and tracks
/// bytes in flight so leaks show up at the end of a run.
#[derive(Default)]
struct Flaky {
    refuse: Cell<bool>,
    live: Cell<usize>,
}

// SAFETY: blocks come from `Global` and go back to it unchanged.
unsafe impl Allocator for Flaky {
    fn allocate(&self, len: usize) -> Result<NonNull<u8>, AllocError> {
        if self.refuse.get() {
            return Err(AllocError);
        }
        let block = Global.allocate(len)?;
        self.live.set(self.live.get() + len);
        Ok(block)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, len: usize) {
        self.live.set(self.live.get() - len);
        // SAFETY: forwarded contract.
        unsafe { Global.deallocate(block, len) }
    }
}

#[derive(Arbitrary, Debug)]
enum Op {
    Append(Vec<u8>),
    AppendZeroed(u8),
    Push(u8),
    Shrink(u16),
    Truncate(u16),
    Reset,
    Reserve(u16),
    CloneFrom,
    CloneInto,
    Take,
    Refuse(bool),
}

#[derive(Arbitrary, Debug)]
struct Input {
    doubling: bool,
    ops: Vec<Op>,
}

type Buf<'a, G> = ByteBuffer<INLINE, &'a Flaky, G>;

fn run<G: GrowthPolicy>(ops: &[Op]) {
    let alloc = Flaky::default();
    {
        let mut buf = Buf::<G>::new_in(&alloc);
        let mut other = Buf::<G>::new_in(&alloc);
        let mut model: Vec<u8> = Vec::new();

        for op in ops {
            let was_dynamic = buf.is_dynamic();
            let before = (buf.as_ptr(), buf.capacity());
            match op {
                Op::Append(bytes) => match buf.try_extend_from_slice(bytes) {
                    Ok(()) => model.extend_from_slice(bytes),
                    Err(_) => assert_eq!((buf.as_ptr(), buf.capacity()), before),
                },
                Op::AppendZeroed(n) => {
                    let n = usize::from(*n);
                    if let Ok(tail) = buf.try_append(n) {
                        assert!(tail.iter().all(|&b| b == 0));
                        model.resize(model.len() + n, 0);
                    }
                }
                Op::Push(byte) => {
                    if buf.try_push(*byte).is_ok() {
                        model.push(*byte);
                    }
                }
                Op::Shrink(n) => {
                    let n = usize::from(*n);
                    if buf.try_shrink(n).is_ok() {
                        model.truncate(model.len() - n);
                    } else {
                        assert!(n > model.len());
                    }
                }
                Op::Truncate(len) => {
                    buf.truncate(usize::from(*len));
                    model.truncate(usize::from(*len));
                }
                Op::Reset => {
                    buf.reset();
                    model.clear();
                }
                Op::Reserve(n) => {
                    let n = usize::from(*n);
                    if buf.try_reserve(n).is_ok() {
                        assert!(buf.capacity() >= buf.len() + n);
                    }
                }
                Op::CloneFrom => {
                    let snapshot = other.to_vec();
                    if other.try_clone_from(&buf).is_ok() {
                        assert_eq!(other, buf);
                    } else {
                        assert_eq!(other, snapshot);
                    }
                }
                Op::CloneInto => {
                    if let Ok(copy) = buf.try_clone() {
                        assert_eq!(copy, buf);
                        other = copy;
                    }
                }
                Op::Take => {
                    let taken = buf.take();
                    assert!(buf.is_empty() && buf.is_inline());
                    buf = taken;
                }
                Op::Refuse(refuse) => alloc.refuse.set(*refuse),
            }

            assert_eq!(buf, model.as_slice());
            assert!(buf.capacity() >= buf.len());
            assert_eq!(buf.is_inline(), buf.capacity() == INLINE);
            assert!(!(was_dynamic && buf.is_inline()));
        }
    }
    assert_eq!(alloc.live.get(), 0);
}

fuzz_target!(|input: Input| {
    if input.doubling {
        run::<Doubling>(&input.ops);
    } else {
        run::<OneAndHalf>(&input.ops);
    }
});
