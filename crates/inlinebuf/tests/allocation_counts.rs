#![allow(missing_docs)]

use std::{
    ptr::NonNull,
    sync::atomic::{AtomicUsize, Ordering},
};

use inlinebuf::{AllocError, Allocator, ByteBuffer, DEFAULT_INLINE_CAPACITY, Doubling, Global};

/// A user-provided allocator: counts blocks and bytes in flight and can be
/// told to refuse requests above a size limit.
#[derive(Debug)]
struct Tracked {
    allocations: AtomicUsize,
    live: AtomicUsize,
    limit: usize,
}

impl Tracked {
    const fn new(limit: usize) -> Self {
        Self {
            allocations: AtomicUsize::new(0),
            live: AtomicUsize::new(0),
            limit,
        }
    }

    fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

// SAFETY: blocks come from `Global` and are returned to it with their size.
unsafe impl Allocator for Tracked {
    fn allocate(&self, len: usize) -> Result<NonNull<u8>, AllocError> {
        if len > self.limit {
            return Err(AllocError);
        }
        let block = Global.allocate(len)?;
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.live.fetch_add(len, Ordering::Relaxed);
        Ok(block)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, len: usize) {
        self.live.fetch_sub(len, Ordering::Relaxed);
        // SAFETY: forwarded contract.
        unsafe { Global.deallocate(block, len) }
    }
}

type Buf<'a> = ByteBuffer<DEFAULT_INLINE_CAPACITY, &'a Tracked>;

#[test]
fn inline_workloads_never_reach_the_allocator() {
    let alloc = Tracked::new(usize::MAX);
    let mut buf = Buf::new_in(&alloc);
    for round in 0..1_000u32 {
        buf.push_str("key=");
        buf.extend_from_slice(&round.to_le_bytes());
        buf.push(b';');
        if buf.len() > DEFAULT_INLINE_CAPACITY - 9 {
            buf.reset();
        }
    }
    assert!(buf.is_inline());
    assert_eq!(alloc.allocations(), 0);
}

#[test]
fn one_byte_appends_allocate_logarithmically() {
    let alloc = Tracked::new(usize::MAX);
    let mut buf = Buf::new_in(&alloc);
    for i in 0..50_000usize {
        buf.push(i.to_le_bytes()[0]);
    }
    assert_eq!(buf.len(), 50_000);
    assert!(alloc.allocations() <= 16, "{} allocations", alloc.allocations());
    drop(buf);
    assert_eq!(alloc.live(), 0);
}

#[test]
fn clones_and_moves_account_for_every_block() {
    let alloc = Tracked::new(usize::MAX);
    {
        let mut a = Buf::new_in(&alloc);
        a.extend_from_slice(&[b'x'; 500]);
        let b = a.clone();
        assert_eq!(alloc.allocations(), 2);

        let c = a.take();
        assert_eq!(alloc.allocations(), 2);
        assert_eq!(b, c);

        a.clone_from(&c);
        assert_eq!(alloc.allocations(), 3);
        assert!(alloc.live() > 0);
    }
    assert_eq!(alloc.live(), 0);
}

#[test]
fn refused_growth_keeps_the_old_block() {
    let alloc = Tracked::new(256);
    let mut buf = ByteBuffer::<8, &Tracked, Doubling>::new_in(&alloc);
    buf.extend_from_slice(&[1; 100]);
    let (ptr, capacity) = (buf.as_ptr(), buf.capacity());

    assert!(buf.try_extend_from_slice(&[2; 300]).is_err());
    assert_eq!((buf.as_ptr(), buf.capacity()), (ptr, capacity));
    assert_eq!(buf, [1u8; 100]);
    assert_eq!(alloc.allocations(), 1);
}

#[test]
fn shared_allocator_across_threads() {
    static SHARED: Tracked = Tracked::new(usize::MAX);
    let handles: Vec<_> = (0..4u8)
        .map(|id| {
            std::thread::spawn(move || {
                let mut buf = Buf::new_in(&SHARED);
                buf.extend_from_slice(&[id; 300]);
                buf.iter().all(|&b| b == id)
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(SHARED.live(), 0);
}
