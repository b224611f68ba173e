//! Benchmark – `inlinebuf::ByteBuffer` against `Vec<u8>` as scratch space
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use inlinebuf::{ByteBuffer, DEFAULT_INLINE_CAPACITY, Doubling, Global, GrowthPolicy};

/// Deterministic record fragments, `count` of them, each `width` bytes long.
fn make_fragments(count: usize, width: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let seed = i.to_le_bytes()[0];
            (0..width)
                .map(|j| seed.wrapping_add(j.to_le_bytes()[0]))
                .collect()
        })
        .collect()
}

/// Writes every fragment through an over-provisioned tail, then gives back
/// the unused part.
fn fill_buffer<G: GrowthPolicy>(
    buf: &mut ByteBuffer<DEFAULT_INLINE_CAPACITY, Global, G>,
    fragments: &[Vec<u8>],
) -> usize {
    buf.reset();
    for fragment in fragments {
        let tail = buf.append(fragment.len() + 8);
        tail[..fragment.len()].copy_from_slice(fragment);
        buf.shrink(8);
    }
    buf.len()
}

fn fill_vec(vec: &mut Vec<u8>, fragments: &[Vec<u8>]) -> usize {
    vec.clear();
    for fragment in fragments {
        let start = vec.len();
        vec.resize(start + fragment.len() + 8, 0);
        vec[start..start + fragment.len()].copy_from_slice(fragment);
        vec.truncate(vec.len() - 8);
    }
    vec.len()
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    // Small workloads stay inside the inline storage; large ones promote.
    for &(count, width) in &[(4usize, 16usize), (64, 16), (1_024, 64)] {
        let fragments = make_fragments(count, width);
        let label = format!("{count}x{width}");
        group.throughput(Throughput::Bytes((count * width) as u64));

        group.bench_with_input(BenchmarkId::new("fresh_bytebuffer", &label), &fragments, |b, f| {
            b.iter(|| {
                let mut buf: ByteBuffer = ByteBuffer::new();
                black_box(fill_buffer(&mut buf, black_box(f)));
            });
        });
        group.bench_with_input(BenchmarkId::new("fresh_vec", &label), &fragments, |b, f| {
            b.iter(|| {
                let mut vec = Vec::new();
                black_box(fill_vec(&mut vec, black_box(f)));
            });
        });
        group.bench_with_input(BenchmarkId::new("reused_bytebuffer", &label), &fragments, |b, f| {
            let mut buf: ByteBuffer = ByteBuffer::new();
            b.iter(|| black_box(fill_buffer(&mut buf, black_box(f))));
        });
        group.bench_with_input(BenchmarkId::new("reused_doubling", &label), &fragments, |b, f| {
            let mut buf = ByteBuffer::<DEFAULT_INLINE_CAPACITY, Global, Doubling>::new_in(Global);
            b.iter(|| black_box(fill_buffer(&mut buf, black_box(f))));
        });
    }
    group.finish();
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    for &len in &[64usize, 4_096, 65_536] {
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("bytebuffer", len), &len, |b, &len| {
            b.iter(|| {
                let mut buf: ByteBuffer = ByteBuffer::new();
                for i in 0..len {
                    buf.push(i.to_le_bytes()[0]);
                }
                black_box(buf.len())
            });
        });
        group.bench_with_input(BenchmarkId::new("vec", len), &len, |b, &len| {
            b.iter(|| {
                let mut vec = Vec::new();
                for i in 0..len {
                    vec.push(i.to_le_bytes()[0]);
                }
                black_box(vec.len())
            });
        });
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(5));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_append, bench_push }
criterion_main!(benches);
