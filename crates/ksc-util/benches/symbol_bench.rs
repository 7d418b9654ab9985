//! Interner benchmarks.
//!
//! Run with: `cargo bench --bench symbol_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ksc_util::Interner;

/// Interning a string the interner has not seen before.
fn bench_intern_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern_miss");
    group.throughput(Throughput::Elements(1));

    group.bench_function("new_string", |b| {
        let mut interner = Interner::new();
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            black_box(interner.intern(&format!("sym_{counter}")))
        })
    });

    group.finish();
}

/// Interning a string the interner has already seen.
fn bench_intern_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern_hit");
    group.throughput(Throughput::Elements(1));

    group.bench_function("existing_string", |b| {
        let mut interner = Interner::new();
        interner.intern("existing_string");
        b.iter(|| black_box(interner.intern("existing_string")))
    });

    group.finish();
}

/// Symbol-to-symbol comparison, once interned.
fn bench_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparison");
    group.throughput(Throughput::Elements(1));

    let mut interner = Interner::new();
    let a = interner.intern("hello");
    let b1 = interner.intern("hello");
    let c1 = interner.intern("world");

    group.bench_function("symbol_eq_symbol", |b| {
        b.iter(|| {
            black_box(a == b1);
            black_box(a == c1);
        })
    });

    group.finish();
}

/// Resolving a symbol back to its text.
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    group.throughput(Throughput::Elements(1));

    let mut interner = Interner::new();
    let sym = interner.intern("test_string");

    group.bench_function("resolve", |b| b.iter(|| black_box(interner.resolve(sym))));

    group.finish();
}

/// Interning across a range of string lengths.
fn bench_varying_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("varying_sizes");

    for &size in &[1usize, 10, 100, 1000, 10000] {
        let string = "a".repeat(size);
        group.bench_with_input(BenchmarkId::new("intern", size), &string, |b, s| {
            let mut interner = Interner::new();
            b.iter(|| black_box(interner.intern(s)))
        });
    }

    group.finish();
}

/// Interning a realistic batch of distinct identifiers, as the lexer would
/// over the course of one compile.
fn bench_bulk_distinct(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_distinct");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("1000_distinct_identifiers", |b| {
        b.iter(|| {
            let mut interner = Interner::new();
            for i in 0..1000 {
                black_box(interner.intern(&format!("ident_{i}")));
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_intern_miss,
    bench_intern_hit,
    bench_comparison,
    bench_resolve,
    bench_varying_sizes,
    bench_bulk_distinct,
);

criterion_main!(benches);
