//! Lexer benchmarks.
//!
//! Run with: `cargo bench --package ksc-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ksc_lex::Lexer;
use ksc_util::Interner;

fn lex_token_count(source: &str) -> usize {
    let mut interner = Interner::new();
    let mut lexer = Lexer::new(source, &mut interner);
    let mut count = 0;
    loop {
        count += 1;
        if lexer.current().is_empty() {
            break;
        }
        lexer.next();
    }
    count
}

fn bench_lexer_basic(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_basic");

    let source = "def foo(x y) x + y * 2";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("small_function", |b| {
        b.iter(|| lex_token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_operators");

    let source = "def operator ** 40(base pow) if (pow < 1) then base else base * (base ** (pow - 1))";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("user_operator_decl", |b| {
        b.iter(|| lex_token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_numbers");

    let source: String = (0..200)
        .map(|i| format!("{}.{} ", i, i % 10))
        .collect::<Vec<_>>()
        .join("");
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("200_float_literals", |b| {
        b.iter(|| lex_token_count(black_box(&source)))
    });

    group.finish();
}

fn bench_lexer_comments(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_comments");

    let source: String = (0..200)
        .map(|i| format!("# comment line {}\n", i))
        .collect::<Vec<_>>()
        .join("")
        + "42";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("200_comment_lines", |b| {
        b.iter(|| lex_token_count(black_box(&source)))
    });

    group.finish();
}

fn bench_lexer_large_program(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_large_program");

    let source: String = (0..500)
        .map(|i| format!("def f{i}(x) x + {i}\n"))
        .collect::<Vec<_>>()
        .join("");
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("500_small_functions", |b| {
        b.iter(|| lex_token_count(black_box(&source)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_basic,
    bench_lexer_operators,
    bench_lexer_numbers,
    bench_lexer_comments,
    bench_lexer_large_program,
);

criterion_main!(benches);
