//! Criterion measurement of statement rewriting: the empty-store fast path, scalar-only
//! statements that are scanned but left unchanged, and sequence expansion of growing lists.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sqlbind::prelude::*;

const STATEMENT: &str = "SELECT u.id, u.name, 'note: :skip this' AS note \
     FROM users u WHERE u.id IN (:ids) AND u.status = :status \
     AND u.created_at > :since AND u.comment <> 'it''s :ids'";

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");

    group.bench_function("empty_store", |b| {
        let binds = BindStore::new();
        b.iter(|| rewrite(black_box(STATEMENT), &binds, &AnsiLiteralQuoter));
    });

    group.bench_function("scalars_only", |b| {
        let mut binds = BindStore::new();
        binds.bind_values([("status", "active"), ("since", "2024-01-01")]);
        b.iter(|| rewrite(black_box(STATEMENT), &binds, &AnsiLiteralQuoter));
    });

    for size in [4_usize, 64, 1024] {
        let mut binds = BindStore::new();
        let ids: Vec<i64> = (1..=size as i64).collect();
        binds.bind("ids", ids);
        binds.bind("status", "active");
        binds.bind("since", "2024-01-01");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("sequence", size), &binds, |b, binds| {
            b.iter(|| rewrite(black_box(STATEMENT), binds, &AnsiLiteralQuoter));
        });
    }

    group.finish();
}

fn bench_quote_names(c: &mut Criterion) {
    let quoter = IdentifierQuoter::default();
    c.bench_function("quote_names_in", |b| {
        b.iter(|| {
            quoter.quote_names_in(black_box(
                r#"*, *.*, foo.bar, CONCAT('foo.bar', "baz.dib") AS zim"#,
            ))
        });
    });
}

criterion_group!(benches, bench_rewrite, bench_quote_names);
criterion_main!(benches);
