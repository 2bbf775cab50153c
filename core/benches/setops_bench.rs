use criterion::{black_box, criterion_group, criterion_main, Criterion};
use boolsearch_core::setops::{and_not, intersect, negate, union};
use boolsearch_core::PostingList;

fn lists() -> (PostingList, PostingList, PostingList) {
    let universe = PostingList::from_sorted((0..100_000).collect());
    let dense = PostingList::from_sorted((0..100_000).filter(|d| d % 3 == 0).collect());
    let sparse = PostingList::from_sorted((0..100_000).filter(|d| d % 997 == 0).collect());
    (universe, dense, sparse)
}

fn bench_setops(c: &mut Criterion) {
    let (universe, dense, sparse) = lists();
    c.bench_function("intersect_dense_sparse", |b| b.iter(|| intersect(black_box(&dense), black_box(&sparse))));
    c.bench_function("union_dense_sparse", |b| b.iter(|| union(black_box(&dense), black_box(&sparse))));
    c.bench_function("and_not_dense_sparse", |b| b.iter(|| and_not(black_box(&dense), black_box(&sparse))));
    c.bench_function("negate_dense", |b| b.iter(|| negate(black_box(&dense), black_box(&universe))));
}

criterion_group!(benches, bench_setops);
criterion_main!(benches);
