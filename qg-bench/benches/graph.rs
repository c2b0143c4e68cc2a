use criterion::{black_box, criterion_group, criterion_main, Criterion};

use qg_bench::{chain_graph, state, tactic};
use qg_tree::SearchGraph;

fn bench_add(c: &mut Criterion) {
    c.bench_function("qg_graph_build_1k", |b| {
        b.iter(|| black_box(chain_graph(black_box(1_000))))
    });
}

fn bench_lookup(c: &mut Criterion) {
    let g = chain_graph(1_000);
    let (s, a) = (state(500), tactic(500));
    c.bench_function("qg_graph_get", |b| {
        b.iter(|| black_box(g.get(black_box(&s), black_box(&a)).is_some()))
    });
}

fn bench_serialize(c: &mut Criterion) {
    let g = chain_graph(1_000);
    let doc = g.serialize().unwrap_or_default();
    c.bench_function("qg_graph_serialize_1k", |b| {
        b.iter(|| black_box(g.serialize().map(|s| s.len()).unwrap_or(0)))
    });
    c.bench_function("qg_graph_deserialize_1k", |b| {
        b.iter(|| black_box(SearchGraph::deserialize(black_box(&doc)).is_ok()))
    });
}

criterion_group!(benches, bench_add, bench_lookup, bench_serialize);
criterion_main!(benches);
