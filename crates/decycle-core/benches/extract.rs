use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use decycle_core::{ForestNode, Relabeling, extract_edges};

/// Flat pipdeptree-style forest: `packages` roots, each depending on `fanout`
/// other packages by a fixed stride so keys repeat across roots.
fn flat_forest(packages: usize, fanout: usize) -> Vec<ForestNode> {
    (0..packages)
        .map(|i| {
            let deps = (1..=fanout)
                .map(|d| ForestNode::leaf(format!("pkg-{}", (i + d * 7) % packages)))
                .collect();
            ForestNode::tree(format!("pkg-{i}"), deps)
        })
        .collect()
}

/// A single chain `depth` levels deep.
fn deep_chain(depth: usize) -> Vec<ForestNode> {
    let mut node = ForestNode::leaf(format!("pkg-{depth}"));
    for i in (0..depth).rev() {
        node = ForestNode::tree(format!("pkg-{i}"), vec![node]);
    }
    vec![node]
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    for packages in [100_usize, 1_000, 10_000] {
        let forest = flat_forest(packages, 4);
        group.throughput(Throughput::Elements((packages * 4) as u64));
        group.bench_with_input(BenchmarkId::new("flat", packages), &forest, |b, forest| {
            b.iter(|| black_box(extract_edges(forest)));
        });
        group.bench_with_input(
            BenchmarkId::new("flat+relabel", packages),
            &forest,
            |b, forest| {
                b.iter(|| {
                    let edges = extract_edges(forest).unwrap_or_default();
                    black_box(Relabeling::from_edges(&edges))
                });
            },
        );
    }

    let chain = deep_chain(2_000);
    group.bench_function("chain/2000", |b| b.iter(|| black_box(extract_edges(&chain))));

    group.finish();
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
