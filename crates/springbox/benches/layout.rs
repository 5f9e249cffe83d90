use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use springbox::{CoordinateMapper, Graph, GraphNode, OverlapRemoval, SpringLayout};
use std::hint::black_box;
use std::time::Duration;

/// A ring of `node_count` boxes with a chord every `chord_every` nodes, all stacked near the
/// origin so both algorithms have real work to do.
fn build_graph(node_count: usize, chord_every: usize) -> Graph {
    let mut g = Graph::new();
    for i in 0..node_count {
        let jitter = (i % 7) as f64 * 13.0;
        let node = GraphNode::new(
            format!("n{i}"),
            jitter,
            (i % 5) as f64 * 11.0,
            60.0 + (i % 3) as f64 * 40.0,
            40.0 + (i % 4) as f64 * 20.0,
        );
        if let Ok(node) = node {
            let _ = g.add_node(node);
        }
    }
    for i in 0..node_count {
        let _ = g.add_edge(&format!("n{i}"), &format!("n{}", (i + 1) % node_count));
        if chord_every > 0 && i % chord_every == 0 {
            let _ = g.add_edge(&format!("n{i}"), &format!("n{}", (i * 7 + 3) % node_count));
        }
    }
    g
}

fn bench_spring(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring_layout");
    group.measurement_time(Duration::from_secs(10));

    let extent = CoordinateMapper::default().layout_extent();
    for (name, nodes, chords) in [("ring_20", 20usize, 4usize), ("ring_80", 80, 5)] {
        let graph = build_graph(nodes, chords);
        group.bench_with_input(BenchmarkId::new("layout", name), &graph, |b, graph| {
            b.iter_batched(
                || (graph.clone(), StdRng::seed_from_u64(0)),
                |(mut g, mut rng)| {
                    let stats = SpringLayout::default().layout(&mut g, extent, false, &mut rng);
                    black_box(stats.iterations);
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap_removal");

    for (name, nodes) in [("stack_20", 20usize), ("stack_80", 80)] {
        let graph = build_graph(nodes, 0);
        group.bench_with_input(
            BenchmarkId::new("remove_overlaps", name),
            &graph,
            |b, graph| {
                b.iter_batched(
                    || graph.clone(),
                    |mut g| {
                        let outcome = OverlapRemoval::default().remove_overlaps(black_box(&mut g));
                        black_box(outcome.fixed);
                    },
                    BatchSize::LargeInput,
                )
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_spring, bench_overlap);
criterion_main!(benches);
