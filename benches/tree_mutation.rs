//! Render tree micro-benchmarks
//!
//! Measures structural edits with counter propagation and the snapshot operations used by
//! speculative pagination.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use folio::{NodeId, NodeKind, RenderTree};
use std::hint::black_box;

/// A chain of `depth` nested blocks; returns the root and the innermost block.
fn nested_chain(tree: &mut RenderTree, depth: usize) -> (NodeId, NodeId) {
    let style = tree.default_style();
    let root = tree
        .create_box(NodeKind::Block, style.clone())
        .expect("create root");
    let mut leaf = root;
    for _ in 0..depth {
        let child = tree
            .create_box(NodeKind::Block, style.clone())
            .expect("create block");
        tree.add_child(leaf, child).expect("add block");
        leaf = child;
    }
    (root, leaf)
}

/// A flat block with `width` content holders below it.
fn wide_block(tree: &mut RenderTree, width: usize) -> NodeId {
    let style = tree.default_style();
    let root = tree
        .create_box(NodeKind::Block, style.clone())
        .expect("create root");
    for _ in 0..width {
        let child = tree
            .create_box(NodeKind::ContentHolder, style.clone())
            .expect("create holder");
        tree.add_child(root, child).expect("add holder");
    }
    root
}

fn benchmark_add_remove_deep(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_add_remove_deep");

    for depth in [4, 32, 256] {
        let mut tree = RenderTree::new();
        let (_, leaf) = nested_chain(&mut tree, depth);
        let style = tree.default_style();
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            b.iter(|| {
                let child = tree
                    .create_box(NodeKind::ContentHolder, style.clone())
                    .expect("create holder");
                tree.add_child(leaf, child).expect("add holder");
                tree.remove(leaf, child).expect("remove holder");
                tree.discard(child).expect("discard holder");
            });
        });
    }

    group.finish();
}

fn benchmark_extend_height(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_extend_height");

    for depth in [4, 32, 256] {
        let mut tree = RenderTree::new();
        let (_, leaf) = nested_chain(&mut tree, depth);
        let style = tree.default_style();
        let band = tree
            .create_box(NodeKind::Block, style)
            .expect("create band");
        tree.add_child(leaf, band).expect("add band");
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            b.iter(|| black_box(tree.extend_height(leaf, band, 10).expect("extend")));
        });
    }

    group.finish();
}

fn benchmark_derive(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_derive");

    for width in [10, 100, 1000] {
        let mut tree = RenderTree::new();
        let root = wide_block(&mut tree, width);
        group.bench_with_input(BenchmarkId::new("deep", width), &width, |b, _| {
            b.iter(|| {
                let copy = tree.derive(root, true).expect("derive");
                tree.discard(copy).expect("discard copy");
            });
        });
        group.bench_with_input(BenchmarkId::new("shallow", width), &width, |b, _| {
            b.iter(|| {
                let copy = tree.derive(root, false).expect("derive");
                tree.discard(copy).expect("discard copy");
            });
        });
    }

    group.finish();
}

fn benchmark_commit_rollback(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_commit_rollback");

    for width in [10, 100, 1000] {
        let mut tree = RenderTree::new();
        let root = wide_block(&mut tree, width);
        group.bench_with_input(BenchmarkId::new("boxes", width), &width, |b, _| {
            b.iter(|| {
                tree.mark_seen_deep(root).expect("mark");
                tree.commit_deep(root).expect("commit");
                tree.rollback_deep(root, false).expect("rollback");
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_add_remove_deep,
    benchmark_extend_height,
    benchmark_derive,
    benchmark_commit_rollback
);
criterion_main!(benches);
