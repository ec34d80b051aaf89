// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_outline::{NodeId, NodeKind, Tree};

/// `fanout` top-level posts, each with `fanout` replies, each with `fanout` replies.
/// Everything is visible.
fn gen_thread(fanout: usize) -> (Tree<u32>, Vec<NodeId>) {
    let mut tree = Tree::new();
    let root = tree.root();
    let mut ids = Vec::new();
    let mut label = 0_u32;
    let mut stack = vec![(root, 0_usize)];
    while let Some((parent, depth)) = stack.pop() {
        if depth == 3 {
            continue;
        }
        for _ in 0..fanout {
            let id = tree.insert(Some(parent), NodeKind::Plain(label));
            label += 1;
            tree.set_visible(id, true);
            ids.push(id);
            stack.push((id, depth + 1));
        }
    }
    (tree, ids)
}

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_traversal");
    for &fanout in &[8_usize, 16, 24] {
        let (tree, ids) = gen_thread(fanout);
        group.throughput(Throughput::Elements(ids.len() as u64));

        group.bench_function(format!("rows_uncached_f{fanout}"), |b| {
            b.iter_batched(
                || {
                    let (mut tree, _) = gen_thread(fanout);
                    tree.set_cache_enabled(false);
                    tree
                },
                |tree| black_box(tree.visible_rows().len()),
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("index_lookup_cached_f{fanout}"), |b| {
            let probe = ids[ids.len() / 2];
            b.iter(|| black_box(tree.visible_traversal_index(probe)));
        });

        group.bench_function(format!("node_at_row_cached_f{fanout}"), |b| {
            let row = tree.row_count() / 2;
            b.iter(|| black_box(tree.node_at_visible_index(row)));
        });
    }
    group.finish();
}

fn bench_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility_toggle");
    for &fanout in &[8_usize, 16] {
        let (mut tree, ids) = gen_thread(fanout);
        let first = ids[0];
        group.bench_function(format!("hide_show_top_f{fanout}"), |b| {
            b.iter(|| {
                tree.set_visible(first, false);
                let hidden = tree.row_count();
                tree.set_visible(first, true);
                black_box(hidden + tree.row_count())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_traversal, bench_toggle);
criterion_main!(benches);
