// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_outline::{NodeId, NodeKind, Tree};
use understory_outline_list::{ControllerConfig, ListController, ListDriver, RowAnimation};

#[derive(Debug, Default)]
struct CountingDriver(usize);

impl ListDriver for CountingDriver {
    fn reload_all(&mut self, row_count: usize) {
        self.0 = row_count;
    }
    fn insert_rows(&mut self, rows: &[usize], _animation: RowAnimation) {
        self.0 += rows.len();
    }
    fn delete_rows(&mut self, rows: &[usize], _animation: RowAnimation) {
        self.0 -= rows.len();
    }
    fn scroll_to(&mut self, _row: usize) {}
    fn row_count(&self) -> usize {
        self.0
    }
}

/// `posts` visible top-level posts, each with `replies` hidden replies.
fn gen_posts(posts: usize, replies: usize) -> Tree<u32> {
    let mut tree = Tree::new();
    let root = tree.root();
    for p in 0..posts {
        let post = tree.insert(Some(root), NodeKind::Plain(p as u32));
        tree.set_visible(post, true);
        for r in 0..replies {
            tree.insert(Some(post), NodeKind::Plain(r as u32));
        }
    }
    tree
}

/// A single chain of `len` nodes; only the first is visible.
fn gen_chain(len: usize) -> (Tree<u32>, NodeId) {
    let mut tree = Tree::new();
    let mut parent = tree.root();
    let mut first = None;
    for i in 0..len {
        let id = tree.insert(Some(parent), NodeKind::Plain(i as u32));
        first.get_or_insert(id);
        parent = id;
    }
    let first = first.expect("chain is not empty");
    tree.set_visible(first, true);
    (tree, parent)
}

fn bench_tap(c: &mut Criterion) {
    let mut group = c.benchmark_group("tap");
    for &posts in &[100_usize, 1000] {
        group.bench_function(format!("expand_collapse_middle_p{posts}"), |b| {
            let mut list = ListController::new(CountingDriver::default(), ControllerConfig::default());
            list.set_tree(gen_posts(posts, 20));
            let row = posts / 2;
            b.iter(|| {
                list.on_row_tapped(row);
                list.on_row_tapped(row);
                black_box(list.row_count())
            });
        });
    }
    group.finish();
}

fn bench_zoom(c: &mut Criterion) {
    let mut group = c.benchmark_group("zoom");
    for &len in &[16_usize, 64] {
        group.bench_function(format!("zoom_to_chain_end_l{len}"), |b| {
            b.iter_batched(
                || {
                    let (tree, last) = gen_chain(len);
                    let mut list =
                        ListController::new(CountingDriver::default(), ControllerConfig::default());
                    list.set_tree(tree);
                    (list, last)
                },
                |(mut list, last)| {
                    list.zoom_to(last);
                    black_box(list.row_count())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tap, bench_zoom);
criterion_main!(benches);
