// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible-window example: only the rows inside the viewport get cells.
//!
//! Run:
//! - `cargo run -p understory_outline_demos --example viewport_rows`

use kurbo::{Point, Rect};
use understory_outline::{NodeKind, Tree};
use understory_outline_list::{
    ControllerConfig, ListController, ListDriver, RowAnimation, RowContext, RowLayout,
};

const ROW_H: f64 = 20.0;
const WIDTH: f64 = 200.0;

#[derive(Debug, Default)]
struct Rows(usize);

impl ListDriver for Rows {
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

fn main() {
    env_logger::init();

    let mut tree = Tree::new();
    let root = tree.root();
    for i in 0..1000_u32 {
        let post = tree.insert(Some(root), NodeKind::Plain(i));
        tree.set_visible(post, true);
        for j in 0..3 {
            tree.insert(Some(post), NodeKind::Plain(i * 10 + j));
        }
    }

    let mut list = ListController::new(Rows::default(), ControllerConfig::default());
    list.set_tree(tree);
    let layout = RowLayout::new(ROW_H, WIDTH);
    println!(
        "content: {:?}",
        layout.content_rect(list.row_count()).size()
    );

    // Tap the third row on screen to expand it.
    let outcome = list.on_point_tapped(Point::new(10.0, 2.5 * ROW_H), &layout);
    println!("tap at row 2: {outcome:?}");

    let mut provider = |row: &RowContext<'_, u32>| match row.kind.content() {
        Some(value) => format!("{}{value}", "  ".repeat(row.depth - 1)),
        None => "  (selected)".to_string(),
    };

    // Simulate a few scroll positions by moving the viewport rectangle.
    for scroll in [0.0, 30.0, 200.0, 600.0] {
        let viewport = Rect::new(0.0, scroll, WIDTH, scroll + 100.0);
        let rows = layout.rows_in(viewport, list.row_count());
        let cells: Vec<_> = rows
            .clone()
            .map(|row| list.cell_for_row(row, &mut provider))
            .collect();
        println!("scroll={scroll:.1} -> rows {rows:?}: {cells:?}");
    }

    let viewport = Rect::new(0.0, 0.0, WIDTH, 100.0);
    let revealed = layout.reveal(viewport, 40);
    println!("revealing row 40 moves the viewport to y={:.1}", revealed.y0);
}
