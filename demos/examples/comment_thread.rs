// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Comment thread walkthrough.
//!
//! Build a tree from nested comments, then expand, dig into a deep reply chain
//! until it collapses into a placeholder, and restore it.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_outline_demos --example comment_thread`

use understory_outline::{NodeKind, OutlineBuilder, Tree};
use understory_outline_list::{
    ControllerConfig, ListController, ListDriver, RowAnimation, RowContext,
};

struct Comment {
    text: &'static str,
    replies: Vec<Comment>,
}

fn comment(text: &'static str, replies: Vec<Comment>) -> Comment {
    Comment { text, replies }
}

struct Comments;

impl OutlineBuilder<&'static str> for Comments {
    type Object = &'static Comment;

    fn children_of(&mut self, object: &Self::Object) -> Option<Vec<Self::Object>> {
        let object: &'static Comment = *object;
        (!object.replies.is_empty()).then(|| object.replies.iter().collect())
    }

    fn make_content(&mut self, object: &Self::Object) -> &'static str {
        object.text
    }
}

/// Prints every call and tracks the row count like a list view would.
#[derive(Debug, Default)]
struct PrintingDriver {
    rows: usize,
}

impl ListDriver for PrintingDriver {
    fn reload_all(&mut self, row_count: usize) {
        println!("  reload ({row_count} rows)");
        self.rows = row_count;
    }

    fn insert_rows(&mut self, rows: &[usize], animation: RowAnimation) {
        println!("  insert {rows:?} ({animation:?})");
        self.rows += rows.len();
    }

    fn delete_rows(&mut self, rows: &[usize], animation: RowAnimation) {
        println!("  delete {rows:?} ({animation:?})");
        self.rows -= rows.len();
    }

    fn scroll_to(&mut self, row: usize) {
        println!("  scroll to {row}");
    }

    fn row_count(&self) -> usize {
        self.rows
    }
}

fn label(row: &RowContext<'_, &'static str>) -> String {
    let indent = "  ".repeat(row.depth.saturating_sub(1));
    let text = match row.kind {
        NodeKind::Plain(text) => format!("{} {text}", if row.children_visible { "v" } else { ">" }),
        NodeKind::Selection => "[selected]".to_string(),
        NodeKind::Action => "[reply…]".to_string(),
        NodeKind::CollapsedSection(section) => format!(
            "[… {} hidden]",
            section.original_anchor_subtree().count()
        ),
        NodeKind::Root => unreachable!("the root is never a row"),
    };
    format!("{indent}{text}")
}

fn print_rows(list: &ListController<&'static str, PrintingDriver>) {
    let mut provider = label;
    for row in 0..list.row_count() {
        println!("    {row:>2} {}", list.cell_for_row(row, &mut provider));
    }
}

fn main() {
    env_logger::init();

    let thread: &'static [Comment] = Box::leak(Box::new([
        comment(
            "Has anyone tried the new release?",
            vec![comment(
                "Yes, upgrading was smooth.",
                vec![comment(
                    "Did you hit the config migration?",
                    vec![comment(
                        "Only the logging section changed.",
                        vec![comment(
                            "Which fields?",
                            vec![comment("Just the filter syntax.", vec![])],
                        )],
                    )],
                )],
            )],
        ),
        comment("Release notes are up.", vec![]),
    ]));

    let tree = Tree::build_from_roots(thread.iter(), &mut Comments)
        .expect("comment thread is shallow");
    let config = ControllerConfig {
        collapsed_section_depth: 2,
        ..ControllerConfig::default()
    };
    let mut list = ListController::new(PrintingDriver::default(), config);
    list.set_tree(tree);
    print_rows(&list);

    // Keep tapping the deepest reply until the chain folds.
    loop {
        let last_plain = (0..list.row_count())
            .rev()
            .find(|row| {
                let node = list.node_at_row(*row);
                list.tree().has_plain_children(node) && !list.tree().is_children_visible(node)
            });
        let Some(row) = last_plain else { break };
        let outcome = list.on_row_tapped(row);
        println!("tap {row}: {outcome:?}");
        print_rows(&list);
    }

    // Bring the chain back by tapping the placeholder.
    let placeholder = (0..list.row_count()).find(|row| {
        matches!(
            list.tree().kind(list.node_at_row(*row)),
            NodeKind::CollapsedSection(_)
        )
    });
    if let Some(row) = placeholder {
        println!("tap {row}: {:?}", list.on_row_tapped(row));
        print_rows(&list);
    }

    println!("action on row 0: {:?}", list.on_action_triggered(0));
    print_rows(&list);
}
