//! Keeps the `async_trait` attribute macro in scope for migrated files.

use crate::edit::Edit;
use crate::syntax;
use tree_sitter::{Node, Tree};

pub const ASYNC_TRAIT_IMPORT: &str = "use async_trait::async_trait;";

const ANYHOW_RESULT: &str = "useanyhow::Result;";
const CHRONO_TYPES: &str = "usechrono::{DateTime,Utc};";

/// The insertion that brings `async_trait` into scope, or `None` when the file
/// already imports it.
///
/// Placement follows the file's own import block: after `use anyhow::Result;`,
/// else before `use chrono::{DateTime, Utc};`, else after the last top-level
/// `use`, else ahead of the first item.
pub fn async_trait_import(tree: &Tree, source: &str) -> Option<Edit> {
    let root = tree.root_node();
    let uses: Vec<Node> = syntax::code_children(root)
        .into_iter()
        .filter(|node| node.kind() == "use_declaration")
        .collect();

    if uses
        .iter()
        .any(|node| syntax::squashed(source, *node).contains("async_trait::async_trait"))
    {
        return None;
    }

    let find = |wanted: &str| {
        uses.iter()
            .find(|node| syntax::squashed(source, **node) == wanted)
            .copied()
    };

    let edit = if let Some(anyhow) = find(ANYHOW_RESULT) {
        Edit::insert(anyhow.end_byte(), format!("\n{ASYNC_TRAIT_IMPORT}"))
    } else if let Some(chrono) = find(CHRONO_TYPES) {
        Edit::insert(chrono.start_byte(), format!("{ASYNC_TRAIT_IMPORT}\n"))
    } else if let Some(last) = uses.last() {
        Edit::insert(last.end_byte(), format!("\n{ASYNC_TRAIT_IMPORT}"))
    } else {
        match first_item(root, source) {
            Some(item) => Edit::insert(item.start_byte(), format!("{ASYNC_TRAIT_IMPORT}\n\n")),
            None => Edit::insert(source.len(), format!("{ASYNC_TRAIT_IMPORT}\n")),
        }
    };
    Some(edit)
}

/// First top-level node that may be preceded by a `use`: inner attributes and
/// inner doc comments have to stay at the top.
fn first_item<'tree>(root: Node<'tree>, source: &str) -> Option<Node<'tree>> {
    let mut cursor = root.walk();
    root.named_children(&mut cursor).find(|node| {
        let text = syntax::text(source, *node);
        node.kind() != "inner_attribute_item" && !text.starts_with("//!") && !text.starts_with("/*!")
    })
}
