//! # Block Locator
//!
//! Finds `impl <SyncContract> for <Type>` items for the migrated family and works
//! out the byte span each one owns.

use crate::config::MigrationConfig;
use crate::error::SkipReason;
use crate::syntax;
use std::collections::BTreeSet;
use std::ops::Range;
use tree_sitter::{Node, Tree};

/// A located implementation header of the synchronous contract.
#[derive(Debug, Clone)]
pub struct ImplementationMatch<'tree> {
    pub type_name: String,
    /// Start of the header, including outer attributes attached to the `impl`.
    pub header_start: usize,
    /// Offset of the `impl` keyword itself.
    pub impl_keyword: usize,
    /// Offset of the body's `{`, if the header has a body at all.
    pub open_brace: Option<usize>,
    /// Not a direct child of the file, e.g. inside a `mod` block.
    pub nested: bool,
    pub node: Node<'tree>,
}

/// A balanced `{ ... }` region, from the header start to one past the closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

impl BlockSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn contains(&self, inner: &Range<usize>) -> bool {
        self.start < inner.start && inner.end < self.end
    }
}

/// Everything the locator learned about one file.
#[derive(Debug, Default)]
pub struct LocatedImpls<'tree> {
    /// Sync implementations of the family, in source order.
    pub matches: Vec<ImplementationMatch<'tree>>,
    /// Types that already implement the async contract in this file.
    pub already_async: BTreeSet<String>,
}

pub fn locate<'tree>(
    tree: &'tree Tree,
    source: &str,
    config: &MigrationConfig,
) -> LocatedImpls<'tree> {
    let mut located = LocatedImpls::default();

    for node in syntax::descendants(tree.root_node()) {
        if node.kind() != "impl_item" {
            continue;
        }
        let (Some(trait_node), Some(type_node)) = (
            node.child_by_field_name("trait"),
            node.child_by_field_name("type"),
        ) else {
            continue;
        };

        let trait_name = syntax::last_segment(syntax::text(source, trait_node));
        let type_name = syntax::last_segment(syntax::text(source, type_node));
        if !type_name.ends_with(&config.type_suffix) {
            continue;
        }

        if trait_name == config.async_trait {
            located.already_async.insert(type_name.to_string());
        } else if trait_name == config.sync_trait {
            tracing::debug!(type_name, offset = node.start_byte(), "found implementation");
            located.matches.push(ImplementationMatch {
                type_name: type_name.to_string(),
                header_start: attributes_start(node),
                impl_keyword: node.start_byte(),
                open_brace: node
                    .child_by_field_name("body")
                    .and_then(|body| syntax::token(body, "{"))
                    .map(|brace| brace.start_byte()),
                nested: node.parent().is_some_and(|parent| parent.kind() != "source_file"),
                node,
            });
        }
    }

    located
}

impl<'tree> ImplementationMatch<'tree> {
    /// The balanced region of this block.
    ///
    /// Fails when the header has no body or when the parser had to invent the
    /// closing brace, which means delimiters never balance before end of file.
    pub fn block_span(&self) -> Result<BlockSpan, SkipReason> {
        let body = self
            .node
            .child_by_field_name("body")
            .filter(|body| body.kind() == "declaration_list")
            .ok_or(SkipReason::MissingBody)?;
        if self.open_brace.is_none() {
            return Err(SkipReason::MissingBody);
        }

        let closing = body
            .child(body.child_count().saturating_sub(1))
            .filter(|last| last.kind() == "}" && !last.is_missing());
        if closing.is_none() || syntax::has_missing(body) || self.node.end_byte() <= body.start_byte()
        {
            return Err(SkipReason::UnbalancedBlock);
        }

        Ok(BlockSpan {
            start: self.header_start,
            end: self.node.end_byte(),
        })
    }

    /// Items directly inside the block body.
    pub fn items(&self) -> Vec<Node<'tree>> {
        self.node
            .child_by_field_name("body")
            .map(syntax::code_children)
            .unwrap_or_default()
    }
}

/// Start of the run of outer attributes (`#[...]`) preceding `node`. Comments
/// between the attributes and the item do not end the run.
fn attributes_start(node: Node) -> usize {
    let mut start = node.start_byte();
    let mut current = node.prev_sibling();
    while let Some(sibling) = current {
        if sibling.kind() == "attribute_item" {
            start = sibling.start_byte();
        } else if !syntax::is_comment(sibling) {
            break;
        }
        current = sibling.prev_sibling();
    }
    start
}
