//! Thin helpers over the tree-sitter Rust grammar.
//!
//! The migration never looks at raw text to find structure: blocks, methods and
//! statements all come from the concrete syntax tree, so lookalikes inside comments
//! or string literals are never touched.

use crate::error::MigrateError;
use tree_sitter::{Node, Parser, Tree};

pub fn parse_rust(source: &str) -> Result<Tree, MigrateError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_rust::LANGUAGE.into())?;
    parser.parse(source, None).ok_or(MigrateError::Parse)
}

/// Source text covered by `node`.
pub fn text<'a>(source: &'a str, node: Node) -> &'a str {
    &source[node.byte_range()]
}

/// Text with all whitespace removed, for shape comparisons like `DateTime<Utc>`.
pub fn squashed(source: &str, node: Node) -> String {
    text(source, node).split_whitespace().collect()
}

pub fn is_comment(node: Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

/// Named children, comments excluded.
pub fn code_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !is_comment(*child))
        .collect()
}

/// First anonymous child token of the given kind, e.g. the `fn` keyword.
pub fn token<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|child| !child.is_named() && child.kind() == kind)
}

/// Last `::` segment of a path, with generic arguments dropped.
pub fn last_segment(path: &str) -> &str {
    let without_generics = path.split('<').next().unwrap_or(path);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim()
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Leading whitespace of the line containing `offset`.
pub fn indentation_at(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    let line = &source[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Whether the node or anything inside it was synthesized by error recovery.
pub fn has_missing(node: Node) -> bool {
    if node.is_missing() {
        return true;
    }
    if !node.has_error() {
        return false;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().any(has_missing)
}

/// Depth-first, source-ordered walk over every node below `root`.
pub fn descendants(root: Node) -> Vec<Node> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        out.push(node);
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("ResourceNormalizer"), "ResourceNormalizer");
        assert_eq!(
            last_segment("super::normalizers::ResourceNormalizer"),
            "ResourceNormalizer"
        );
        assert_eq!(last_segment("Wrapper<T>"), "Wrapper");
    }

    #[test]
    fn test_indentation_at() {
        let source = "mod a {\n    impl X for Y {}\n}\n";
        let offset = source.find("impl").unwrap();
        assert_eq!(indentation_at(source, offset), "    ");
        assert_eq!(indentation_at(source, 0), "");
    }

    #[test]
    fn test_parse_and_walk_in_source_order() {
        let source = "fn a() {}\nfn b() {}\n";
        let tree = parse_rust(source).unwrap();
        let names: Vec<&str> = descendants(tree.root_node())
            .into_iter()
            .filter(|n| n.kind() == "function_item")
            .filter_map(|n| n.child_by_field_name("name"))
            .map(|n| text(source, n))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_brace_is_detected() {
        let source = "impl A for B {\n    fn f(&self) {}\n";
        let tree = parse_rust(source).unwrap();
        assert!(has_missing(tree.root_node()) || tree.root_node().has_error());
    }
}
