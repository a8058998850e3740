//! # Fragment Extractor
//!
//! Pulls the pieces the rewrite needs out of one located block: the normalize
//! method, its tag-extraction statement, the resource-identifier binding and the
//! type-tag literal. Read-only over the source.

use crate::config::MigrationConfig;
use crate::error::SkipReason;
use crate::locator::{BlockSpan, ImplementationMatch};
use crate::syntax;
use std::ops::Range;
use tree_sitter::Node;

/// Structurally significant pieces of one implementation block.
#[derive(Debug, Clone)]
pub struct Fragment<'tree> {
    /// Leading whitespace of the tag statement's line.
    pub indent: String,
    pub resource_id: String,
    pub type_tag: String,
    /// Exact span of `let tags = extract_tags(&raw_response);`.
    pub tag_statement: Range<usize>,
    pub params: NormalizeParams,
    /// Every raw-response-derived binding seen before the tag statement, in order.
    pub id_candidates: Vec<String>,
    pub method: Node<'tree>,
}

/// Parameter names as written in the sync signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeParams {
    pub raw_response: String,
    pub account: String,
    pub region: String,
    pub query_timestamp: String,
}

pub fn extract<'tree>(
    m: &ImplementationMatch<'tree>,
    span: &BlockSpan,
    source: &str,
    config: &MigrationConfig,
) -> Result<Fragment<'tree>, SkipReason> {
    let items = m.items();

    let (method, params) = items
        .iter()
        .find_map(|item| normalize_method(*item, source, config))
        .ok_or_else(|| SkipReason::MissingNormalizeMethod {
            method: config.normalize_method.clone(),
        })?;

    let body = method
        .child_by_field_name("body")
        .ok_or_else(|| missing_tag_extraction(config, &params))?;
    let tag_statement = syntax::descendants(body)
        .into_iter()
        .find(|node| is_tag_extraction(*node, source, config, &params.raw_response))
        .ok_or_else(|| missing_tag_extraction(config, &params))?;
    let tag_range = tag_statement.byte_range();
    debug_assert!(span.contains(&tag_range));

    let id_candidates: Vec<String> = syntax::descendants(body)
        .into_iter()
        .filter(|node| node.kind() == "let_declaration" && node.end_byte() <= tag_range.start)
        .filter_map(|node| raw_response_binding(node, source, &params.raw_response))
        .collect();
    let resource_id = id_candidates
        .first()
        .cloned()
        .ok_or_else(|| SkipReason::MissingResourceId {
            raw_param: params.raw_response.clone(),
        })?;
    if id_candidates.len() > 1 {
        if config.strict_resource_id {
            return Err(SkipReason::AmbiguousResourceId {
                chosen: resource_id,
                candidates: id_candidates,
            });
        }
        tracing::warn!(
            type_name = %m.type_name,
            chosen = %resource_id,
            candidates = ?id_candidates,
            "several bindings derive from the raw response; using the first as resource id"
        );
    }

    let type_tag = items
        .iter()
        .find_map(|item| type_tag_literal(*item, source, config))
        .ok_or_else(|| SkipReason::MissingTypeTag {
            method: config.type_tag_method.clone(),
        })?;

    Ok(Fragment {
        indent: syntax::indentation_at(source, tag_range.start).to_string(),
        resource_id,
        type_tag,
        tag_statement: tag_range,
        params,
        id_candidates,
        method,
    })
}

fn missing_tag_extraction(config: &MigrationConfig, params: &NormalizeParams) -> SkipReason {
    SkipReason::MissingTagExtraction {
        method: config.normalize_method.clone(),
        binding: config.tag_binding.clone(),
        function: config.tag_extraction_fn.clone(),
        raw_param: params.raw_response.clone(),
    }
}

/// Matches `fn normalize(&self, raw: serde_json::Value, account: &str, region: &str, ts: DateTime<Utc>)`.
fn normalize_method<'tree>(
    item: Node<'tree>,
    source: &str,
    config: &MigrationConfig,
) -> Option<(Node<'tree>, NormalizeParams)> {
    if item.kind() != "function_item" {
        return None;
    }
    let name = item.child_by_field_name("name")?;
    if syntax::text(source, name) != config.normalize_method || is_async(item, source) {
        return None;
    }

    let parameters = syntax::code_children(item.child_by_field_name("parameters")?);
    let [receiver, raw, account, region, timestamp] = parameters.as_slice() else {
        return None;
    };
    if receiver.kind() != "self_parameter" {
        return None;
    }

    let raw_response = typed_param(*raw, source, |ty| {
        ty == "serde_json::Value" || ty == "Value"
    })?;
    let account = typed_param(*account, source, |ty| ty == "&str")?;
    let region = typed_param(*region, source, |ty| ty == "&str")?;
    let query_timestamp = typed_param(*timestamp, source, |ty| {
        syntax::last_segment(ty) == "DateTime" && ty.ends_with("Utc>")
    })?;

    Some((
        item,
        NormalizeParams {
            raw_response,
            account,
            region,
            query_timestamp,
        },
    ))
}

fn is_async(function: Node, source: &str) -> bool {
    let mut cursor = function.walk();
    function
        .children(&mut cursor)
        .filter(|child| child.kind() == "function_modifiers")
        .any(|modifiers| syntax::text(source, modifiers).contains("async"))
}

/// Name of a `name: Type` parameter whose squashed type satisfies `accepts`.
fn typed_param(param: Node, source: &str, accepts: impl Fn(&str) -> bool) -> Option<String> {
    if param.kind() != "parameter" {
        return None;
    }
    let pattern = param.child_by_field_name("pattern")?;
    let ty = param.child_by_field_name("type")?;
    if pattern.kind() != "identifier" || !accepts(&syntax::squashed(source, ty)) {
        return None;
    }
    Some(syntax::text(source, pattern).to_string())
}

/// `let <tag_binding> = <tag_extraction_fn>(&<raw>);`
fn is_tag_extraction(node: Node, source: &str, config: &MigrationConfig, raw: &str) -> bool {
    if node.kind() != "let_declaration" {
        return false;
    }
    let (Some(pattern), Some(value)) = (
        node.child_by_field_name("pattern"),
        node.child_by_field_name("value"),
    ) else {
        return false;
    };
    if pattern.kind() != "identifier" || syntax::text(source, pattern) != config.tag_binding {
        return false;
    }
    // `let mut`, a type annotation or let-else would be lost in the rewrite.
    let mut cursor = node.walk();
    if node
        .children(&mut cursor)
        .any(|child| child.kind() == "mutable_specifier")
        || node.child_by_field_name("type").is_some()
        || node.child_by_field_name("alternative").is_some()
    {
        return false;
    }
    if value.kind() != "call_expression" {
        return false;
    }
    let Some(function) = value.child_by_field_name("function") else {
        return false;
    };
    if syntax::last_segment(syntax::text(source, function)) != config.tag_extraction_fn {
        return false;
    }
    let arguments = value
        .child_by_field_name("arguments")
        .map(syntax::code_children)
        .unwrap_or_default();
    match arguments.as_slice() {
        [argument] => syntax::squashed(source, *argument) == format!("&{raw}"),
        _ => false,
    }
}

/// Binding name if `node` is `let <ident> = <projection of raw>;`.
fn raw_response_binding(node: Node, source: &str, raw: &str) -> Option<String> {
    let pattern = node.child_by_field_name("pattern")?;
    let value = node.child_by_field_name("value")?;
    if pattern.kind() != "identifier" || !is_projection_of(value, source, raw) {
        return None;
    }
    Some(syntax::text(source, pattern).to_string())
}

/// Whether `expr` is a method chain, field access or index rooted at `raw`.
/// The bare identifier alone does not count: it moves the value, it does not
/// project anything out of it.
fn is_projection_of(expr: Node, source: &str, raw: &str) -> bool {
    let mut current = expr;
    let mut projected = false;
    loop {
        let next = match current.kind() {
            "identifier" => return projected && syntax::text(source, current) == raw,
            "field_expression" => {
                projected = true;
                current.child_by_field_name("value")
            }
            "index_expression" => {
                projected = true;
                syntax::code_children(current).first().copied()
            }
            "call_expression" => current.child_by_field_name("function"),
            "reference_expression" => current.child_by_field_name("value"),
            "try_expression" | "parenthesized_expression" => {
                syntax::code_children(current).first().copied()
            }
            _ => None,
        };
        match next {
            Some(node) => current = node,
            None => return false,
        }
    }
}

/// String literal returned by `fn resource_type(&self) -> &'static str { "..." }`.
fn type_tag_literal(item: Node, source: &str, config: &MigrationConfig) -> Option<String> {
    if item.kind() != "function_item" {
        return None;
    }
    let name = item.child_by_field_name("name")?;
    if syntax::text(source, name) != config.type_tag_method {
        return None;
    }
    let body = item.child_by_field_name("body")?;
    let tail = *syntax::code_children(body).last()?;
    let literal = match tail.kind() {
        "string_literal" => tail,
        "return_expression" | "expression_statement" => syntax::code_children(tail)
            .into_iter()
            .find(|n| n.kind() == "string_literal")?,
        _ => return None,
    };
    let content = syntax::text(source, literal)
        .strip_prefix('"')?
        .strip_suffix('"')?;
    (!content.is_empty()).then(|| content.to_string())
}
