//! # Rewrite Synthesizer
//!
//! Builds the asynchronous counterpart of a located block. All changes are edits
//! relative to the block's own text, so the rest of the block (comments, helper
//! methods, formatting) is carried over byte for byte.

use crate::config::MigrationConfig;
use crate::edit::{Edit, apply_edits};
use crate::error::{EditError, SkipReason};
use crate::extractor::Fragment;
use crate::locator::{BlockSpan, ImplementationMatch};
use crate::syntax;
use tree_sitter::Node;

/// Comment placed above the generated fetch.
pub const FETCH_COMMENT: &str = "// Fetch tags asynchronously from AWS API with caching";

/// Failures while synthesizing. Structural ones skip the block, edit ones are bugs.
#[derive(Debug)]
pub enum SynthesisError {
    Skip(SkipReason),
    Edit(EditError),
}

impl From<EditError> for SynthesisError {
    fn from(err: EditError) -> Self {
        SynthesisError::Edit(err)
    }
}

/// The statement replacing the local tag extraction in the async block.
///
/// Tags are best-effort: a failed fetch logs a structured warning and yields an
/// empty collection, it never fails the normalization.
pub fn fetch_statement(fragment: &Fragment, config: &MigrationConfig) -> String {
    let i = &fragment.indent;
    let id = &fragment.resource_id;
    let ty = &fragment.type_tag;
    let lines = [
        FETCH_COMMENT.to_string(),
        format!("{i}let {} = {}", config.tag_binding, config.client_param),
        format!(
            "{i}    .{}(\"{ty}\", &{id}, {}, {})",
            config.fetch_method, fragment.params.account, fragment.params.region
        ),
        format!("{i}    .await"),
        format!("{i}    .unwrap_or_else(|e| {{"),
        format!("{i}        tracing::warn!("),
        format!("{i}            resource_type = \"{ty}\","),
        format!("{i}            resource_id = %{id},"),
        format!("{i}            error = %e,"),
        format!("{i}            \"Failed to fetch tags, continuing without them\""),
        format!("{i}        );"),
        format!("{i}        Vec::new()"),
        format!("{i}    }});"),
    ];
    lines.join("\n")
}

/// Full text of the async implementation derived from the block at `span`.
pub fn async_block(
    source: &str,
    m: &ImplementationMatch,
    span: &BlockSpan,
    fragment: &Fragment,
    config: &MigrationConfig,
) -> Result<String, SynthesisError> {
    let base = span.start;
    let block = &source[span.range()];
    let relative = |offset: usize| offset - base;
    let header_indent = syntax::indentation_at(source, m.impl_keyword);

    let trait_name = m
        .node
        .child_by_field_name("trait")
        .and_then(trait_name_node)
        .ok_or(SynthesisError::Skip(SkipReason::MissingBody))?;
    let fn_keyword = syntax::token(fragment.method, "fn").ok_or_else(|| {
        SynthesisError::Skip(SkipReason::MissingNormalizeMethod {
            method: config.normalize_method.clone(),
        })
    })?;

    let mut edits = vec![
        Edit::insert(
            relative(m.impl_keyword),
            format!("{}\n{header_indent}", async_trait_attribute(m)),
        ),
        Edit::replace(
            relative(trait_name.start_byte())..relative(trait_name.end_byte()),
            config.async_trait.clone(),
        ),
        Edit::insert(relative(fn_keyword.start_byte()), "async "),
    ];
    let param = client_param_edit(source, fragment, config)?;
    edits.push(Edit::insert(relative(param.span.start), param.replacement));
    edits.push(Edit::replace(
        relative(fragment.tag_statement.start)..relative(fragment.tag_statement.end),
        fetch_statement(fragment, config),
    ));

    Ok(apply_edits(block, &edits)?)
}

/// Path form for blocks inside a `mod`, where the file-level import is not in scope.
fn async_trait_attribute(m: &ImplementationMatch) -> &'static str {
    if m.nested {
        "#[async_trait::async_trait]"
    } else {
        "#[async_trait]"
    }
}

/// The `type_identifier` naming the trait, inside paths and generics.
fn trait_name_node(node: Node) -> Option<Node> {
    match node.kind() {
        "type_identifier" => Some(node),
        "scoped_type_identifier" => node.child_by_field_name("name").and_then(trait_name_node),
        "generic_type" => node.child_by_field_name("type").and_then(trait_name_node),
        _ => None,
    }
}

/// Appends the collaborator parameter in the parameter list's own layout.
fn client_param_edit(
    source: &str,
    fragment: &Fragment,
    config: &MigrationConfig,
) -> Result<Edit, SynthesisError> {
    let missing_method = || {
        SynthesisError::Skip(SkipReason::MissingNormalizeMethod {
            method: config.normalize_method.clone(),
        })
    };
    let parameters = fragment
        .method
        .child_by_field_name("parameters")
        .ok_or_else(missing_method)?;
    let last = *syntax::code_children(parameters)
        .last()
        .ok_or_else(missing_method)?;

    let param = format!("{}: &{}", config.client_param, config.client_type);
    let trailing_comma = next_code_sibling(last).filter(|n| n.kind() == ",");

    let edit = if syntax::text(source, parameters).contains('\n') {
        let indent = syntax::indentation_at(source, last.start_byte());
        match trailing_comma {
            Some(comma) => Edit::insert(comma.end_byte(), format!("\n{indent}{param},")),
            None => Edit::insert(last.end_byte(), format!(",\n{indent}{param},")),
        }
    } else {
        match trailing_comma {
            Some(comma) => Edit::insert(comma.end_byte(), format!(" {param}")),
            None => Edit::insert(last.end_byte(), format!(", {param}")),
        }
    };
    Ok(edit)
}

fn next_code_sibling(node: Node) -> Option<Node> {
    let mut current = node.next_sibling();
    while let Some(sibling) = current {
        if !syntax::is_comment(sibling) {
            return Some(sibling);
        }
        current = sibling.next_sibling();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract;
    use crate::locator::locate;
    use crate::syntax::parse_rust;
    use pretty_assertions::assert_eq;

    fn synthesize(source: &str) -> String {
        let config = MigrationConfig::default();
        let tree = parse_rust(source).unwrap();
        let located = locate(&tree, source, &config);
        let m = &located.matches[0];
        let span = m.block_span().unwrap();
        let fragment = extract(m, &span, source, &config).unwrap();
        match async_block(source, m, &span, &fragment, &config) {
            Ok(text) => text,
            Err(err) => panic!("synthesis failed: {err:?}"),
        }
    }

    #[test]
    fn test_single_line_signature() {
        let source = r#"impl crate::normalizers::ResourceNormalizer for KeyNormalizer {
    fn normalize(&self, raw: Value, account: &str, region: &str, ts: DateTime<Utc>) -> Result<ResourceEntry> {
        let key_id = raw.get("KeyId").cloned();
        let tags = extract_tags(&raw);
        todo!()
    }
    fn resource_type(&self) -> &'static str { "AWS::KMS::Key" }
}"#;
        let expected = r#"#[async_trait]
impl crate::normalizers::AsyncResourceNormalizer for KeyNormalizer {
    async fn normalize(&self, raw: Value, account: &str, region: &str, ts: DateTime<Utc>, aws_client: &AWSResourceClient) -> Result<ResourceEntry> {
        let key_id = raw.get("KeyId").cloned();
        // Fetch tags asynchronously from AWS API with caching
        let tags = aws_client
            .fetch_tags_for_resource("AWS::KMS::Key", &key_id, account, region)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    resource_type = "AWS::KMS::Key",
                    resource_id = %key_id,
                    error = %e,
                    "Failed to fetch tags, continuing without them"
                );
                Vec::new()
            });
        todo!()
    }
    fn resource_type(&self) -> &'static str { "AWS::KMS::Key" }
}"#;
        assert_eq!(synthesize(source), expected);
    }

    #[test]
    fn test_multi_line_signature_without_trailing_comma() {
        let source = r#"impl ResourceNormalizer for VpcNormalizer {
    fn normalize(
        &self,
        raw_response: serde_json::Value,
        account: &str,
        region: &str,
        query_timestamp: DateTime<Utc>
    ) -> Result<ResourceEntry> {
        let vpc_id = raw_response["VpcId"].to_string();
        let tags = extract_tags(&raw_response);
        todo!()
    }
    fn resource_type(&self) -> &'static str {
        "AWS::EC2::VPC"
    }
}"#;
        let out = synthesize(source);
        assert!(out.contains(
            "        query_timestamp: DateTime<Utc>,\n        aws_client: &AWSResourceClient,\n    ) -> Result<ResourceEntry> {"
        ));
        assert!(out.starts_with("#[async_trait]\nimpl AsyncResourceNormalizer for VpcNormalizer {\n    async fn normalize("));
        assert!(!out.contains("extract_tags(&raw_response)"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let source = r#"impl ResourceNormalizer for TopicNormalizer {
    fn normalize(&self, raw_response: serde_json::Value, account: &str, region: &str, query_timestamp: DateTime<Utc>,) -> Result<ResourceEntry> {
        let topic_arn = raw_response.get("TopicArn");
        let tags = extract_tags(&raw_response);
        todo!()
    }
    fn resource_type(&self) -> &'static str { "AWS::SNS::Topic" }
}"#;
        let first = synthesize(source);
        assert_eq!(first, synthesize(source));
        assert!(first.contains("query_timestamp: DateTime<Utc>, aws_client: &AWSResourceClient)"));
    }
}
