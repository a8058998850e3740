use super::*;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Normalizer for Foo resources
pub struct FooNormalizer;

impl ResourceNormalizer for FooNormalizer {
    fn normalize(
        &self,
        raw_response: serde_json::Value,
        account: &str,
        region: &str,
        query_timestamp: DateTime<Utc>,
    ) -> Result<ResourceEntry> {
        let foo_id = raw_response
            .get("FooId")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown-foo")
            .to_string();

        let display_name = extract_display_name(&raw_response, &foo_id);
        let status = extract_status(&raw_response);
        let tags = extract_tags(&raw_response);
        let properties = create_normalized_properties(&raw_response);

        Ok(ResourceEntry {
            resource_type: "AWS::Foo::Bar".to_string(),
            account_id: account.to_string(),
            region: region.to_string(),
            resource_id: foo_id,
            display_name,
            status,
            properties,
            raw_properties: raw_response,
            tags,
            relationships: Vec::new(),
            account_color: assign_account_color(account),
            region_color: assign_region_color(region),
            query_timestamp,
        })
    }

    fn extract_relationships(
        &self,
        _entry: &ResourceEntry,
        _all_resources: &[ResourceEntry],
    ) -> Vec<ResourceRelationship> {
        // "let tags = extract_tags(&raw_response);" is only mentioned here
        Vec::new()
    }

    fn resource_type(&self) -> &'static str {
        "AWS::Foo::Bar"
    }
}
