use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const XDG_CONFIG_FILE: &str = "normalizer-migrate/config.toml";

/// Names the migration looks for and the names it emits.
///
/// Every field has a default matching the resource explorer's normalizer family,
/// so a config file only needs to list what differs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MigrationConfig {
    /// Synchronous contract whose implementations are migrated.
    pub sync_trait: String,
    /// Asynchronous sibling contract emitted for each migrated block.
    pub async_trait: String,
    /// Suffix an implementing type's name must carry to be considered.
    pub type_suffix: String,
    pub normalize_method: String,
    /// Accessor whose string literal names the resource type.
    pub type_tag_method: String,
    pub tag_binding: String,
    pub tag_extraction_fn: String,
    /// Name and type of the collaborator parameter threaded into the async method.
    pub client_param: String,
    pub client_type: String,
    pub fetch_method: String,
    pub add_async_trait_import: bool,
    /// Skip blocks where more than one binding could be the resource identifier.
    pub strict_resource_id: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            sync_trait: "ResourceNormalizer".to_string(),
            async_trait: "AsyncResourceNormalizer".to_string(),
            type_suffix: "Normalizer".to_string(),
            normalize_method: "normalize".to_string(),
            type_tag_method: "resource_type".to_string(),
            tag_binding: "tags".to_string(),
            tag_extraction_fn: "extract_tags".to_string(),
            client_param: "aws_client".to_string(),
            client_type: "AWSResourceClient".to_string(),
            fetch_method: "fetch_tags_for_resource".to_string(),
            add_async_trait_import: true,
            strict_resource_id: false,
        }
    }
}

impl MigrationConfig {
    /// Rejects names that could never match or would emit invalid code.
    pub fn validate(&self) -> Result<()> {
        let identifiers = [
            ("sync_trait", &self.sync_trait),
            ("async_trait", &self.async_trait),
            ("normalize_method", &self.normalize_method),
            ("type_tag_method", &self.type_tag_method),
            ("tag_binding", &self.tag_binding),
            ("tag_extraction_fn", &self.tag_extraction_fn),
            ("client_param", &self.client_param),
            ("fetch_method", &self.fetch_method),
        ];
        for (field, value) in identifiers {
            if !is_identifier(value) {
                return Err(anyhow!("`{field}` must be a Rust identifier, got '{value}'"));
            }
        }
        if self.sync_trait == self.async_trait {
            return Err(anyhow!(
                "`sync_trait` and `async_trait` must differ, both are '{}'",
                self.sync_trait
            ));
        }
        if self.type_suffix.trim().is_empty() {
            return Err(anyhow!("`type_suffix` must not be empty"));
        }
        if self.client_type.split("::").any(|segment| !is_identifier(segment)) {
            return Err(anyhow!(
                "`client_type` must be a type path, got '{}'",
                self.client_type
            ));
        }
        Ok(())
    }
}

/// Loads the configuration.
///
/// An explicit path must exist. Without one, the XDG config file is used when
/// present and the built-in defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<MigrationConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => xdg_config_path(),
    };

    let config = match path {
        Some(path) => load_from(&path)?,
        None => MigrationConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

pub fn load_from(path: &Path) -> Result<MigrationConfig> {
    let config_string = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: MigrationConfig = toml::from_str(&config_string)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

fn xdg_config_path() -> Option<PathBuf> {
    xdg::BaseDirectories::new().find_config_file(XDG_CONFIG_FILE)
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
