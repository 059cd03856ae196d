//! Block metadata loading.
//!
//! The catalog is a plain JSON document, never executed. Each entry is
//! checked on its own: a malformed or duplicated entry is reported and
//! dropped, and only an unreadable or non-array source aborts the run.

use crate::error::{GeneratorError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// How a block's files are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Organization {
    SingleFile,
    Directory,
}

impl Organization {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "file" | "single-file" => Some(Self::SingleFile),
            "directory" => Some(Self::Directory),
            _ => None,
        }
    }
}

/// Optional presentation hints carried through from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayoutHints {
    pub iframe_height: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockMetadata {
    pub id: String,
    pub category: String,
    pub display_name: String,
    pub organization: Option<Organization>,
    pub layout: LayoutHints,
}

/// Valid entries keyed by id, plus the reasons other entries were dropped.
#[derive(Debug, Default)]
pub struct MetadataCatalog {
    pub blocks: BTreeMap<String, BlockMetadata>,
    pub warnings: Vec<String>,
}

impl MetadataCatalog {
    pub fn get(&self, id: &str) -> Option<&BlockMetadata> {
        self.blocks.get(id)
    }

    /// Title for `id`, falling back to one generated from the id itself.
    pub fn block_metadata(&self, id: &str) -> (String, Option<&BlockMetadata>) {
        match self.blocks.get(id) {
            Some(meta) => (meta.display_name.clone(), Some(meta)),
            None => {
                warn!(block = id, "no metadata for block, using generated title");
                (format_title(id), None)
            }
        }
    }
}

/// Reads and validates the catalog at `path`.
pub fn load_metadata(path: &Path) -> Result<MetadataCatalog> {
    info!(path = %path.display(), "loading block metadata");

    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            GeneratorError::MetadataNotFound {
                path: path.to_path_buf(),
            }
        } else {
            GeneratorError::MetadataRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let document: Value = serde_json::from_str(&text).map_err(|e| GeneratorError::MetadataFormat {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let entries = entries_of(&document).ok_or_else(|| GeneratorError::MetadataFormat {
        path: path.to_path_buf(),
        reason: format!(
            "expected an array of blocks (or an object with `blocksMetadata`), got {}",
            json_type(&document)
        ),
    })?;

    let catalog = parse_entries(entries);

    if !catalog.warnings.is_empty() {
        warn!(
            count = catalog.warnings.len(),
            "metadata entries were rejected"
        );
        for warning in &catalog.warnings {
            warn!("  {}", warning);
        }
    }
    info!(blocks = catalog.blocks.len(), "loaded block metadata");

    Ok(catalog)
}

fn entries_of(document: &Value) -> Option<&Vec<Value>> {
    match document {
        Value::Array(entries) => Some(entries),
        Value::Object(map) => map.get("blocksMetadata").and_then(Value::as_array),
        _ => None,
    }
}

/// Validates each entry; the first occurrence of an id wins.
pub fn parse_entries(entries: &[Value]) -> MetadataCatalog {
    let mut catalog = MetadataCatalog::default();

    for (index, entry) in entries.iter().enumerate() {
        let meta = match validate_entry(entry, index) {
            Ok(meta) => meta,
            Err(reason) => {
                catalog.warnings.push(reason);
                continue;
            }
        };

        if catalog.blocks.contains_key(&meta.id) {
            catalog
                .warnings
                .push(format!("duplicate block id \"{}\" at index {}", meta.id, index));
            continue;
        }

        catalog.blocks.insert(meta.id.clone(), meta);
    }

    catalog
}

fn validate_entry(entry: &Value, index: usize) -> std::result::Result<BlockMetadata, String> {
    let Some(object) = entry.as_object() else {
        return Err(format!(
            "invalid metadata entry at index {}: expected object, got {}",
            index,
            json_type(entry)
        ));
    };

    let field = |name: &str| object.get(name).and_then(Value::as_str).filter(|s| !s.is_empty());

    let Some(id) = field("id") else {
        return Err(format!(
            "invalid metadata entry at index {}: missing or invalid 'id' field",
            index
        ));
    };
    let Some(name) = field("name") else {
        return Err(format!(
            "invalid metadata entry at index {} (id: {}): missing or invalid 'name' field",
            index, id
        ));
    };
    let Some(category) = field("category") else {
        return Err(format!(
            "invalid metadata entry at index {} (id: {}): missing or invalid 'category' field",
            index, id
        ));
    };

    let kind = object.get("organizationKind").or_else(|| object.get("type"));
    let organization = match kind {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_str().and_then(Organization::parse) {
            Some(org) => Some(org),
            None => {
                return Err(format!(
                    "invalid metadata entry at index {} (id: {}): organization kind must be 'file', 'single-file' or 'directory'",
                    index, id
                ));
            }
        },
    };

    Ok(BlockMetadata {
        id: id.to_string(),
        category: category.to_string(),
        display_name: name.to_string(),
        organization,
        layout: LayoutHints {
            iframe_height: field("iframeHeight").map(str::to_string),
        },
    })
}

/// `"login-01"` becomes `"Login 01"`.
pub fn format_title(id: &str) -> String {
    id.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
