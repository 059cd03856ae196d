//! Registry wire model and output.
//!
//! These types serialize to the shadcn registry schema that installer CLIs
//! consume: one aggregate `registry.json` plus one `<name>.json` per item.
//! Field order is fixed by the struct definitions, so output is stable.

use crate::error::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Closed set of item and file kinds understood by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "registry:lib")]
    Lib,
    #[serde(rename = "registry:block")]
    Block,
    #[serde(rename = "registry:component")]
    Component,
    #[serde(rename = "registry:ui")]
    Ui,
    #[serde(rename = "registry:hook")]
    Hook,
    #[serde(rename = "registry:theme")]
    Theme,
    #[serde(rename = "registry:page")]
    Page,
    #[serde(rename = "registry:file")]
    File,
    #[serde(rename = "registry:style")]
    Style,
    #[serde(rename = "registry:item")]
    Item,
}

impl ItemKind {
    pub const ALL: [ItemKind; 10] = [
        Self::Lib,
        Self::Block,
        Self::Component,
        Self::Ui,
        Self::Hook,
        Self::Theme,
        Self::Page,
        Self::File,
        Self::Style,
        Self::Item,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lib => "registry:lib",
            Self::Block => "registry:block",
            Self::Component => "registry:component",
            Self::Ui => "registry:ui",
            Self::Hook => "registry:hook",
            Self::Theme => "registry:theme",
            Self::Page => "registry:page",
            Self::File => "registry:file",
            Self::Style => "registry:style",
            Self::Item => "registry:item",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Kinds whose files must say where they install.
    pub fn requires_target(self) -> bool {
        matches!(self, Self::File | Self::Page)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFile {
    /// Source path, `/`-separated, relative to the project root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Install location in the consumer project.
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub title: String,
    pub description: String,
    pub author: String,
    pub dependencies: Vec<String>,
    pub registry_dependencies: Vec<String>,
    pub files: Vec<RegistryFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub name: String,
    pub homepage: String,
    pub items: Vec<RegistryItem>,
}

/// A per-item document: the item with its own `$schema` first.
#[derive(Serialize)]
struct ItemDocument<'a> {
    #[serde(rename = "$schema")]
    schema: &'a str,
    #[serde(flatten)]
    item: &'a RegistryItem,
}

/// Outcome of writing per-item documents.
#[derive(Debug, Default)]
pub struct WriteSummary {
    pub aggregate: PathBuf,
    pub written: Vec<PathBuf>,
    /// Item name and error for each document that could not be written.
    pub failed: Vec<(String, String)>,
}

fn to_pretty_json<T: Serialize>(value: &T, path: &Path) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| GeneratorError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');
    Ok(text)
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| GeneratorError::io(path, e))
}

/// Writes the aggregate document, then one document per item.
///
/// Failing to write the aggregate is an error; a failed item document is
/// logged and recorded in the summary.
pub fn write_registry(
    registry: &Registry,
    aggregate: &Path,
    item_dir: &Path,
    item_schema: &str,
) -> Result<WriteSummary> {
    write_file(aggregate, &to_pretty_json(registry, aggregate)?)?;
    info!(path = %aggregate.display(), "wrote main registry");

    std::fs::create_dir_all(item_dir).map_err(|e| GeneratorError::io(item_dir, e))?;

    let mut summary = WriteSummary {
        aggregate: aggregate.to_path_buf(),
        ..WriteSummary::default()
    };

    for item in &registry.items {
        let path = item_dir.join(format!("{}.json", item.name));
        let document = ItemDocument {
            schema: item_schema,
            item,
        };
        match to_pretty_json(&document, &path).and_then(|text| write_file(&path, &text)) {
            Ok(()) => summary.written.push(path),
            Err(e) => {
                error!(item = %item.name, error = %e, "failed to write registry item");
                summary.failed.push((item.name.clone(), e.to_string()));
            }
        }
    }

    info!(
        count = summary.written.len(),
        dir = %item_dir.display(),
        "wrote individual registry files"
    );
    Ok(summary)
}

/// Reads a previously generated registry as untyped JSON, for validation.
pub fn read_document(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| GeneratorError::Json {
        path: path.to_path_buf(),
        source,
    })
}
