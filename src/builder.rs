//! Registry assembly.
//!
//! Drives the other stages over every category and block, in sorted order,
//! and turns each discovered block into one registry item. A block that
//! cannot be processed is logged and left out; the rest of the run goes on.

use crate::analyzer::{DependencyExtractor, DependencySet};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::metadata::{MetadataCatalog, Organization, load_metadata};
use crate::parser::{SourceParser, TreeSitterParser};
use crate::registry::{self, ItemKind, Registry, RegistryFile, RegistryItem, WriteSummary};
use crate::role::FileRole;
use crate::scanner::{FileRecord, FileScanner};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// A block after scanning and dependency extraction.
#[derive(Debug, Clone)]
pub struct BlockRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub organization: Organization,
    pub files: Vec<FileRecord>,
    pub dependencies: DependencySet,
}

impl BlockRecord {
    /// Directory blocks that ship a page are pages; everything else is a block.
    pub fn item_kind(&self) -> ItemKind {
        let has_page = self.files.iter().any(|f| f.role == FileRole::Page);
        if self.organization == Organization::Directory && has_page {
            ItemKind::Page
        } else {
            ItemKind::Block
        }
    }
}

/// Result of the builder's own consistency checks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl BuildValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct RegistryBuilder {
    config: GeneratorConfig,
    scanner: FileScanner,
    extractor: DependencyExtractor,
}

impl RegistryBuilder {
    /// Builder backed by the tree-sitter parser.
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_parser(config, Box::new(TreeSitterParser::new()))
    }

    pub fn with_parser(config: GeneratorConfig, parser: Box<dyn SourceParser>) -> Self {
        let scanner = FileScanner::new(&config);
        let extractor = DependencyExtractor::new(parser, config.aliases.clone());
        Self {
            config,
            scanner,
            extractor,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn scanner(&self) -> &FileScanner {
        &self.scanner
    }

    /// Runs metadata loading, discovery and assembly.
    ///
    /// Fails only when the metadata or the components directory is unusable.
    pub fn build_registry(&mut self) -> Result<Registry> {
        info!("building registry");

        let catalog = load_metadata(&self.config.metadata_file)?;
        let blocks = self.discover_blocks(&catalog)?;

        let mut items: Vec<RegistryItem> = blocks
            .iter()
            .map(|block| self.build_item(block, &catalog))
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));

        info!(items = items.len(), "built registry");
        Ok(Registry {
            schema: self.config.schema.clone(),
            name: self.config.name.clone(),
            homepage: self.config.homepage.clone(),
            items,
        })
    }

    /// Scans every block of every category, sorted by name.
    pub fn discover_blocks(&mut self, catalog: &MetadataCatalog) -> Result<Vec<BlockRecord>> {
        let categories = self.scanner.list_categories()?;
        info!(
            count = categories.len(),
            categories = %categories.join(", "),
            "discovered categories"
        );

        let mut blocks: Vec<BlockRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for category in &categories {
            let category_path = self.config.components_dir.join(category);
            let entries = self.scanner.list_category_entries(&category_path);
            debug!(category = %category, entries = entries.len(), "scanning category");

            for entry_name in &entries {
                let entry = match self.scanner.block_entry(&category_path, entry_name) {
                    Ok(entry) => entry,
                    Err(e) => {
                        error!(category = %category, entry = %entry_name, error = %e, "failed to process block");
                        continue;
                    }
                };

                // Item names must be unique; the first block with an id wins
                if seen.contains(&entry.id) {
                    warn!(
                        block = %entry.id,
                        category = %category,
                        path = %entry.path.display(),
                        "duplicate block id, keeping the first occurrence"
                    );
                    continue;
                }

                let (title, metadata) = catalog.block_metadata(&entry.id);
                let description = format!("A {} block.", title.to_lowercase());

                let files = self.scanner.scan_block(&entry.path, entry.is_directory);
                if files.is_empty() {
                    warn!(block = %entry.id, "no files found for block, skipping");
                    continue;
                }

                let paths: Vec<PathBuf> = files.iter().map(|f| f.absolute_path.clone()).collect();
                let dependencies = self.extractor.extract_from_files(&paths);

                let organization = metadata.and_then(|m| m.organization).unwrap_or(
                    if entry.is_directory {
                        Organization::Directory
                    } else {
                        Organization::SingleFile
                    },
                );

                seen.insert(entry.id.clone());
                blocks.push(BlockRecord {
                    id: entry.id,
                    title,
                    description,
                    category: metadata
                        .map(|m| m.category.clone())
                        .unwrap_or_else(|| category.clone()),
                    organization,
                    files,
                    dependencies,
                });
            }
        }

        info!(count = blocks.len(), "discovered blocks");
        Ok(blocks)
    }

    fn build_item(&self, block: &BlockRecord, catalog: &MetadataCatalog) -> RegistryItem {
        let files = block
            .files
            .iter()
            .map(|file| RegistryFile {
                path: file.source_path.clone(),
                kind: file.role.kind(),
                target: file.target.clone(),
                content: file.content.clone(),
            })
            .collect();

        let categories = catalog
            .get(&block.id)
            .map(|m| vec![m.category.clone()])
            .unwrap_or_else(|| vec![block.category.clone()]);

        RegistryItem {
            name: block.id.clone(),
            kind: block.item_kind(),
            title: block.title.clone(),
            description: block.description.clone(),
            author: self.config.author.clone(),
            dependencies: block.dependencies.external.iter().cloned().collect(),
            registry_dependencies: block.dependencies.registry.iter().cloned().collect(),
            files,
            categories: Some(categories),
        }
    }

    /// Writes the aggregate document and one document per item.
    pub fn write_registry(&self, registry: &Registry) -> Result<WriteSummary> {
        registry::write_registry(
            registry,
            &self.config.output_file,
            &self.config.individual_output_dir,
            &self.config.item_schema,
        )
    }

    /// Releases the parser and the rewrite cache at the end of a run.
    pub fn finish(&mut self) {
        self.extractor.cleanup();
        self.scanner.transformer_mut().clear_cache();
    }
}

/// Checks a built registry for duplicate names, empty items and incomplete
/// file entries.
pub fn validate_registry(registry: &Registry) -> BuildValidation {
    let mut result = BuildValidation::default();

    if registry.name.is_empty() {
        result.errors.push("Registry name is required".to_string());
    }
    if registry.homepage.is_empty() {
        result.errors.push("Registry homepage is required".to_string());
    }

    let mut names = HashSet::new();
    for (index, item) in registry.items.iter().enumerate() {
        if item.name.is_empty() {
            result
                .errors
                .push(format!("Item at index {} is missing name", index));
        } else if !names.insert(item.name.as_str()) {
            result
                .errors
                .push(format!("Duplicate item name \"{}\" found", item.name));
        }

        if item.files.is_empty() {
            result
                .errors
                .push(format!("Item \"{}\" has no files", item.name));
        }

        for (file_index, file) in item.files.iter().enumerate() {
            if file.path.is_empty() {
                result.errors.push(format!(
                    "Item \"{}\" file at index {} is missing path",
                    item.name, file_index
                ));
            }
            if file.target.is_empty() {
                result.errors.push(format!(
                    "Item \"{}\" file at index {} is missing target",
                    item.name, file_index
                ));
            }
        }

        if item.description.is_empty() {
            result
                .warnings
                .push(format!("Item \"{}\" is missing description", item.name));
        }

        if item.registry_dependencies.is_empty() && item.dependencies.is_empty() {
            result.warnings.push(format!(
                "Item \"{}\" has no dependencies - this might be unusual",
                item.name
            ));
        }
    }

    result
}
