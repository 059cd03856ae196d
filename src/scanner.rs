//! Component tree scanner.
//!
//! Lists categories and block entries under the components directory, and
//! walks each block to collect its source files. Every listing is sorted by
//! name so repeated runs see the tree in the same order.

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::rewriter::ImportTransformer;
use crate::role::{FileRole, classify};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const SOURCE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js"];

/// Name fragments of declaration, test, spec and story files.
const SUPPRESSED: &[&str] = &[
    ".d.ts",
    ".test.ts",
    ".test.tsx",
    ".spec.ts",
    ".spec.tsx",
    ".stories.ts",
    ".stories.tsx",
];

/// A discovered source file of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub absolute_path: PathBuf,
    /// Relative to the components directory, `/`-separated.
    pub relative_path: String,
    /// The components directory as configured, joined with `relative_path`.
    pub source_path: String,
    pub role: FileRole,
    pub target: String,
    pub content: Option<String>,
}

/// A category entry resolved to a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntry {
    pub id: String,
    pub path: PathBuf,
    pub is_directory: bool,
}

/// Whether `name` is a source file that belongs in the registry.
pub fn is_source_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    let has_extension = Path::new(&lower)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));

    has_extension && !SUPPRESSED.iter().any(|s| name.contains(s))
}

fn is_index_file(name: &str) -> bool {
    name.starts_with("index.")
}

/// Joins path components with `/` regardless of platform.
pub(crate) fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn sorted_dir_entries(dir: &Path) -> std::io::Result<Vec<(String, bool)>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type()?.is_dir();
        entries.push((name, is_dir));
    }
    entries.sort();
    Ok(entries)
}

pub struct FileScanner {
    components_dir: PathBuf,
    skip_index_files: bool,
    transformer: ImportTransformer,
}

impl FileScanner {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            components_dir: config.components_dir.clone(),
            skip_index_files: config.skip_index_files,
            transformer: ImportTransformer::new(config.aliases.clone()),
        }
    }

    pub fn transformer(&self) -> &ImportTransformer {
        &self.transformer
    }

    pub fn transformer_mut(&mut self) -> &mut ImportTransformer {
        &mut self.transformer
    }

    /// Category directories, sorted, without dotfiles.
    ///
    /// An unreadable components directory is fatal for the run.
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let entries = sorted_dir_entries(&self.components_dir)
            .map_err(|e| GeneratorError::io(&self.components_dir, e))?;

        Ok(entries
            .into_iter()
            .filter(|(name, is_dir)| *is_dir && !name.starts_with('.'))
            .map(|(name, _)| name)
            .collect())
    }

    /// Block entries of a category, sorted: directories and source files,
    /// skipping dotfiles and `index.*` aggregators.
    pub fn list_category_entries(&self, category_path: &Path) -> Vec<String> {
        match sorted_dir_entries(category_path) {
            Ok(entries) => entries
                .into_iter()
                .filter(|(name, is_dir)| {
                    !name.starts_with('.')
                        && !is_index_file(name)
                        && (*is_dir || is_source_file(name))
                })
                .map(|(name, _)| name)
                .collect(),
            Err(e) => {
                warn!(path = %category_path.display(), error = %e, "failed to read category directory");
                Vec::new()
            }
        }
    }

    /// Resolves `entry_name` inside `category_path` to a block id and shape.
    pub fn block_entry(&self, category_path: &Path, entry_name: &str) -> Result<BlockEntry> {
        let path = category_path.join(entry_name);
        let metadata = std::fs::metadata(&path).map_err(|e| GeneratorError::io(&path, e))?;
        let is_directory = metadata.is_dir();

        let id = if is_directory {
            entry_name.to_string()
        } else {
            Path::new(entry_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| entry_name.to_string())
        };

        Ok(BlockEntry {
            id,
            path,
            is_directory,
        })
    }

    /// Collects the files of the block at `path`.
    pub fn scan_block(&mut self, path: &Path, is_directory: bool) -> Vec<FileRecord> {
        if is_directory {
            self.scan_directory(path)
        } else {
            let name = path.file_name().map(PathBuf::from).unwrap_or_default();
            self.process_file(path, &name).into_iter().collect()
        }
    }

    fn scan_directory(&mut self, root: &Path) -> Vec<FileRecord> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %root.display(), error = %e, "failed to walk block directory");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !is_source_file(&name) || (self.skip_index_files && is_index_file(&name)) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            if let Some(record) = self.process_file(entry.path(), &relative) {
                files.push(record);
            }
        }

        files
    }

    /// Builds the record for one file; `in_block` is its path inside the block.
    fn process_file(&mut self, path: &Path, in_block: &Path) -> Option<FileRecord> {
        let placement = classify(in_block);

        let Some(content) = self.transformer.transform_imports(path, placement.role) else {
            warn!(path = %path.display(), "skipping unreadable file");
            return None;
        };

        let absolute_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let relative = path.strip_prefix(&self.components_dir).unwrap_or(path);

        debug!(path = %path.display(), role = ?placement.role, target = %placement.target, "scanned file");

        Some(FileRecord {
            absolute_path,
            relative_path: to_slash(relative),
            source_path: to_slash(&self.components_dir.join(relative)),
            role: placement.role,
            target: placement.target,
            content: Some(content),
        })
    }
}
