//! Import rewriting for emitted registry files.
//!
//! Blocks are authored with relative imports, but an installed file has to
//! resolve against the consumer's layout where only the aliases are stable.
//! A relative specifier naming a sibling module (`./x`, `../x`, no further
//! separator) is replaced by `<alias>/x`, where the alias depends on the
//! file's role. Specifiers are located by the tree-sitter parser, so only
//! real import declarations are touched. Replacements are span-based and
//! applied back to front so earlier offsets stay valid.

use crate::config::AliasConfig;
use crate::parser::{SpecifierSpan, TreeSitterParser};
use crate::role::FileRole;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A single text replacement with position information.
#[derive(Debug, Clone)]
struct Replacement {
    start: usize,
    end: usize,
    new_text: String,
}

/// Returns the aliased form of `specifier` if it is a sibling-relative import.
fn alias_specifier(specifier: &str, alias_root: &str) -> Option<String> {
    let rest = specifier
        .strip_prefix("./")
        .or_else(|| specifier.strip_prefix("../"))?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(format!("{}/{}", alias_root.trim_end_matches('/'), rest))
}

/// Rewrites the eligible imports among `imports`, spans located in `content`,
/// for a file of `role`.
///
/// Side-effect imports, already-aliased and package imports are untouched, so
/// the rewrite is idempotent.
pub fn rewrite_imports(
    content: &str,
    imports: &[SpecifierSpan],
    role: FileRole,
    aliases: &AliasConfig,
) -> String {
    let alias_root = role.alias_root(aliases);

    let mut replacements: Vec<Replacement> = imports
        .iter()
        .filter(|span| span.has_clause)
        .filter_map(|span| {
            let new_text = alias_specifier(&span.specifier, alias_root)?;
            Some(Replacement {
                start: span.start,
                end: span.end,
                new_text,
            })
        })
        .collect();

    // Apply from end to start
    replacements.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    for rep in replacements {
        result.replace_range(rep.start..rep.end, &rep.new_text);
    }
    result
}

/// Issues found by [`validate_transformations`]. Never fatal.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransformCheck {
    pub issues: Vec<String>,
}

impl TransformCheck {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Flags relative imports that survived rewriting and doubled alias separators,
/// given the import specifiers before and after.
pub fn validate_transformations(original: &[String], transformed: &[String]) -> TransformCheck {
    let mut check = TransformCheck::default();

    let is_relative = |spec: &String| spec.starts_with("./") || spec.starts_with("../");

    if original.iter().any(is_relative) {
        let remaining = transformed.iter().filter(|s| is_relative(s)).count();
        if remaining > 0 {
            check
                .issues
                .push(format!("{} relative imports were not transformed", remaining));
        }
    }

    let malformed: Vec<&str> = transformed
        .iter()
        .filter(|s| s.contains("//") && !s.contains("://"))
        .map(String::as_str)
        .collect();
    if !malformed.is_empty() {
        check.issues.push(format!(
            "found malformed alias imports with double slashes: {}",
            malformed.join(", ")
        ));
    }

    check
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    role: FileRole,
}

/// Run-scoped memo of rewritten file contents, keyed by `(path, role)`.
///
/// There is no eviction: the cache lives for one generation run. Entries are
/// a pure function of their key, so concurrent users only need to serialize
/// inserts.
#[derive(Debug, Default)]
pub struct TransformCache {
    entries: HashMap<CacheKey, String>,
    hits: usize,
    misses: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

impl TransformCache {
    fn get(&mut self, key: &CacheKey) -> Option<&String> {
        match self.entries.get(key) {
            Some(content) => {
                self.hits += 1;
                Some(content)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Reads source files and rewrites their imports, memoizing the result.
pub struct ImportTransformer {
    aliases: AliasConfig,
    parser: TreeSitterParser,
    cache: TransformCache,
}

impl ImportTransformer {
    pub fn new(aliases: AliasConfig) -> Self {
        Self {
            aliases,
            parser: TreeSitterParser::new(),
            cache: TransformCache::default(),
        }
    }

    /// Rewritten content of `path`, or `None` if the file cannot be read.
    pub fn transform_imports(&mut self, path: &Path, role: FileRole) -> Option<String> {
        let key = CacheKey {
            path: path.to_path_buf(),
            role,
        };
        if let Some(content) = self.cache.get(&key) {
            return Some(content.clone());
        }

        let original = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read file for import rewriting");
                return None;
            }
        };

        let transformed = self.transform_content(path, &original, role);
        let check = self.check_transformation(path, &original, &transformed);
        for issue in &check.issues {
            warn!(path = %path.display(), "{}", issue);
        }

        self.cache.entries.insert(key, transformed.clone());
        Some(transformed)
    }

    /// Rewrites in-memory `content`; `path` only selects the grammar.
    pub fn transform_content(&mut self, path: &Path, content: &str, role: FileRole) -> String {
        let imports = self.import_spans(path, content);
        rewrite_imports(content, &imports, role, &self.aliases)
    }

    /// Runs [`validate_transformations`] over the imports of both texts.
    pub fn check_transformation(
        &mut self,
        path: &Path,
        original: &str,
        transformed: &str,
    ) -> TransformCheck {
        let mut specifiers = |text: &str| -> Vec<String> {
            self.import_spans(path, text)
                .into_iter()
                .filter(|span| span.has_clause)
                .map(|span| span.specifier)
                .collect()
        };
        let before = specifiers(original);
        let after = specifiers(transformed);
        validate_transformations(&before, &after)
    }

    fn import_spans(&mut self, path: &Path, content: &str) -> Vec<SpecifierSpan> {
        match self.parser.specifier_spans(path, content) {
            Ok(spans) => spans,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to locate imports, leaving file as is");
                Vec::new()
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
