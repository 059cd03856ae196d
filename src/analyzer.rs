//! Dependency extraction.
//!
//! Classifies every import of a block's files as a registry dependency, an
//! external package, or something the consumer project already resolves
//! (relative paths, internal aliases, runtime built-ins).

use crate::config::AliasConfig;
use crate::parser::SourceParser;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Framework and runtime modules a consumer already has.
const BUILTIN_MODULES: &[&str] = &[
    "react",
    "react-dom",
    "next",
    "fs",
    "fs/promises",
    "path",
    "crypto",
    "util",
    "os",
    "stream",
    "events",
    "buffer",
    "url",
    "querystring",
    "http",
    "https",
    "zlib",
    "assert",
];

const BUILTIN_PREFIXES: &[&str] = &["react/", "react-dom/", "next/", "@next/", "node:"];

/// Registry and external dependencies of a file or block.
///
/// Sets, so repeated imports collapse; serialized sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencySet {
    pub registry: BTreeSet<String>,
    pub external: BTreeSet<String>,
}

impl DependencySet {
    pub fn extend(&mut self, other: DependencySet) {
        self.registry.extend(other.registry);
        self.external.extend(other.external);
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty() && self.external.is_empty()
    }
}

/// How a single import specifier is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportClass {
    /// UI primitive installed through the registry, by item name.
    Registry(String),
    Relative,
    Internal,
    Builtin,
    /// Third-party package, by package name.
    External(String),
}

/// Classifies `specifier`; the first matching rule wins:
///
/// 1. Under the UI alias: registry dependency named after the last segment
/// 2. `./` or `../`: relative, resolved inside the block
/// 3. Under the internal alias: resolved by the consumer project
/// 4. A known runtime or framework module
/// 5. Anything else: external package (`@scope/name` keeps two segments)
pub fn classify_import(specifier: &str, aliases: &AliasConfig) -> ImportClass {
    if let Some(rest) = specifier.strip_prefix(aliases.ui_prefix().as_str()) {
        if let Some(name) = rest.rsplit('/').next().filter(|n| !n.is_empty()) {
            return ImportClass::Registry(name.to_string());
        }
        return ImportClass::Internal;
    }

    if specifier.starts_with("./") || specifier.starts_with("../") {
        return ImportClass::Relative;
    }

    if specifier.starts_with(aliases.internal.as_str()) {
        return ImportClass::Internal;
    }

    if is_builtin(specifier) {
        return ImportClass::Builtin;
    }

    // Bare `.`/`..` and absolute paths never name a package
    if specifier.starts_with('.') || specifier.starts_with('/') {
        return ImportClass::Relative;
    }

    ImportClass::External(package_name(specifier))
}

fn is_builtin(specifier: &str) -> bool {
    BUILTIN_MODULES.contains(&specifier)
        || BUILTIN_PREFIXES
            .iter()
            .any(|prefix| specifier.starts_with(prefix))
}

/// `@radix-ui/react-slot/dist` becomes `@radix-ui/react-slot`, `date-fns/locale`
/// becomes `date-fns`.
pub fn package_name(specifier: &str) -> String {
    let mut parts = specifier.split('/');
    let first = parts.next().unwrap_or(specifier);
    if first.starts_with('@') {
        if let Some(second) = parts.next() {
            return format!("{}/{}", first, second);
        }
    }
    first.to_string()
}

/// Extracts dependencies through a shared [`SourceParser`].
pub struct DependencyExtractor {
    parser: Box<dyn SourceParser>,
    aliases: AliasConfig,
}

impl DependencyExtractor {
    pub fn new(parser: Box<dyn SourceParser>, aliases: AliasConfig) -> Self {
        Self { parser, aliases }
    }

    /// Dependencies of one file. A file that fails to parse contributes none.
    pub fn extract_dependencies(&mut self, path: &Path) -> DependencySet {
        let mut deps = DependencySet::default();

        let specifiers = match self.parser.import_specifiers(path) {
            Ok(specifiers) => specifiers,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse file for dependencies");
                return deps;
            }
        };

        for specifier in &specifiers {
            match classify_import(specifier, &self.aliases) {
                ImportClass::Registry(name) => {
                    deps.registry.insert(name);
                }
                ImportClass::External(name) => {
                    deps.external.insert(name);
                }
                ImportClass::Relative | ImportClass::Internal | ImportClass::Builtin => {}
            }
        }

        deps
    }

    /// Union of the dependencies of every file in `paths`.
    pub fn extract_from_files(&mut self, paths: &[PathBuf]) -> DependencySet {
        let mut all = DependencySet::default();
        for path in paths {
            all.extend(self.extract_dependencies(path));
        }
        all
    }

    /// Releases the parser's accumulated state at the end of a run.
    pub fn cleanup(&mut self) {
        self.parser.release();
    }
}
