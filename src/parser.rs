//! Source parsing for import extraction and rewriting.
//!
//! [`SourceParser`] is the seam between dependency extraction and whatever
//! understands the source language. Its lifecycle is explicit: create one,
//! feed it many files, then [`SourceParser::release`] it at the end of the
//! run. The tree-sitter implementation keeps one parser and remembers every
//! file it has parsed until released.

use crate::error::{GeneratorError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser};

pub trait SourceParser {
    /// Module specifiers of every top-level import declaration in `path`, in
    /// source order.
    fn import_specifiers(&mut self, path: &Path) -> Result<Vec<String>>;

    /// Drops everything accumulated so far. The parser stays usable.
    fn release(&mut self);
}

/// Where an import's module specifier sits in the source, quotes excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifierSpan {
    pub start: usize,
    pub end: usize,
    pub specifier: String,
    /// `import <clause> from "..."` rather than a bare side-effect import.
    pub has_clause: bool,
}

/// Grammar used for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    /// TSX also covers plain JavaScript and JSX.
    Tsx,
}

impl Dialect {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ts" | "mts" | "cts") => Self::TypeScript,
            _ => Self::Tsx,
        }
    }

    fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

pub struct TreeSitterParser {
    parser: Parser,
    dialect: Option<Dialect>,
    parsed: HashMap<PathBuf, Vec<String>>,
}

impl Default for TreeSitterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSitterParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            dialect: None,
            parsed: HashMap::new(),
        }
    }

    /// Number of files parsed since creation or the last release.
    pub fn parsed_files(&self) -> usize {
        self.parsed.len()
    }

    /// Extracts import specifiers from in-memory source.
    pub fn specifiers_in(&mut self, path: &Path, source: &str) -> Result<Vec<String>> {
        Ok(self
            .specifier_spans(path, source)?
            .into_iter()
            .map(|span| span.specifier)
            .collect())
    }

    /// Locates the specifier of every top-level import declaration.
    ///
    /// Import-shaped text inside comments, strings or templates is not an
    /// `import_statement` node and never shows up here.
    pub fn specifier_spans(&mut self, path: &Path, source: &str) -> Result<Vec<SpecifierSpan>> {
        let dialect = Dialect::for_path(path);
        if self.dialect != Some(dialect) {
            self.parser.set_language(&dialect.language())?;
            self.dialect = Some(dialect);
        }

        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| GeneratorError::Parse {
                path: path.to_path_buf(),
                reason: "parser produced no tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            // Still extractable; tree-sitter recovers around the bad region.
            warn!(path = %path.display(), "syntax errors while parsing imports");
        }

        let mut cursor = root.walk();
        let spans = root
            .children(&mut cursor)
            .filter(|node| node.kind() == "import_statement")
            .filter_map(|node| import_span(node, source))
            .collect();

        Ok(spans)
    }
}

impl SourceParser for TreeSitterParser {
    fn import_specifiers(&mut self, path: &Path) -> Result<Vec<String>> {
        if let Some(existing) = self.parsed.get(path) {
            return Ok(existing.clone());
        }

        let source =
            std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        let specifiers = self.specifiers_in(path, &source)?;
        self.parsed.insert(path.to_path_buf(), specifiers.clone());
        Ok(specifiers)
    }

    fn release(&mut self) {
        debug!(files = self.parsed.len(), "releasing parsed sources");
        self.parsed.clear();
        self.parser.reset();
    }
}

/// Span of the unquoted module specifier of an `import_statement` node.
fn import_span(node: Node<'_>, source: &str) -> Option<SpecifierSpan> {
    let mut cursor = node.walk();
    let mut has_clause = false;
    let mut string = node.child_by_field_name("source");
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_clause" => has_clause = true,
            "string" if string.is_none() => string = Some(child),
            "from_clause" if string.is_none() => string = child.child_by_field_name("source"),
            _ => {}
        }
    }
    let string = string?;

    let text = source.get(string.start_byte()..string.end_byte())?;
    let quoted = text.len() >= 2
        && (text.starts_with('"') || text.starts_with('\''))
        && text.ends_with(&text[..1]);
    let (start, end) = if quoted {
        (string.start_byte() + 1, string.end_byte() - 1)
    } else {
        (string.start_byte(), string.end_byte())
    };

    let specifier = source.get(start..end)?;
    (!specifier.is_empty()).then(|| SpecifierSpan {
        start,
        end,
        specifier: specifier.to_string(),
        has_clause,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn specifiers(name: &str, source: &str) -> Vec<String> {
        TreeSitterParser::new()
            .specifiers_in(Path::new(name), source)
            .unwrap()
    }

    #[test]
    fn extracts_all_import_forms_in_order() {
        let source = r#"
"use client";
import * as React from "react";
import { useState } from 'react';
import Link from "next/link";
import type { Item } from "./types";
import "./styles.css";
import { Button } from "@/components/ui/button";

export function Demo() {
  return <Button>hi</Button>;
}
"#;
        assert_eq!(
            specifiers("demo.tsx", source),
            vec![
                "react",
                "react",
                "next/link",
                "./types",
                "./styles.css",
                "@/components/ui/button"
            ]
        );
    }

    #[test]
    fn ignores_dynamic_imports_and_strings() {
        let source = r#"
const lazy = () => import("heavy-module");
const text = "import x from 'not-real'";
"#;
        assert!(specifiers("lazy.ts", source).is_empty());
    }

    #[test]
    fn spans_cover_only_real_import_specifiers() {
        let source = r#"// import x from "./y"
import { Card } from './card';
import "./styles.css";
const s = 'import z from "./w"';
"#;
        let spans = TreeSitterParser::new()
            .specifier_spans(Path::new("card-02.tsx"), source)
            .unwrap();

        let found: Vec<(&str, bool)> = spans
            .iter()
            .map(|s| (s.specifier.as_str(), s.has_clause))
            .collect();
        assert_eq!(found, vec![("./card", true), ("./styles.css", false)]);
        assert_eq!(&source[spans[0].start..spans[0].end], "./card");
    }

    #[test]
    fn typescript_dialect_for_ts_files() {
        assert_eq!(Dialect::for_path(Path::new("a.ts")), Dialect::TypeScript);
        assert_eq!(Dialect::for_path(Path::new("a.tsx")), Dialect::Tsx);
        assert_eq!(Dialect::for_path(Path::new("a.jsx")), Dialect::Tsx);
        assert_eq!(Dialect::for_path(Path::new("a.js")), Dialect::Tsx);
    }

    #[test]
    fn switches_grammar_between_files() {
        let mut parser = TreeSitterParser::new();
        let ts = parser
            .specifiers_in(Path::new("a.ts"), "import { z } from \"zod\";\nconst n = <number>1;")
            .unwrap();
        assert_eq!(ts, vec!["zod"]);
        let tsx = parser
            .specifiers_in(Path::new("b.tsx"), "import { X } from \"lucide-react\";\nconst e = <X />;")
            .unwrap();
        assert_eq!(tsx, vec!["lucide-react"]);
    }

    #[test]
    fn recovers_imports_from_broken_source() {
        let source = "import { motion } from \"framer-motion\";\nconst = ;\n";
        assert_eq!(specifiers("broken.tsx", source), vec!["framer-motion"]);
    }

    #[test]
    fn remembers_parsed_files_until_released() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("card.tsx");
        fs::write(&file, "import { cva } from \"class-variance-authority\";").unwrap();

        let mut parser = TreeSitterParser::new();
        assert_eq!(
            parser.import_specifiers(&file).unwrap(),
            vec!["class-variance-authority"]
        );
        fs::write(&file, "import { clsx } from \"clsx\";").unwrap();
        assert_eq!(
            parser.import_specifiers(&file).unwrap(),
            vec!["class-variance-authority"]
        );
        assert_eq!(parser.parsed_files(), 1);

        parser.release();
        assert_eq!(parser.parsed_files(), 0);
        assert_eq!(parser.import_specifiers(&file).unwrap(), vec!["clsx"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut parser = TreeSitterParser::new();
        assert!(parser.import_specifiers(&dir.path().join("gone.tsx")).is_err());
    }
}
