//! Structural file-role classification.
//!
//! A file's role depends only on where it sits inside its block: the first
//! directory named `app`, `lib` or `hooks` decides both the role and where the
//! file lands in a consumer project. Everything else is a plain component.

use crate::config::AliasConfig;
use crate::registry::ItemKind;
use serde::Serialize;
use std::path::{Component, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Page,
    Library,
    Hook,
    Component,
}

impl FileRole {
    /// Role implied by a reserved directory name.
    fn from_reserved(segment: &str) -> Option<Self> {
        match segment {
            "app" => Some(Self::Page),
            "lib" => Some(Self::Library),
            "hooks" => Some(Self::Hook),
            _ => None,
        }
    }

    pub fn kind(self) -> ItemKind {
        match self {
            Self::Page => ItemKind::Page,
            Self::Library => ItemKind::Lib,
            Self::Hook => ItemKind::Hook,
            Self::Component => ItemKind::Component,
        }
    }

    /// Alias that relative imports in a file of this role are rewritten to.
    pub fn alias_root(self, aliases: &AliasConfig) -> &str {
        match self {
            Self::Page | Self::Component => &aliases.components,
            Self::Library | Self::Hook => &aliases.lib,
        }
    }
}

/// Role plus the install target of a file, `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub role: FileRole,
    pub target: String,
}

/// Classifies a file by its path relative to the block root.
///
/// For a single-file block, `relative` is just the file name.
pub fn classify(relative: &Path) -> Placement {
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let dirs = segments.len().saturating_sub(1);
    for (index, segment) in segments[..dirs].iter().enumerate() {
        if let Some(role) = FileRole::from_reserved(segment) {
            return Placement {
                role,
                target: segments[index..].join("/"),
            };
        }
    }

    Placement {
        role: FileRole::Component,
        target: format!("components/{}", segments.join("/")),
    }
}
