//! Generator configuration.
//!
//! One `GeneratorConfig` is fixed for the whole run. A config file only needs
//! to name the keys it overrides; everything else keeps its default.
//!
//! ```toml
//! components_dir = "content/components"
//! author = "Jane Doe <https://example.com>"
//!
//! [aliases]
//! components = "~/components"
//! ```

use crate::error::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root of the component tree, one directory per category.
    pub components_dir: PathBuf,
    /// JSON file listing block metadata.
    pub metadata_file: PathBuf,
    /// Aggregate registry document.
    pub output_file: PathBuf,
    /// Directory receiving one `<name>.json` per item.
    pub individual_output_dir: PathBuf,
    pub author: String,
    /// `$schema` of the aggregate document.
    pub schema: String,
    /// `$schema` of each per-item document.
    pub item_schema: String,
    pub homepage: String,
    pub name: String,
    /// Drop `index.*` files when walking directory blocks.
    pub skip_index_files: bool,
    pub aliases: AliasConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            components_dir: PathBuf::from("content/components"),
            metadata_file: PathBuf::from("content/blocks-metadata.json"),
            output_file: PathBuf::from("public/r/registry.json"),
            individual_output_dir: PathBuf::from("public/r"),
            author: "Gocha Gochitashvili <https://lost-ui.vercel.app>".to_string(),
            schema: "https://ui.shadcn.com/schema/registry.json".to_string(),
            item_schema: "https://ui.shadcn.com/schema/registry-item.json".to_string(),
            homepage: "https://lost-ui.vercel.app".to_string(),
            name: "blocks".to_string(),
            skip_index_files: false,
            aliases: AliasConfig::default(),
        }
    }
}

/// Import aliases as they resolve in a consumer project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// Rewrite target for component, page and ui files.
    pub components: String,
    /// Rewrite target for library and hook files.
    pub lib: String,
    /// UI primitives; imports below it become registry dependencies.
    pub ui: String,
    /// Any specifier under this prefix resolves inside the consumer project.
    pub internal: String,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            components: "@/components".to_string(),
            lib: "@/lib".to_string(),
            ui: "@/components/ui".to_string(),
            internal: "@/".to_string(),
        }
    }
}

impl AliasConfig {
    /// UI alias with a trailing separator, e.g. `@/components/ui/`.
    pub fn ui_prefix(&self) -> String {
        format!("{}/", self.ui.trim_end_matches('/'))
    }
}

impl GeneratorConfig {
    /// Loads the defaults, overlaid with `path` when given.
    ///
    /// `.toml` files are parsed as TOML; anything else as JSON.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GeneratorError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let parsed = if is_toml {
            toml::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| GeneratorError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_without_path_uses_defaults() {
        let config = GeneratorConfig::load(None).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.aliases.ui_prefix(), "@/components/ui/");
    }

    #[test]
    fn partial_json_overrides_only_named_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.config.json");
        fs::write(&path, r#"{ "author": "Jane", "aliases": { "lib": "~/lib" } }"#).unwrap();

        let config = GeneratorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.author, "Jane");
        assert_eq!(config.aliases.lib, "~/lib");
        assert_eq!(config.aliases.components, "@/components");
        assert_eq!(config.name, "blocks");
    }

    #[test]
    fn toml_config_is_recognized_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.toml");
        fs::write(
            &path,
            "name = \"acme\"\nskip_index_files = true\n\n[aliases]\ncomponents = \"~/components\"\n",
        )
        .unwrap();

        let config = GeneratorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.name, "acme");
        assert!(config.skip_index_files);
        assert_eq!(config.aliases.components, "~/components");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = GeneratorConfig::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, GeneratorError::Config { .. }));
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(GeneratorConfig::load(Some(&path)).is_err());
    }
}
