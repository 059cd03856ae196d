//! End-to-end runs of the registry pipeline over a temporary source tree.

use blocks_registry::builder::validate_registry;
use blocks_registry::{GeneratorConfig, ItemKind, RegistryBuilder, validator};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn config_for(root: &Path, out: &str) -> GeneratorConfig {
    GeneratorConfig {
        components_dir: root.join("content/components"),
        metadata_file: root.join("content/blocks-metadata.json"),
        output_file: root.join(out).join("registry.json"),
        individual_output_dir: root.join(out),
        ..GeneratorConfig::default()
    }
}

fn login_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "content/blocks-metadata.json",
        r#"[{ "id": "login-01", "category": "login", "name": "Login 1", "organizationKind": "single-file" }]"#,
    );
    write(
        dir.path(),
        "content/components/login/login-01.tsx",
        r#""use client";

import { useState } from "react";
import { Button } from "@/components/ui/button";

export default function Login01() {
  const [email, setEmail] = useState("");
  return <Button onClick={() => setEmail("")}>{email}</Button>;
}
"#,
    );
    dir
}

#[test]
fn single_file_login_block() {
    let dir = login_tree();
    let mut builder = RegistryBuilder::new(config_for(dir.path(), "public/r"));
    let registry = builder.build_registry().unwrap();
    builder.finish();

    assert_eq!(registry.items.len(), 1);
    let item = &registry.items[0];
    assert_eq!(item.name, "login-01");
    assert_eq!(item.kind, ItemKind::Block);
    assert_eq!(item.title, "Login 1");
    assert_eq!(item.registry_dependencies, vec!["button"]);
    assert!(item.dependencies.is_empty());
    assert_eq!(item.files.len(), 1);
    assert_eq!(item.files[0].kind, ItemKind::Component);
    assert_eq!(item.files[0].target, "components/login-01.tsx");
    assert!(item.files[0].path.ends_with("content/components/login/login-01.tsx"));

    let validation = validator::validate_registry(&registry);
    assert!(validation.is_valid, "{:?}", validation.errors);
    assert!(validate_registry(&registry).is_valid());
}

#[test]
fn directory_block_counts_source_files_only() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "content/blocks-metadata.json",
        r#"[{ "id": "file-upload-01", "category": "file-upload", "name": "File Upload 1", "type": "directory" }]"#,
    );
    let block = "content/components/file-upload/file-upload-01";
    write(
        root,
        &format!("{block}/index.tsx"),
        "import { Header } from \"./header\";\nimport { useDropzone } from \"react-dropzone\";\n",
    );
    write(root, &format!("{block}/header.tsx"), "import { Card } from \"@/components/ui/card\";\n");
    write(root, &format!("{block}/footer.tsx"), "import { Button } from \"@/components/ui/button\";\n");
    write(root, &format!("{block}/header.test.tsx"), "");
    write(root, &format!("{block}/header.stories.tsx"), "");
    write(root, &format!("{block}/types.d.ts"), "");
    write(root, &format!("{block}/README.md"), "");

    let mut builder = RegistryBuilder::new(config_for(root, "public/r"));
    let registry = builder.build_registry().unwrap();
    builder.finish();

    let item = &registry.items[0];
    let targets: Vec<&str> = item.files.iter().map(|f| f.target.as_str()).collect();
    assert_eq!(
        targets,
        vec!["components/footer.tsx", "components/header.tsx", "components/index.tsx"]
    );
    assert_eq!(item.registry_dependencies, vec!["button", "card"]);
    assert_eq!(item.dependencies, vec!["react-dropzone"]);
    // No page files, so a directory block stays a block
    assert_eq!(item.kind, ItemKind::Block);

    let index = &item.files[2];
    assert_eq!(
        index.content.as_deref(),
        Some("import { Header } from \"@/components/header\";\nimport { useDropzone } from \"react-dropzone\";\n")
    );
}

#[test]
fn index_files_are_dropped_when_configured() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "content/blocks-metadata.json", "[]");
    write(root, "content/components/forms/form-01/index.tsx", "");
    write(root, "content/components/forms/form-01/field.tsx", "");
    write(root, "content/components/forms/form-02/index.tsx", "");

    let config = GeneratorConfig {
        skip_index_files: true,
        ..config_for(root, "public/r")
    };
    let mut builder = RegistryBuilder::new(config);
    let registry = builder.build_registry().unwrap();

    // form-02 has nothing left and is skipped
    assert_eq!(registry.items.len(), 1);
    assert_eq!(registry.items[0].name, "form-01");
    assert_eq!(registry.items[0].files.len(), 1);
}

fn read_tree(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<(PathBuf, Vec<u8>)> = fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            let bytes = fs::read(&path).unwrap();
            (PathBuf::from(path.file_name().unwrap()), bytes)
        })
        .collect();
    files.sort();
    files
}

#[test]
fn repeated_runs_write_identical_output() {
    let dir = login_tree();
    let root = dir.path();
    write(
        root,
        "content/components/stats/stats-01.tsx",
        "import { Area } from \"recharts\";\nimport { Card } from \"@/components/ui/card\";\n",
    );
    write(
        root,
        "content/components/dashboard/dash-01/app/page.tsx",
        "import { Shell } from \"../shell\";\n",
    );
    write(
        root,
        "content/components/dashboard/dash-01/shell.tsx",
        "import { cn } from \"@/lib/utils\";\nimport { motion } from \"framer-motion\";\n",
    );

    for out in ["run-a", "run-b"] {
        let mut builder = RegistryBuilder::new(config_for(root, out));
        let registry = builder.build_registry().unwrap();
        builder.write_registry(&registry).unwrap();
        builder.finish();
    }

    let a = read_tree(&root.join("run-a"));
    let b = read_tree(&root.join("run-b"));
    let names: Vec<&Path> = a.iter().map(|(p, _)| p.as_path()).collect();
    assert_eq!(
        names,
        vec![
            Path::new("dash-01.json"),
            Path::new("login-01.json"),
            Path::new("registry.json"),
            Path::new("stats-01.json"),
        ]
    );
    assert_eq!(a, b);

    let aggregate: Value = serde_json::from_slice(&a[2].1).unwrap();
    let items: Vec<&str> = aggregate["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(items, vec!["dash-01", "login-01", "stats-01"]);

    let dash: Value = serde_json::from_slice(&a[0].1).unwrap();
    assert_eq!(dash["$schema"], "https://ui.shadcn.com/schema/registry-item.json");
    assert_eq!(dash["type"], "registry:page");
    assert_eq!(dash["dependencies"], serde_json::json!(["framer-motion"]));
}

#[test]
fn written_registry_passes_file_validation() {
    let dir = login_tree();
    let config = config_for(dir.path(), "public/r");
    let output = config.output_file.clone();

    let mut builder = RegistryBuilder::new(config);
    let registry = builder.build_registry().unwrap();
    let summary = builder.write_registry(&registry).unwrap();
    builder.finish();
    assert_eq!(summary.written.len(), 1);

    let document = blocks_registry::registry::read_document(&output).unwrap();
    let validation = validator::validate_document(&document);
    assert!(validation.is_valid, "{:?}", validation.errors);
    assert_eq!(validation.summary.total_items, 1);
}

#[test]
fn malformed_metadata_entries_do_not_stop_the_run() {
    let dir = login_tree();
    write(
        dir.path(),
        "content/blocks-metadata.json",
        r#"[
            { "id": "login-01", "category": "login", "name": "Login 1" },
            { "id": "login-01", "category": "login", "name": "Duplicate" },
            { "id": "broken", "name": "No category" },
            42
        ]"#,
    );

    let mut builder = RegistryBuilder::new(config_for(dir.path(), "public/r"));
    let registry = builder.build_registry().unwrap();
    assert_eq!(registry.items.len(), 1);
    assert_eq!(registry.items[0].title, "Login 1");
}

#[test]
fn item_without_files_fails_schema_validation() {
    let dir = login_tree();
    let mut builder = RegistryBuilder::new(config_for(dir.path(), "public/r"));
    let registry = builder.build_registry().unwrap();

    let mut document = serde_json::to_value(&registry).unwrap();
    document["items"][0].as_object_mut().unwrap().remove("files");

    let validation = validator::validate_document(&document);
    assert!(!validation.is_valid);
    assert!(
        validation
            .errors
            .iter()
            .any(|e| e.contains("login-01") && e.contains("files is required"))
    );
}
