//! Schema validation of a registry document.
//!
//! Works on untyped JSON so it can judge any file on disk, not just one this
//! crate produced. Nothing is repaired; problems are reported as errors
//! (the document breaks the schema) or warnings (legal but suspicious).

use crate::metadata::json_type;
use crate::registry::{ItemKind, Registry};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

const OPTIONAL_STRINGS: &[&str] = &["description", "title", "author", "docs", "extends"];
const OPTIONAL_STRING_ARRAYS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "registryDependencies",
    "categories",
];
const OPTIONAL_OBJECTS: &[&str] = &["tailwind", "cssVars", "css", "envVars", "meta"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total_items: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub summary: ValidationSummary,
}

#[derive(Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Validates a typed registry by checking its serialized form.
pub fn validate_registry(registry: &Registry) -> ValidationResult {
    match serde_json::to_value(registry) {
        Ok(value) => validate_document(&value),
        Err(e) => {
            let errors = vec![format!("Registry could not be serialized: {}", e)];
            ValidationResult {
                is_valid: false,
                summary: ValidationSummary {
                    total_items: registry.items.len(),
                    error_count: 1,
                    warning_count: 0,
                },
                errors,
                warnings: Vec::new(),
            }
        }
    }
}

/// Validates an arbitrary registry document.
pub fn validate_document(document: &Value) -> ValidationResult {
    let mut findings = Findings::default();

    let Some(registry) = document.as_object() else {
        findings.errors.push(format!(
            "Registry must be a JSON object, got {}",
            json_type(document)
        ));
        return finish(findings, 0);
    };

    check_registry_properties(registry, &mut findings);

    let items = registry.get("items").and_then(Value::as_array);
    if let Some(items) = items {
        let mut names = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            check_item(item, index, &mut findings);

            let name = item.get("name").and_then(Value::as_str).filter(|n| !n.is_empty());
            if let Some(name) = name {
                if !names.insert(name) {
                    findings.errors.push(format!(
                        "Item at index {}: duplicate item name \"{}\"",
                        index, name
                    ));
                }
            }
        }
    }

    finish(findings, items.map_or(0, Vec::len))
}

fn finish(findings: Findings, total_items: usize) -> ValidationResult {
    ValidationResult {
        is_valid: findings.errors.is_empty(),
        summary: ValidationSummary {
            total_items,
            error_count: findings.errors.len(),
            warning_count: findings.warnings.len(),
        },
        errors: findings.errors,
        warnings: findings.warnings,
    }
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn check_registry_properties(registry: &Map<String, Value>, findings: &mut Findings) {
    let schema = non_empty_str(registry, "$schema");
    if schema.is_none() {
        findings
            .errors
            .push("Registry must have a valid $schema property".to_string());
    }
    if non_empty_str(registry, "name").is_none() {
        findings
            .errors
            .push("Registry must have a valid name property".to_string());
    }
    let homepage = non_empty_str(registry, "homepage");
    if homepage.is_none() {
        findings
            .errors
            .push("Registry must have a valid homepage property".to_string());
    }
    if !registry.get("items").is_some_and(Value::is_array) {
        findings
            .errors
            .push("Registry items must be an array".to_string());
    }

    if schema.is_some_and(|s| !s.contains("registry.json")) {
        findings
            .warnings
            .push("Registry $schema should point to the shadcn registry schema".to_string());
    }
    if homepage.is_some_and(|h| !is_http_url(h)) {
        findings
            .warnings
            .push("Registry homepage should be a valid URL".to_string());
    }
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    rest.is_some_and(|r| {
        let host = r.split(['/', '?', '#']).next().unwrap_or("");
        !host.is_empty() && !host.contains(char::is_whitespace)
    })
}

fn check_item(item: &Value, index: usize, findings: &mut Findings) {
    let Some(object) = item.as_object() else {
        findings.errors.push(format!(
            "Item at index {}: must be an object, got {}",
            index,
            json_type(item)
        ));
        return;
    };

    let context = match non_empty_str(object, "name") {
        Some(name) => format!("Item \"{}\"", name),
        None => {
            findings.errors.push(format!(
                "Item at index {}: name is required and must be a string",
                index
            ));
            format!("Item at index {}", index)
        }
    };

    match object.get("type").and_then(Value::as_str) {
        None => findings
            .errors
            .push(format!("{}: type is required and must be a string", context)),
        Some(kind) if ItemKind::parse(kind).is_none() => findings.errors.push(format!(
            "{}: invalid type \"{}\". Must be one of: {}",
            context,
            kind,
            valid_kinds()
        )),
        Some(_) => {}
    }

    match object.get("files") {
        None => findings
            .errors
            .push(format!("{}: files is required and must be an array", context)),
        Some(Value::Array(files)) if files.is_empty() => findings
            .errors
            .push(format!("{}: files array cannot be empty", context)),
        Some(Value::Array(files)) => {
            for (file_index, file) in files.iter().enumerate() {
                check_file(file, file_index, &context, findings);
            }
        }
        Some(_) => findings
            .errors
            .push(format!("{}: files must be an array", context)),
    }

    check_optional_properties(object, &context, findings);
    check_dependencies(object, &context, findings);
}

fn valid_kinds() -> String {
    ItemKind::ALL
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_file(file: &Value, index: usize, item_context: &str, findings: &mut Findings) {
    let context = format!("{} file at index {}", item_context, index);

    let Some(object) = file.as_object() else {
        findings.errors.push(format!(
            "{}: must be an object, got {}",
            context,
            json_type(file)
        ));
        return;
    };

    let path = non_empty_str(object, "path");
    if path.is_none() {
        findings
            .errors
            .push(format!("{}: path is required and must be a string", context));
    }

    match object.get("type").and_then(Value::as_str) {
        None => findings
            .errors
            .push(format!("{}: type is required and must be a string", context)),
        Some(kind) => match ItemKind::parse(kind) {
            None => findings
                .errors
                .push(format!("{}: invalid type \"{}\"", context, kind)),
            Some(kind) if kind.requires_target() && non_empty_str(object, "target").is_none() => {
                findings.errors.push(format!(
                    "{}: target is required for type \"{}\"",
                    context, kind
                ))
            }
            Some(_) => {}
        },
    }

    if let Some(path) = path {
        if path.contains('\\') {
            findings.warnings.push(format!(
                "{}: path should use forward slashes, not backslashes",
                context
            ));
        }
        if path.starts_with('/') {
            findings.warnings.push(format!(
                "{}: path should not start with a forward slash",
                context
            ));
        }
    }

    if object.get("content").is_some_and(|c| !c.is_string()) {
        findings.errors.push(format!(
            "{}: content must be a string when provided",
            context
        ));
    }
}

fn check_optional_properties(object: &Map<String, Value>, context: &str, findings: &mut Findings) {
    for &key in OPTIONAL_STRINGS {
        if object.get(key).is_some_and(|v| !v.is_string()) {
            findings
                .errors
                .push(format!("{}: {} must be a string when provided", context, key));
        }
    }

    for &key in OPTIONAL_STRING_ARRAYS {
        match object.get(key) {
            None => {}
            Some(Value::Array(values)) => {
                for (index, value) in values.iter().enumerate() {
                    if !value.is_string() {
                        findings
                            .errors
                            .push(format!("{}: {}[{}] must be a string", context, key, index));
                    }
                }
            }
            Some(_) => findings
                .errors
                .push(format!("{}: {} must be an array when provided", context, key)),
        }
    }

    for &key in OPTIONAL_OBJECTS {
        if object.get(key).is_some_and(|v| !v.is_object()) {
            findings
                .errors
                .push(format!("{}: {} must be an object when provided", context, key));
        }
    }
}

fn check_dependencies(object: &Map<String, Value>, context: &str, findings: &mut Findings) {
    let strings = |key: &str| -> Vec<String> {
        object
            .get(key)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };

    for dep in strings("dependencies") {
        if dep.starts_with("@/") {
            findings.warnings.push(format!(
                "{}: dependency \"{}\" looks like an internal import, should be external package",
                context, dep
            ));
        }
        if dep.contains("./") || dep.contains("../") {
            findings.warnings.push(format!(
                "{}: dependency \"{}\" looks like a relative import, should be external package",
                context, dep
            ));
        }
    }

    for dep in strings("registryDependencies") {
        if dep.starts_with("http://") {
            findings.warnings.push(format!(
                "{}: registry dependency \"{}\" uses HTTP instead of HTTPS",
                context, dep
            ));
        }
    }
}

/// Renders a validation result as a plain-text report.
pub fn generate_report(validation: &ValidationResult) -> String {
    let mut lines = vec![
        "Registry Validation Report".to_string(),
        "==========================".to_string(),
        String::new(),
        format!("Total Items: {}", validation.summary.total_items),
        format!("Errors: {}", validation.summary.error_count),
        format!("Warnings: {}", validation.summary.warning_count),
        format!(
            "Status: {}",
            if validation.is_valid { "VALID" } else { "INVALID" }
        ),
    ];

    if !validation.errors.is_empty() {
        lines.extend(["", "Errors:", "-------"].map(String::from));
        lines.extend(validation.errors.iter().map(|e| format!("  x {}", e)));
    }

    if !validation.warnings.is_empty() {
        lines.extend(["", "Warnings:", "---------"].map(String::from));
        lines.extend(validation.warnings.iter().map(|w| format!("  ! {}", w)));
    }

    lines.push(String::new());
    lines.push(if validation.is_valid {
        "Registry is valid and ready to use.".to_string()
    } else {
        "Registry has errors that must be fixed before use.".to_string()
    });

    lines.join("\n")
}
