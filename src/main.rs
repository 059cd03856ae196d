//! blocks-registry: generate a shadcn-compatible registry from UI blocks.
//!
//! Scans the component tree, rewrites relative imports to aliases, extracts
//! dependencies, validates the assembled registry and writes the aggregate
//! and per-item JSON documents.

mod cli;

use anyhow::{Context, Result, bail};
use blocks_registry::{GeneratorConfig, RegistryBuilder, ValidationResult, registry, validator};
use clap::Parser;
use cli::{Args, Commands, GenerateArgs};
use colored::Colorize;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    let command = Args::parse().into_command();
    let verbose = match &command {
        Commands::Generate(args) => args.verbose,
        Commands::Validate { verbose, .. } => *verbose,
        Commands::Info => false,
    };
    init_logging(verbose);

    let result = match command {
        Commands::Generate(args) => cmd_generate(&args),
        Commands::Validate { registry_file, .. } => cmd_validate(&registry_file),
        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        if verbose {
            eprintln!("\n{:?}", e);
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_generate(args: &GenerateArgs) -> Result<()> {
    let started = Instant::now();
    let config = GeneratorConfig::load(args.config.as_deref()).context("Failed to load config")?;

    println!("{} Starting registry generation", "info:".blue().bold());
    println!("  components: {}", config.components_dir.display());
    println!("  metadata:   {}", config.metadata_file.display());
    println!("  output:     {}", config.output_file.display());
    if args.verbose {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    let mut builder = RegistryBuilder::new(config);
    let outcome = generate_with(&mut builder, args);
    let cache = builder.scanner().transformer().cache_stats();
    builder.finish();
    let (items, files) = outcome?;

    println!("\n{}", "Generation summary:".bold());
    println!("  items:    {}", items);
    println!("  files:    {}", files);
    println!("  duration: {:.2}s", started.elapsed().as_secs_f64());
    if args.verbose {
        println!(
            "  cache:    {} entries, {} hits, {} misses",
            cache.entries, cache.hits, cache.misses
        );
    }
    println!("\n{} Registry generation completed", "ok:".green().bold());

    Ok(())
}

/// Builds, validates and writes; returns item and file counts.
fn generate_with(builder: &mut RegistryBuilder, args: &GenerateArgs) -> Result<(usize, usize)> {
    let registry = builder
        .build_registry()
        .context("Registry generation failed")?;

    let local = blocks_registry::builder::validate_registry(&registry);
    for warning in &local.warnings {
        tracing::debug!("{}", warning);
    }
    for error in &local.errors {
        tracing::warn!("{}", error);
    }

    if args.should_validate() {
        println!("{} Validating registry", "info:".blue().bold());
        let validation = validator::validate_registry(&registry);

        if args.verbose || !validation.is_valid {
            println!("{}", validator::generate_report(&validation));
        }

        enforce_validation(&validation, args.strict)?;
        if validation.is_valid {
            println!("{} Registry validation passed", "ok:".green().bold());
        } else {
            println!(
                "{} Registry has validation issues but continuing",
                "warn:".yellow().bold()
            );
        }
    }

    let summary = builder
        .write_registry(&registry)
        .context("Failed to write registry")?;
    for (name, error) in &summary.failed {
        eprintln!("{} {}: {}", "warn:".yellow().bold(), name, error);
    }

    let files = registry.items.iter().map(|item| item.files.len()).sum();
    Ok((registry.items.len(), files))
}

/// Fails an invalid registry in strict mode; otherwise generation goes on.
fn enforce_validation(validation: &ValidationResult, strict: bool) -> Result<()> {
    if strict && !validation.is_valid {
        bail!(
            "Registry validation failed with {} error(s) and strict mode is enabled",
            validation.summary.error_count
        );
    }
    Ok(())
}

fn cmd_validate(registry_file: &Path) -> Result<()> {
    println!(
        "{} Validating registry at {}",
        "info:".blue().bold(),
        registry_file.display()
    );

    let document = registry::read_document(registry_file)
        .with_context(|| format!("Failed to load {}", registry_file.display()))?;
    let validation = validator::validate_document(&document);
    println!("{}", validator::generate_report(&validation));

    if !validation.is_valid {
        bail!("Registry at {} is invalid", registry_file.display());
    }
    Ok(())
}

fn cmd_info() -> Result<()> {
    let config = GeneratorConfig::default();

    println!(
        "{} v{}",
        env!("CARGO_PKG_NAME").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}\n", env!("CARGO_PKG_DESCRIPTION"));

    println!("{}", "Features:".bold());
    println!("  - tree-sitter based import and dependency extraction");
    println!("  - relative import rewriting to consumer aliases");
    println!("  - schema validation against the shadcn registry format");
    println!("  - per-run caching of rewritten sources");
    println!("  - deterministic, sorted output\n");

    println!("{}", "Configuration:".bold());
    println!("  components: {}", config.components_dir.display());
    println!("  metadata:   {}", config.metadata_file.display());
    println!("  output:     {}", config.output_file.display());
    println!("  individual: {}/", config.individual_output_dir.display());
    println!("  schema:     {}", config.schema);
    println!("  homepage:   {}", config.homepage);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn invalid() -> ValidationResult {
        ValidationResult {
            is_valid: false,
            errors: vec!["Registry must have a valid homepage property".to_string()],
            ..ValidationResult::default()
        }
    }

    #[test]
    fn strict_mode_rejects_invalid_registry() {
        let err = enforce_validation(&invalid(), true).unwrap_err();
        assert!(err.to_string().contains("strict mode"));
        assert!(enforce_validation(&invalid(), false).is_ok());

        let valid = ValidationResult {
            is_valid: true,
            ..ValidationResult::default()
        };
        assert!(enforce_validation(&valid, true).is_ok());
    }

    /// A one-block tree whose registry fails schema validation (no homepage).
    fn invalid_tree() -> (TempDir, GeneratorConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("components/login")).unwrap();
        fs::write(root.join("components/login/login-01.tsx"), "").unwrap();
        fs::write(root.join("blocks-metadata.json"), "[]").unwrap();

        let config = GeneratorConfig {
            components_dir: root.join("components"),
            metadata_file: root.join("blocks-metadata.json"),
            output_file: root.join("out/registry.json"),
            individual_output_dir: root.join("out"),
            homepage: String::new(),
            ..GeneratorConfig::default()
        };
        (dir, config)
    }

    #[test]
    fn invalid_registry_is_still_written_without_strict() {
        let (_dir, config) = invalid_tree();
        let output = config.output_file.clone();
        let mut builder = RegistryBuilder::new(config);

        let (items, files) = generate_with(&mut builder, &GenerateArgs::default()).unwrap();
        assert_eq!((items, files), (1, 1));
        assert!(output.is_file());
    }

    #[test]
    fn strict_generation_stops_before_writing() {
        let (_dir, config) = invalid_tree();
        let output = config.output_file.clone();
        let mut builder = RegistryBuilder::new(config);
        let args = GenerateArgs {
            strict: true,
            ..GenerateArgs::default()
        };

        assert!(generate_with(&mut builder, &args).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn skipping_validation_ignores_strict() {
        let (_dir, config) = invalid_tree();
        let output = config.output_file.clone();
        let mut builder = RegistryBuilder::new(config);
        let args = GenerateArgs {
            strict: true,
            no_validate: true,
            ..GenerateArgs::default()
        };

        assert!(generate_with(&mut builder, &args).is_ok());
        assert!(output.is_file());
    }

    #[test]
    fn validate_command_fails_on_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, r#"{ "name": "blocks", "items": [] }"#).unwrap();
        let err = cmd_validate(&path).unwrap_err();
        assert!(err.to_string().contains("is invalid"));
    }
}
