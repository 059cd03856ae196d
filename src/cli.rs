//! Command-line interface definitions.
//!
//! `generate` is the default action: running the binary with only generate
//! flags (or none at all) builds the registry.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Generate a shadcn-compatible component registry.
#[derive(Debug, Parser)]
#[command(author, version, about, args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

impl Args {
    /// The subcommand to run, defaulting to `generate`.
    pub fn into_command(self) -> Commands {
        self.command
            .unwrap_or(Commands::Generate(self.generate))
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the registry and write its JSON documents.
    Generate(GenerateArgs),

    /// Check a previously generated registry file against the schema.
    Validate {
        /// Aggregate registry JSON to check.
        registry_file: PathBuf,

        /// Print additional diagnostics to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the configuration and capabilities of the generator.
    Info,
}

#[derive(Debug, Clone, Default, ClapArgs)]
pub struct GenerateArgs {
    /// Print additional diagnostics to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Validate the registry after building it (default).
    #[arg(long, overrides_with = "no_validate")]
    pub validate: bool,

    /// Skip validation.
    #[arg(long, overrides_with = "validate")]
    pub no_validate: bool,

    /// Fail when validation reports errors.
    #[arg(long)]
    pub strict: bool,

    /// Config file (TOML or JSON) overriding paths, author and schema URLs.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn should_validate(&self) -> bool {
        !self.no_validate
    }
}
