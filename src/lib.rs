//! blocks-registry: turn a tree of UI blocks into a component registry.
//!
//! The pipeline runs strictly left to right:
//!
//! 1. **Metadata**: load the declarative block catalog ([`metadata`])
//! 2. **Scanning**: discover each block's source files and their roles ([`scanner`], [`role`])
//! 3. **Rewriting**: point relative imports at stable aliases ([`rewriter`])
//! 4. **Analysis**: classify imports into registry and package dependencies ([`analyzer`], [`parser`])
//! 5. **Assembly**: build and write one registry item per block ([`builder`], [`registry`])
//! 6. **Validation**: check the result against the registry schema ([`validator`])
//!
//! # Example
//!
//! ```no_run
//! use blocks_registry::{GeneratorConfig, RegistryBuilder, validator};
//!
//! let mut builder = RegistryBuilder::new(GeneratorConfig::default());
//! let registry = builder.build_registry().unwrap();
//!
//! let result = validator::validate_registry(&registry);
//! println!("{}", validator::generate_report(&result));
//!
//! builder.write_registry(&registry).unwrap();
//! builder.finish();
//! ```

pub mod analyzer;
pub mod builder;
pub mod config;
pub mod error;
pub mod metadata;
pub mod parser;
pub mod registry;
pub mod rewriter;
pub mod role;
pub mod scanner;
pub mod validator;

// Re-export commonly used types at crate root
pub use analyzer::{DependencyExtractor, DependencySet};
pub use builder::{BlockRecord, RegistryBuilder};
pub use config::GeneratorConfig;
pub use error::{GeneratorError, Result};
pub use registry::{ItemKind, Registry, RegistryFile, RegistryItem};
pub use role::FileRole;
pub use scanner::FileRecord;
pub use validator::ValidationResult;
