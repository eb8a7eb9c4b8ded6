//! # Composer Core
//!
//! Core data models, error types, settings and content-type resolution for the
//! Astro Composer authoring engine. This crate defines the canonical types that all
//! other crates depend on.
//!
//! ## Architecture Principles
//!
//! - **Explicit inputs**: every function takes the settings it needs as arguments
//! - **Type-Driven Design**: `PropertyValue`, `CreationMode` and `Notice` replace string flags
//! - **Zero Panic in Libraries**: failures are `Result<T, Error>`; unmatched paths are `None`
//! - **Builder Pattern for Complex Types**: `ContentTypeConfig::builder`
//!
//! ## Core Modules
//!
//! - [`models`] - Frontmatter values, template results, link targets, notices
//! - [`error`] - Error types and Result alias
//! - [`config`] - Content type records and composer settings
//! - [`path_match`] - Folder-pattern matching and specificity ranking
//! - [`resolver`] - Content-type resolution for a path
//! - [`validation`] - Settings validation report
//! - [`utils`] - Kebab-case, base paths, date formatting
//!
//! ## Usage Examples
//!
//! ### Resolving a content type
//!
//! ```
//! use composer_core::prelude::*;
//!
//! let configs = vec![
//!     ContentTypeConfig::builder("docs", "docs").build().unwrap(),
//!     ContentTypeConfig::builder("guides", "docs/*").build().unwrap(),
//! ];
//!
//! let resolver = ContentTypeResolver::new(&configs);
//! assert_eq!(resolver.resolve_id("docs/intro.md"), Some("docs"));
//! assert_eq!(resolver.resolve_id("docs/setup/install.md"), Some("guides"));
//! assert_eq!(resolver.resolve_id("notes.md"), None);
//! ```
//!
//! ### Error Handling
//!
//! ```
//! use composer_core::prelude::*;
//!
//! fn create(title: &str) -> Result<()> {
//!     if title.trim().is_empty() {
//!         return Err(Error::invalid_title("title cannot be empty"));
//!     }
//!     Ok(())
//! }
//! assert!(create("").is_err());
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod path_match;
pub mod resolver;
pub mod utils;
pub mod validation;

pub use config::*;
pub use error::{Error, Result};
pub use models::*;
pub use resolver::{ContentTypeResolver, Resolution, resolve};
pub use validation::{Severity, ValidationIssue, ValidationReport, ValidationSummary, validate_settings};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ComposerSettings, ContentTypeConfig, CreationMode};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        LinkTarget, Notice, ParsedFrontmatter, Properties, PropertyValue, TemplateContext,
        TemplateRenderResult,
    };
    pub use crate::resolver::{ContentTypeResolver, Resolution};
    pub use crate::utils::kebab_case;
    pub use crate::validation::{Severity, ValidationReport, validate_settings};
}
