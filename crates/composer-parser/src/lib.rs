//! # Composer Parser
//!
//! Text processing for Astro Composer notes, built on `pulldown-cmark` and a small
//! line-oriented frontmatter grammar.
//!
//! This crate provides:
//! - A frontmatter codec for a YAML subset (scalars, block lists, inline lists)
//! - Template rendering with `{{title}}`, `{{date}}` and `{{slug}}` placeholders
//! - Property merging that never overwrites what the user wrote
//! - **Code block awareness**: links inside code or frontmatter are never rewritten
//! - Link rewriting from vault paths to site URLs
//!
//! Every function here is pure: no I/O, no ambient settings, no failure on
//! malformed input.
//!
//! ## Quick Start
//!
//! ```
//! use composer_parser::{decode, merge, render};
//! use composer_core::{PropertyValue, TemplateContext};
//!
//! let note = "---\ntitle: Mine\ntags: [a]\n---\nBody\n";
//! let template = "---\ntitle: \"{{title}}\"\ntags: [a, b]\n---\n";
//!
//! let existing = decode(note);
//! let rendered = render(template, &TemplateContext::new("Ignored", "2024-05-01"));
//! let merged = merge(&existing.properties, &rendered);
//!
//! assert_eq!(merged.properties["title"], PropertyValue::scalar("Mine"));
//! assert_eq!(merged.properties["tags"], PropertyValue::list(["a", "b"]));
//! ```
//!
//! ### Rewriting links
//!
//! ```
//! use composer_core::ContentTypeConfig;
//! use composer_parser::LinkRewriter;
//!
//! let configs = vec![
//!     ContentTypeConfig::builder("projects", "projects")
//!         .folder_mode("index")
//!         .link_base_path("/work/")
//!         .build()
//!         .unwrap(),
//! ];
//! let rewriter = LinkRewriter::new(&configs, false);
//!
//! let result = rewriter.convert_document("See [[projects/my-app/index|the app]].", "notes.md");
//! assert_eq!(result.content, "See [the app](/work/my-app/).");
//! assert_eq!(result.converted, 1);
//! ```

pub mod frontmatter;
pub mod headings;
pub mod links;
pub mod merge;
pub mod rewrite;
pub mod template;

pub use frontmatter::{compose, decode, encode, needs_quoting, quote_scalar};
pub use headings::{Heading, find_heading, parse_headings};
pub use links::{Reference, ReferenceKind, scan_references};
pub use merge::{MergeResult, merge};
pub use rewrite::{LinkConversion, LinkRewriter, Rewrite, SkipReason};
pub use template::{has_title_placeholder, render, render_block, render_document, title_keys};
