//! # Astro Composer
//!
//! Content-type aware authoring for Markdown vaults that feed a static site.
//!
//! This crate ties the workspace together and ships the `astro-composer` binary:
//!
//! - `composer-core`: settings, path matching and content-type resolution
//! - `composer-parser`: frontmatter codec, templates, merging and link rewriting
//! - `composer-vault`: note storage, note operations and file watching
//!
//! ```no_run
//! use astro_composer::prelude::*;
//! use std::path::Path;
//!
//! # async fn example() -> Result<()> {
//! let vault = astro_composer::settings::expand_vault_path("~/notes")?;
//! let settings = astro_composer::settings::load_settings(Some(Path::new("composer.yaml")))?;
//! let composer = NoteComposer::new(VaultManager::new(&vault)?, settings);
//! let summary = composer.convert_all().await?;
//! println!("{} links converted", summary.links_converted);
//! # Ok(())
//! # }
//! ```

pub mod settings;

pub use composer_core::prelude::*;
pub use composer_parser::{LinkConversion, LinkRewriter, Rewrite, SkipReason};
pub use composer_vault::{
    BatchSummary, LinkReport, NoteComposer, NoteOutcome, NoteStatus, VaultManager,
};
pub use settings::{SettingsOverrides, expand_vault_path, load_settings};

pub mod prelude {
    pub use crate::settings::{load_settings, expand_vault_path};
    pub use composer_core::prelude::*;
    pub use composer_parser::LinkRewriter;
    pub use composer_vault::prelude::*;
}
