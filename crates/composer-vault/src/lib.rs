//! # Composer Vault
//!
//! Storage, note operations and file watching for Astro Composer.
//!
//! - [`store::NoteStore`]: read/write capability over vault-relative paths, with
//!   a disk implementation ([`manager::VaultManager`]) and an in-memory one
//!   ([`store::MemoryStore`])
//! - [`operations::NoteComposer`]: new-note processing, standardization, renames
//!   and link conversion on top of any store
//! - [`watcher::VaultWatcher`]: `notify`-based create events over a tokio channel
//! - [`recent`]: self-write suppression and debouncing for watcher-driven runs
//!
//! ## Quick Start
//!
//! ```no_run
//! use composer_vault::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let settings = ComposerSettings::load(std::path::Path::new("composer.json"))?;
//! let composer = NoteComposer::new(VaultManager::new("/path/to/vault")?, settings);
//!
//! let now = chrono::Local::now().naive_local();
//! let outcome = composer
//!     .process_new_file("posts/Untitled.md", "My First Post", now)
//!     .await?;
//! println!("{} -> {}", outcome.status, outcome.path);
//! # Ok(())
//! # }
//! ```
//!
//! ## Writes
//!
//! `VaultManager` writes atomically (temp file, then rename). Renames and new-note
//! placement never overwrite: an occupied target is reported as
//! [`Error::PathConflict`](composer_core::Error::PathConflict).

pub mod manager;
pub mod operations;
pub mod recent;
pub mod store;
pub mod watcher;

pub use manager::VaultManager;
pub use operations::{
    BatchFailure, BatchSummary, LinkReport, NoteComposer, NoteOutcome, NoteStatus,
};
pub use recent::{Debouncer, RecentPaths};
pub use store::{MemoryStore, NoteStore, is_markdown_path};
pub use watcher::{VaultEvent, VaultWatcher, WatcherConfig};

pub mod prelude {
    pub use crate::manager::*;
    pub use crate::operations::*;
    pub use crate::recent::*;
    pub use crate::store::*;
    pub use crate::watcher::*;
    pub use composer_core::prelude::*;
}
