//! Disk-backed note store rooted at a vault directory

use crate::store::{NoteStore, is_markdown_path};
use async_trait::async_trait;
use composer_core::path_match::normalize_path;
use composer_core::prelude::*;
use std::path::{Component, Path, PathBuf};
use tracing::instrument;
use walkdir::WalkDir;

/// Vault on the local file system
#[derive(Debug, Clone)]
pub struct VaultManager {
    vault_path: PathBuf,
}

impl VaultManager {
    /// Create a manager for an existing vault directory
    pub fn new(vault_path: impl Into<PathBuf>) -> Result<Self> {
        let vault_path = vault_path.into();
        if !vault_path.is_dir() {
            return Err(Error::invalid_path(format!(
                "Vault directory does not exist: {}",
                vault_path.display()
            )));
        }
        Ok(Self { vault_path })
    }

    /// Get vault path
    pub fn vault_path(&self) -> &Path {
        &self.vault_path
    }

    /// Vault-relative `/`-separated form of an absolute path inside the vault
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = match path.strip_prefix(&self.vault_path) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                // Watchers may report canonical paths (/private/var vs /var)
                let canonical_vault = self.vault_path.canonicalize().ok()?;
                match path.strip_prefix(&canonical_vault) {
                    Ok(relative) => relative.to_path_buf(),
                    Err(_) => path
                        .canonicalize()
                        .ok()?
                        .strip_prefix(&canonical_vault)
                        .ok()?
                        .to_path_buf(),
                }
            }
        };
        let relative = normalize_path(&relative.to_string_lossy());
        (!relative.is_empty()).then_some(relative)
    }

    /// Resolve a vault-relative path to a location on disk.
    ///
    /// Absolute paths and `..` components are rejected so nothing outside the
    /// vault can be touched.
    fn resolve_path(&self, path: &str) -> Result<PathBuf> {
        if path.starts_with('/') || Path::new(path).is_absolute() {
            return Err(Error::path_traversal(PathBuf::from(path)));
        }
        let normalized = normalize_path(path);
        if normalized.is_empty() {
            return Err(Error::invalid_path("Empty note path"));
        }

        let relative = Path::new(&normalized);
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::path_traversal(relative.to_path_buf()));
                }
                Component::CurDir => {}
            }
        }

        Ok(self.vault_path.join(relative))
    }

    /// Temp file next to the target, hidden from the watcher's markdown filter
    fn temp_path(target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!(".{}.tmp", name))
    }
}

#[async_trait]
impl NoteStore for VaultManager {
    #[instrument(skip(self), name = "vault_read_file")]
    async fn read(&self, path: &str) -> Result<String> {
        let full_path = self.resolve_path(path)?;
        match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::file_not_found(full_path))
            }
            Err(e) => Err(Error::io(e)),
        }
    }

    /// Write file to disk atomically
    #[instrument(skip(self, content), fields(size = content.len()), name = "vault_write_file")]
    async fn write(&self, path: &str, content: &str) -> Result<()> {
        let full_path = self.resolve_path(path)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(Error::io)?;
        }

        let temp_path = Self::temp_path(&full_path);
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(Error::io)?;

        if let Err(e) = tokio::fs::rename(&temp_path, &full_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::io(e));
        }

        log::debug!("Wrote {} ({} bytes)", path, content.len());
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.resolve_path(path)?;
        tokio::fs::try_exists(&full_path).await.map_err(Error::io)
    }

    #[instrument(skip(self), name = "vault_rename")]
    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let source = self.resolve_path(from)?;
        let target = self.resolve_path(to)?;

        if tokio::fs::try_exists(&target).await.map_err(Error::io)? {
            return Err(Error::path_conflict(normalize_path(to)));
        }
        if !tokio::fs::try_exists(&source).await.map_err(Error::io)? {
            return Err(Error::file_not_found(source));
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(Error::io)?;
        }

        tokio::fs::rename(&source, &target)
            .await
            .map_err(Error::io)?;
        log::info!("Renamed {} -> {}", from, to);
        Ok(())
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        let full_path = self.resolve_path(path)?;
        tokio::fs::create_dir_all(&full_path)
            .await
            .map_err(Error::io)
    }

    /// Scan for markdown files, skipping hidden folders such as `.obsidian`
    #[instrument(skip(self), name = "vault_scan")]
    async fn list_markdown(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.vault_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| name.starts_with('.'))
            });

        for entry in walker {
            let entry = entry.map_err(|e| Error::io(std::io::Error::other(e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.vault_path) {
                let relative = normalize_path(&relative.to_string_lossy());
                if is_markdown_path(&relative) {
                    files.push(relative);
                }
            }
        }

        files.sort();
        log::debug!("Found {} markdown notes", files.len());
        Ok(files)
    }
}
