//! Read/write capability over vault-relative, `/`-separated note paths.

use async_trait::async_trait;
use composer_core::path_match::normalize_path;
use composer_core::{Error, Result};
use dashmap::{DashMap, DashSet};

/// Storage the composer reads notes from and writes them back to
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Read a note's full text
    async fn read(&self, path: &str) -> Result<String>;

    /// Create or replace a note, creating parent folders as needed
    async fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Whether a file or folder exists at `path`
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Move a file or folder; the destination must not exist
    async fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Create a folder and its parents
    async fn create_dir(&self, path: &str) -> Result<()>;

    /// Every markdown note in the store, sorted
    async fn list_markdown(&self) -> Result<Vec<String>>;
}

/// Whether a path names a markdown note (`.md` or `.mdx`)
pub fn is_markdown_path(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            ext.eq_ignore_ascii_case(composer_core::MARKDOWN_EXTENSION)
                || ext.eq_ignore_ascii_case(composer_core::ALT_MARKDOWN_EXTENSION)
        }
        _ => false,
    }
}

/// In-memory store, used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: DashMap<String, String>,
    dirs: DashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from `(path, content)` pairs
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let store = Self::new();
        for (path, content) in files {
            store.insert(path.as_ref(), content);
        }
        store
    }

    fn insert(&self, path: &str, content: impl Into<String>) {
        let path = normalize_path(path);
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    fn add_parents(&self, path: &str) {
        let mut current = path;
        while let Some((parent, _)) = current.rsplit_once('/') {
            self.dirs.insert(parent.to_string());
            current = parent;
        }
    }

    /// Snapshot of a file's content
    pub fn get(&self, path: &str) -> Option<String> {
        self.files.get(&normalize_path(path)).map(|c| c.value().clone())
    }

    /// All file paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    fn is_dir(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<String> {
        self.get(path).ok_or_else(|| Error::file_not_found(path))
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(Error::invalid_path("Empty note path"));
        }
        self.insert(&path, content);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let path = normalize_path(path);
        Ok(self.files.contains_key(&path) || self.is_dir(&path))
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let from = normalize_path(from);
        let to = normalize_path(to);
        if self.exists(&to).await? {
            return Err(Error::path_conflict(to));
        }

        if let Some((_, content)) = self.files.remove(&from) {
            self.insert(&to, content);
            return Ok(());
        }

        if !self.is_dir(&from) {
            return Err(Error::file_not_found(from));
        }

        let prefix = format!("{}/", from);
        let moved: Vec<String> = self
            .files
            .iter()
            .filter(|e| e.key().starts_with(&prefix))
            .map(|e| e.key().clone())
            .collect();
        for old in moved {
            if let Some((_, content)) = self.files.remove(&old) {
                self.insert(&format!("{}/{}", to, &old[prefix.len()..]), content);
            }
        }

        let old_dirs: Vec<String> = self
            .dirs
            .iter()
            .filter(|d| d.as_str() == from || d.starts_with(&prefix))
            .map(|d| d.key().clone())
            .collect();
        for old in old_dirs {
            self.dirs.remove(&old);
            let renamed = format!("{}{}", to, &old[from.len()..]);
            self.add_parents(&format!("{}/_", renamed));
        }
        Ok(())
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        let path = normalize_path(path);
        if !path.is_empty() {
            self.add_parents(&format!("{}/_", path));
        }
        Ok(())
    }

    async fn list_markdown(&self) -> Result<Vec<String>> {
        Ok(self
            .paths()
            .into_iter()
            .filter(|p| is_markdown_path(p))
            .collect())
    }
}
