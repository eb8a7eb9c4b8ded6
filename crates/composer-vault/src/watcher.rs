//! File system watcher feeding note events to the composer.
//!
//! Built on `notify`; events are forwarded over an unbounded tokio channel so the
//! consumer can await them. Filtering here is purely syntactic (markdown, not
//! hidden). Debouncing and self-write suppression happen in the consumer.

use crate::store::is_markdown_path;
use composer_core::{Error, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// File system event for a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    NoteCreated(PathBuf),
    NoteModified(PathBuf),
    NoteRemoved(PathBuf),
    /// A note moved within the vault (from, to)
    NoteRenamed(PathBuf, PathBuf),
}

impl VaultEvent {
    /// Absolute path the event concerns
    pub fn path(&self) -> &Path {
        match self {
            Self::NoteCreated(p)
            | Self::NoteModified(p)
            | Self::NoteRemoved(p)
            | Self::NoteRenamed(_, p) => p,
        }
    }

    /// Check if event is for a `.md` / `.mdx` file
    pub fn is_markdown(&self) -> bool {
        is_markdown_path(&self.path().to_string_lossy())
    }

    /// Whether any path component is hidden (`.obsidian/`, `.trash/`, dotfiles)
    pub fn is_hidden(&self) -> bool {
        self.path().components().any(|c| match c {
            Component::Normal(name) => name.to_string_lossy().starts_with('.'),
            _ => false,
        })
    }
}

/// Configuration for the file watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub recursive: bool,
    /// Only report `.md` / `.mdx` files
    pub markdown_only: bool,
    /// Ignore paths with a hidden component
    pub ignore_hidden: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            markdown_only: true,
            ignore_hidden: true,
        }
    }
}

/// Watches a vault directory for note changes
pub struct VaultWatcher {
    config: WatcherConfig,
    watch_path: PathBuf,
    watcher: Option<RecommendedWatcher>,
    event_tx: UnboundedSender<VaultEvent>,
}

impl VaultWatcher {
    /// Create a watcher and the receiver its events arrive on
    pub fn new(
        path: impl Into<PathBuf>,
        config: WatcherConfig,
    ) -> (Self, UnboundedReceiver<VaultEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            config,
            watch_path: path.into(),
            watcher: None,
            event_tx,
        };
        (watcher, event_rx)
    }

    /// Start watching the vault directory
    pub fn start(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Err(Error::other("Watcher already started"));
        }

        let event_tx = self.event_tx.clone();
        let config = self.config.clone();

        let mut notify_watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for vault_event in convert_event(event) {
                        if should_emit(&vault_event, &config) {
                            // Receiver may be gone during shutdown
                            let _ = event_tx.send(vault_event);
                        }
                    }
                }
                Err(e) => log::warn!("Watch error: {}", e),
            },
            Config::default(),
        )
        .map_err(|e| Error::io(std::io::Error::other(e)))?;

        let mode = if self.config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        notify_watcher
            .watch(&self.watch_path, mode)
            .map_err(|e| Error::io(std::io::Error::other(e)))?;

        log::info!("Watching {}", self.watch_path.display());
        self.watcher = Some(notify_watcher);
        Ok(())
    }

    /// Stop watching (dropping the notify watcher ends its thread)
    pub fn stop(&mut self) {
        if self.watcher.take().is_some() {
            log::info!("Stopped watching {}", self.watch_path.display());
        }
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }
}

fn convert_event(event: Event) -> Vec<VaultEvent> {
    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            let mut paths = event.paths.into_iter();
            return match (paths.next(), paths.next()) {
                (Some(from), Some(to)) => vec![VaultEvent::NoteRenamed(from, to)],
                _ => Vec::new(),
            };
        }
        // Halves of a pair; the paired `Both` event carries both paths
        EventKind::Modify(ModifyKind::Name(RenameMode::From | RenameMode::To)) => {
            return Vec::new();
        }
        _ => {}
    }

    let make: fn(PathBuf) -> VaultEvent = match event.kind {
        EventKind::Create(_) => VaultEvent::NoteCreated,
        EventKind::Modify(_) | EventKind::Any => VaultEvent::NoteModified,
        EventKind::Remove(_) => VaultEvent::NoteRemoved,
        _ => return Vec::new(),
    };
    event.paths.into_iter().map(make).collect()
}

fn should_emit(event: &VaultEvent, config: &WatcherConfig) -> bool {
    if config.ignore_hidden && event.is_hidden() {
        return false;
    }
    !config.markdown_only || event.is_markdown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;
    use tokio::time::{Duration, sleep};

    #[test]
    fn test_convert_event_kinds() {
        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/v/a.md"));
        assert_eq!(
            convert_event(created),
            vec![VaultEvent::NoteCreated(PathBuf::from("/v/a.md"))]
        );

        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/v/b.md"));
        assert_eq!(
            convert_event(removed),
            vec![VaultEvent::NoteRemoved(PathBuf::from("/v/b.md"))]
        );

        let renamed = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/v/Untitled.md"))
            .add_path(PathBuf::from("/v/hello.md"));
        assert_eq!(
            convert_event(renamed),
            vec![VaultEvent::NoteRenamed(
                PathBuf::from("/v/Untitled.md"),
                PathBuf::from("/v/hello.md")
            )]
        );

        let half = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To)))
            .add_path(PathBuf::from("/v/hello.md"));
        assert!(convert_event(half).is_empty());

        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/v/c.md"));
        assert!(convert_event(access).is_empty());
    }

    #[test]
    fn test_filtering() {
        let config = WatcherConfig::default();
        assert!(should_emit(
            &VaultEvent::NoteCreated(PathBuf::from("/v/posts/a.md")),
            &config
        ));
        assert!(!should_emit(
            &VaultEvent::NoteCreated(PathBuf::from("/v/.obsidian/a.md")),
            &config
        ));
        assert!(!should_emit(
            &VaultEvent::NoteCreated(PathBuf::from("/v/posts/.a.md.tmp")),
            &config
        ));
        assert!(!should_emit(
            &VaultEvent::NoteCreated(PathBuf::from("/v/image.png")),
            &config
        ));
    }

    #[test]
    fn test_start_stop() {
        let temp_dir = TempDir::new().unwrap();
        let (mut watcher, _rx) = VaultWatcher::new(temp_dir.path(), WatcherConfig::default());

        assert!(!watcher.is_running());
        watcher.start().unwrap();
        assert!(watcher.is_running());
        assert!(watcher.start().is_err());
        watcher.stop();
        assert!(!watcher.is_running());
    }

    #[tokio::test]
    async fn test_note_created_event() {
        let temp_dir = TempDir::new().unwrap();
        let (mut watcher, mut rx) = VaultWatcher::new(temp_dir.path(), WatcherConfig::default());
        watcher.start().unwrap();
        sleep(Duration::from_millis(200)).await;

        let file_path = temp_dir.path().join("new.md");
        fs::write(&file_path, "").unwrap();
        sleep(Duration::from_millis(500)).await;

        let expected = file_path.canonicalize().ok();
        let mut found = false;
        while let Ok(event) = rx.try_recv() {
            // Canonicalize for macOS /var vs /private/var
            if matches!(event, VaultEvent::NoteCreated(_))
                && event.path().canonicalize().ok() == expected
            {
                found = true;
                break;
            }
        }
        assert!(found, "Did not receive NoteCreated event");
        watcher.stop();
    }
}
