//! Trigger bookkeeping for the host layer.
//!
//! A single note creation can surface as several file system events, and every
//! note the composer writes comes back as an event of its own. [`Debouncer`]
//! collapses the former, [`RecentPaths`] remembers the latter so each self-write is
//! skipped once.

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// TTL-keyed set of paths the composer wrote itself
#[derive(Debug)]
pub struct RecentPaths {
    ttl: Duration,
    entries: DashMap<String, Instant>,
}

impl RecentPaths {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Record a path as just written
    pub fn remember(&self, path: &str) {
        self.entries.insert(path.to_string(), Instant::now());
    }

    /// Consume the record for `path`: true when it was written recently
    pub fn take(&self, path: &str) -> bool {
        match self.entries.remove(path) {
            Some((_, written_at)) => written_at.elapsed() < self.ttl,
            None => false,
        }
    }

    /// Whether `path` is remembered and unexpired, without consuming it
    pub fn contains(&self, path: &str) -> bool {
        self.entries
            .get(path)
            .is_some_and(|written_at| written_at.elapsed() < self.ttl)
    }

    /// Drop expired records, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, written_at| written_at.elapsed() < self.ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Suppresses repeated triggers for the same path inside a window
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_fired: DashMap<String, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: DashMap::new(),
        }
    }

    /// True for the first trigger of a path in the window, false for repeats
    pub fn should_fire(&self, path: &str) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_fired.get(path)
            && now.duration_since(*last) < self.window
        {
            log::trace!("Debounced duplicate trigger for {}", path);
            return false;
        }
        self.last_fired.insert(path.to_string(), now);
        true
    }

    /// Forget triggers older than the window
    pub fn purge_expired(&self) {
        let window = self.window;
        self.last_fired.retain(|_, last| last.elapsed() < window);
    }
}
