//! Note operations: the host-side glue between a [`NoteStore`] and the pure engine.
//!
//! Every operation resolves the note's content type first. Notes no enabled type
//! claims come back as [`NoteStatus::NotManaged`]. Only precondition violations
//! (empty titles, name collisions) and storage failures are errors.

use crate::recent::{Debouncer, RecentPaths};
use crate::store::{NoteStore, is_markdown_path};
use crate::watcher::VaultEvent;
use chrono::NaiveDateTime;
use composer_core::prelude::*;
use composer_core::utils::{file_name, file_stem, format_date, join_path, parent_dir};
use composer_parser::frontmatter::{needs_quoting, unquote};
use composer_parser::{
    LinkRewriter, compose, decode, find_heading, merge, parse_headings, quote_scalar, render,
    render_block, render_document, title_keys,
};
use std::fmt;
use std::time::Duration;
use tracing::instrument;

/// What an operation did to a note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteStatus {
    Written,
    Unchanged,
    /// No enabled content type owns the path
    NotManaged,
    /// Left alone; the outcome's notices say why
    Skipped,
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Written => "written",
            Self::Unchanged => "unchanged",
            Self::NotManaged => "not managed",
            Self::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// Result of a single-note operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteOutcome {
    /// Path of the note after the operation
    pub path: String,
    pub status: NoteStatus,
    pub content_type: Option<String>,
    pub notices: Vec<Notice>,
}

impl NoteOutcome {
    fn new(path: impl Into<String>, status: NoteStatus) -> Self {
        Self {
            path: path.into(),
            status,
            content_type: None,
            notices: Vec::new(),
        }
    }

    fn with_type(mut self, id: &str) -> Self {
        self.content_type = Some(id.to_string());
        self
    }

    fn with_notices(mut self, notices: impl IntoIterator<Item = Notice>) -> Self {
        self.notices.extend(notices);
        self
    }

    pub fn is_written(&self) -> bool {
        self.status == NoteStatus::Written
    }
}

/// Counts from converting the links of one note
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub path: String,
    pub converted: usize,
    pub skipped: usize,
    pub written: bool,
}

/// A note a batch operation could not process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub path: String,
    pub error: String,
}

/// Aggregate result of a vault-wide operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub visited: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    /// Links rewritten across all notes (link conversion only)
    pub links_converted: usize,
    pub notices: Vec<Notice>,
    pub failures: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: NoteOutcome) {
        match outcome.status {
            NoteStatus::Written => self.changed += 1,
            NoteStatus::Unchanged => self.unchanged += 1,
            NoteStatus::NotManaged | NoteStatus::Skipped => self.skipped += 1,
        }
        self.notices.extend(outcome.notices);
    }

    fn fail(&mut self, path: &str, error: Error) {
        log::warn!("Failed to process {}: {}", path, error);
        self.failures.push(BatchFailure {
            path: path.to_string(),
            error: error.to_string(),
        });
    }
}

/// Applies content-type templates and link conversion to notes in a store
pub struct NoteComposer<S: NoteStore> {
    store: S,
    settings: ComposerSettings,
    recent: RecentPaths,
    debouncer: Debouncer,
}

impl<S: NoteStore> NoteComposer<S> {
    pub fn new(store: S, settings: ComposerSettings) -> Self {
        let recent = RecentPaths::new(Duration::from_secs(settings.self_write_ttl_secs));
        let debouncer = Debouncer::new(Duration::from_millis(settings.debounce_ms));
        Self {
            store,
            settings,
            recent,
            debouncer,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Paths this composer wrote and has not yet seen come back as events
    pub fn recent_writes(&self) -> &RecentPaths {
        &self.recent
    }

    fn resolver(&self) -> ContentTypeResolver<'_> {
        ContentTypeResolver::new(&self.settings.content_types)
    }

    fn date(&self, now: &NaiveDateTime) -> String {
        format_date(self.settings.effective_date_format(), now)
    }

    async fn write_note(&self, path: &str, content: &str) -> Result<()> {
        self.store.write(path, content).await?;
        self.recent.remember(path);
        Ok(())
    }

    /// Give a freshly created note its title-derived name and template.
    ///
    /// File mode moves the note to `<dir>/<slug>.<ext>`, folder mode to
    /// `<dir>/<slug>/<index>.<ext>`. An existing target is never overwritten.
    #[instrument(skip(self), name = "composer_process_new_file")]
    pub async fn process_new_file(
        &self,
        path: &str,
        title: &str,
        now: NaiveDateTime,
    ) -> Result<NoteOutcome> {
        let resolution = self.resolver().resolve(path);
        let notices: Vec<Notice> = resolution.notice(path).into_iter().collect();
        let Some(content_type) = resolution.content_type else {
            log::debug!("{} is not managed by any content type", path);
            return Ok(NoteOutcome::new(path, NoteStatus::NotManaged).with_notices(notices));
        };

        let title = title.trim();
        let name = entry_name(content_type, title)?;
        let dir = parent_dir(path);
        let (target, entry_dir) = match content_type.creation_mode {
            CreationMode::File => (
                join_path(dir, &format!("{}.{}", name, content_type.extension())),
                None,
            ),
            CreationMode::Folder => {
                let folder = join_path(dir, &name);
                let index = format!(
                    "{}.{}",
                    content_type.index_file_stem(),
                    content_type.extension()
                );
                (join_path(&folder, &index), Some(folder))
            }
        };

        if target != path {
            let occupied = entry_dir.as_deref().unwrap_or(target.as_str());
            if self.store.exists(occupied).await? {
                return Err(Error::path_conflict(occupied));
            }
        }

        let existing = if self.store.exists(path).await? {
            self.store.read(path).await?
        } else {
            String::new()
        };

        let parsed = decode(&existing);
        if parsed.malformed {
            log::warn!("Skipping {}: frontmatter block never closes", path);
            return Ok(NoteOutcome::new(path, NoteStatus::Skipped)
                .with_type(&content_type.id)
                .with_notices(notices)
                .with_notices([Notice::MalformedFrontmatter {
                    path: path.to_string(),
                }]));
        }

        let ctx = TemplateContext::new(title, self.date(&now));
        let template = &content_type.template;
        let content = if existing.trim().is_empty() {
            render_document(template, &ctx)
        } else if parsed.has_block {
            let merged = merge(&parsed.properties, &render(template, &ctx));
            compose(&merged.properties, &parsed.body)
        } else {
            format!("{}{}", render_block(template, &ctx), existing)
        };

        if target != path {
            if let Some(folder) = &entry_dir {
                self.store.create_dir(folder).await?;
            }
            if !existing.is_empty() || self.store.exists(path).await? {
                self.store.rename(path, &target).await?;
            }
        }
        self.write_note(&target, &content).await?;

        log::info!(
            "Created {} note {} from {}",
            content_type.display_name(),
            target,
            path
        );
        Ok(NoteOutcome::new(target, NoteStatus::Written)
            .with_type(&content_type.id)
            .with_notices(notices))
    }

    /// Bring a note's frontmatter in line with its content type's template.
    ///
    /// Existing values are kept; only missing keys and list items are added.
    #[instrument(skip(self), name = "composer_standardize")]
    pub async fn standardize(&self, path: &str, now: NaiveDateTime) -> Result<NoteOutcome> {
        let resolution = self.resolver().resolve(path);
        let notices: Vec<Notice> = resolution.notice(path).into_iter().collect();
        let Some(content_type) = resolution.content_type else {
            return Ok(NoteOutcome::new(path, NoteStatus::NotManaged).with_notices(notices));
        };

        let content = self.store.read(path).await?;
        let parsed = decode(&content);
        let outcome = |status| {
            NoteOutcome::new(path, status)
                .with_type(&content_type.id)
                .with_notices(notices.clone())
        };

        if parsed.malformed {
            log::warn!("Not standardizing {}: frontmatter block never closes", path);
            return Ok(outcome(NoteStatus::Skipped).with_notices([
                Notice::MalformedFrontmatter {
                    path: path.to_string(),
                },
            ]));
        }

        let title = parsed
            .scalar("title")
            .map(unquote)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_path(path, content_type));
        let rendered = render(&content_type.template, &TemplateContext::new(title, self.date(&now)));
        if rendered.is_empty() && !parsed.has_block {
            return Ok(outcome(NoteStatus::Unchanged));
        }

        let merged = merge(&parsed.properties, &rendered);
        if parsed.has_block && !merged.differs_from(&parsed.properties) {
            log::debug!("{} already matches its template", path);
            return Ok(outcome(NoteStatus::Unchanged));
        }

        self.write_note(path, &compose(&merged.properties, &parsed.body))
            .await?;
        log::info!("Standardized {}", path);
        Ok(outcome(NoteStatus::Written))
    }

    /// Rename a note (or its entry folder in folder mode) and update its title.
    ///
    /// Templates without a `{{title}}` placeholder are skipped instead of guessing
    /// which key holds the title.
    #[instrument(skip(self), name = "composer_rename_note")]
    pub async fn rename_note(&self, path: &str, new_title: &str) -> Result<NoteOutcome> {
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return Err(Error::invalid_title("Title cannot be empty"));
        }

        let resolution = self.resolver().resolve(path);
        let notices: Vec<Notice> = resolution.notice(path).into_iter().collect();
        let Some(content_type) = resolution.content_type else {
            return Ok(NoteOutcome::new(path, NoteStatus::NotManaged).with_notices(notices));
        };

        let keys = title_keys(&content_type.template);
        if keys.is_empty() {
            log::info!(
                "Template of {} has no title placeholder; not renaming {}",
                content_type.display_name(),
                path
            );
            return Ok(NoteOutcome::new(path, NoteStatus::Skipped)
                .with_type(&content_type.id)
                .with_notices(notices)
                .with_notices([Notice::NoTitlePlaceholder {
                    content_type: content_type.display_name().to_string(),
                }]));
        }

        let content = self.store.read(path).await?;
        let parsed = decode(&content);
        if parsed.malformed {
            return Ok(NoteOutcome::new(path, NoteStatus::Skipped)
                .with_type(&content_type.id)
                .with_notices(notices)
                .with_notices([Notice::MalformedFrontmatter {
                    path: path.to_string(),
                }]));
        }

        let name = entry_name(content_type, new_title)?;
        let new_path = if is_index_note(path, content_type) {
            let entry = parent_dir(path);
            let new_entry = join_path(parent_dir(entry), &name);
            if new_entry != entry {
                self.store.rename(entry, &new_entry).await?;
            }
            join_path(&new_entry, file_name(path))
        } else {
            let extension = file_name(path)
                .rsplit_once('.')
                .map(|(_, ext)| ext)
                .unwrap_or(content_type.extension());
            let renamed = join_path(parent_dir(path), &format!("{}.{}", name, extension));
            if renamed != path {
                self.store.rename(path, &renamed).await?;
            }
            renamed
        };

        let rendered = render(
            &content_type.template,
            &TemplateContext::new(new_title, String::new()),
        );
        let mut properties = parsed.properties.clone();
        for key in keys {
            if let Some(value) = rendered.values.get(&key) {
                properties.insert(key, yaml_safe(value.clone()));
            }
        }

        self.write_note(&new_path, &compose(&properties, &parsed.body))
            .await?;
        log::info!("Renamed {} -> {}", path, new_path);
        Ok(NoteOutcome::new(new_path, NoteStatus::Written)
            .with_type(&content_type.id)
            .with_notices(notices))
    }

    /// Rewrite the internal links of one note into site URLs
    #[instrument(skip(self), name = "composer_convert_links")]
    pub async fn convert_links(&self, path: &str) -> Result<LinkReport> {
        let content = self.store.read(path).await?;
        let conversion = LinkRewriter::from_settings(&self.settings).convert_document(&content, path);

        let written = conversion.changed();
        if written {
            self.write_note(path, &conversion.content).await?;
            log::info!("Converted {} links in {}", conversion.converted, path);
        }

        Ok(LinkReport {
            path: path.to_string(),
            converted: conversion.converted,
            skipped: conversion.skipped,
            written,
        })
    }

    /// Site URL of a heading in a note, matched by text or by anchor
    pub async fn heading_link(&self, path: &str, heading: &str) -> Result<Option<String>> {
        let content = self.store.read(path).await?;
        let headings = parse_headings(&content);
        let Some(found) = find_heading(&headings, heading) else {
            return Err(Error::other(format!(
                "No heading matching '{}' in {}",
                heading, path
            )));
        };
        Ok(LinkRewriter::from_settings(&self.settings).heading_url(path, &found.text))
    }

    /// Standardize every managed note in the store
    #[instrument(skip(self), name = "composer_standardize_all")]
    pub async fn standardize_all(&self, now: NaiveDateTime) -> Result<BatchSummary> {
        let resolver = self.resolver();
        let mut summary = BatchSummary::default();

        for path in self.store.list_markdown().await? {
            if resolver.resolve(&path).content_type.is_none() {
                continue;
            }
            summary.visited += 1;
            match self.standardize(&path, now).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => summary.fail(&path, e),
            }
        }

        log::info!(
            "Standardized {} of {} managed notes",
            summary.changed,
            summary.visited
        );
        Ok(summary)
    }

    /// Convert links in every note; unmanaged notes may still link to managed ones
    #[instrument(skip(self), name = "composer_convert_all")]
    pub async fn convert_all(&self) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for path in self.store.list_markdown().await? {
            summary.visited += 1;
            match self.convert_links(&path).await {
                Ok(report) => {
                    summary.links_converted += report.converted;
                    if report.written {
                        summary.changed += 1;
                    } else {
                        summary.unchanged += 1;
                    }
                }
                Err(e) => summary.fail(&path, e),
            }
        }

        log::info!(
            "Converted {} links across {} notes",
            summary.links_converted,
            summary.changed
        );
        Ok(summary)
    }

    /// React to a watcher event for the vault-relative `path`.
    ///
    /// Only creations are processed, using the file stem as the title. The
    /// composer's own writes and duplicate notifications are dropped.
    pub async fn handle_event(
        &self,
        event: &VaultEvent,
        path: &str,
        now: NaiveDateTime,
    ) -> Result<Option<NoteOutcome>> {
        self.recent.purge_expired();
        self.debouncer.purge_expired();

        if let VaultEvent::NoteRenamed(..) = event {
            if self.recent.take(path) {
                log::debug!("Ignoring self-rename to {}", path);
            }
            return Ok(None);
        }
        if !matches!(event, VaultEvent::NoteCreated(_)) || !is_markdown_path(path) {
            return Ok(None);
        }
        if !self.settings.process_new_files {
            return Ok(None);
        }
        if self.recent.take(path) {
            log::debug!("Ignoring self-write of {}", path);
            return Ok(None);
        }
        if !self.debouncer.should_fire(path) {
            return Ok(None);
        }
        if self.resolver().resolve(path).content_type.is_none() {
            return Ok(None);
        }

        let title = file_stem(path).to_string();
        self.process_new_file(path, &title, now).await.map(Some)
    }
}

/// File or folder name for a title: kebab-cased, `_`-prefixed for draft types
fn entry_name(content_type: &ContentTypeConfig, title: &str) -> Result<String> {
    if title.is_empty() {
        return Err(Error::invalid_title("Title cannot be empty"));
    }
    let slug = kebab_case(title);
    if slug.is_empty() {
        return Err(Error::invalid_title(format!(
            "'{}' has no characters usable in a file name",
            title
        )));
    }
    Ok(if content_type.underscore_prefix {
        format!("_{}", slug)
    } else {
        slug
    })
}

fn is_index_note(path: &str, content_type: &ContentTypeConfig) -> bool {
    content_type.creation_mode == CreationMode::Folder
        && !parent_dir(path).is_empty()
        && file_stem(path).eq_ignore_ascii_case(content_type.index_file_stem())
}

/// Title fallback: the file stem, or the entry folder for an index note
fn title_from_path(path: &str, content_type: &ContentTypeConfig) -> String {
    let name = if is_index_note(path, content_type) {
        file_name(parent_dir(path))
    } else {
        file_stem(path)
    };
    name.trim_start_matches('_').to_string()
}

/// Quote a plain title scalar that YAML would misread
fn yaml_safe(value: PropertyValue) -> PropertyValue {
    match value {
        PropertyValue::Scalar(s) if needs_quoting(&s) => PropertyValue::Scalar(quote_scalar(&s)),
        other => other,
    }
}
