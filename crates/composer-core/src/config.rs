//! Configuration types for content types and composer settings.
//!
//! Every field is defaulted at load time, so a settings file written by an older
//! host (or by hand) with missing fields still deserializes into a complete record.
//! Follows a builder pattern for content types with validation.

use crate::error::{Error, Result};
use crate::path_match;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Index file stem used when a folder-mode type leaves `index_file_name` empty
pub const DEFAULT_INDEX_FILE_NAME: &str = "index";

/// Primary markdown extension
pub const MARKDOWN_EXTENSION: &str = "md";

/// Secondary markdown-like extension selected by `use_alt_extension`
pub const ALT_MARKDOWN_EXTENSION: &str = "mdx";

/// Date format applied when settings leave it empty
pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";

/// Template given to content types built without an explicit one
pub const DEFAULT_TEMPLATE: &str = "---\ntitle: \"{{title}}\"\ndescription: \"\"\npubDate: {{date}}\ntags: []\n---\n";

/// How a new entry of a content type is laid out on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreationMode {
    /// `<folder>/<slug>.md`
    #[default]
    File,
    /// `<folder>/<slug>/<index>.md`
    Folder,
}

/// One authoring category: where its notes live and how they are shaped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentTypeConfig {
    /// Stable identifier, unique within a settings set
    pub id: String,
    /// Display name
    pub name: String,
    /// Folder pattern; empty means vault root, `*` segments match one folder level
    pub folder_pattern: String,
    pub enabled: bool,
    pub creation_mode: CreationMode,
    /// Index file stem for folder mode; empty falls back to [`DEFAULT_INDEX_FILE_NAME`]
    pub index_file_name: String,
    /// Restrict matching to the pattern's own depth (plus one level in folder mode)
    pub ignore_subfolders: bool,
    /// Frontmatter block plus optional body
    pub template: String,
    /// Site path prefix for rewritten links
    pub link_base_path: String,
    /// Use [`ALT_MARKDOWN_EXTENSION`] for new files
    pub use_alt_extension: bool,
    /// Prefix generated file/folder names with `_` (hidden from the site build)
    pub underscore_prefix: bool,
}

impl Default for ContentTypeConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            folder_pattern: String::new(),
            enabled: true,
            creation_mode: CreationMode::File,
            index_file_name: String::new(),
            ignore_subfolders: false,
            template: DEFAULT_TEMPLATE.to_string(),
            link_base_path: String::new(),
            use_alt_extension: false,
            underscore_prefix: false,
        }
    }
}

impl ContentTypeConfig {
    /// Create a new content type with builder
    pub fn builder(
        id: impl Into<String>,
        folder_pattern: impl Into<String>,
    ) -> ContentTypeConfigBuilder {
        ContentTypeConfigBuilder::new(id, folder_pattern)
    }

    /// Index file stem, with the fallback applied and any extension removed
    pub fn index_file_stem(&self) -> &str {
        let name = self.index_file_name.trim();
        if name.is_empty() {
            return DEFAULT_INDEX_FILE_NAME;
        }
        strip_markdown_extension(name)
    }

    /// Extension (without dot) used for files this type creates
    pub fn extension(&self) -> &'static str {
        if self.use_alt_extension {
            ALT_MARKDOWN_EXTENSION
        } else {
            MARKDOWN_EXTENSION
        }
    }

    /// Number of segments in the folder pattern
    pub fn pattern_depth(&self) -> usize {
        path_match::specificity_rank(&self.folder_pattern)
    }

    /// Name shown to users, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Remove a trailing `.md` / `.mdx` (case-insensitive) from a path or name
pub fn strip_markdown_extension(name: &str) -> &str {
    for ext in [ALT_MARKDOWN_EXTENSION, MARKDOWN_EXTENSION] {
        let suffix_len = ext.len() + 1;
        if name.len() > suffix_len {
            let split = name.len() - suffix_len;
            if name.is_char_boundary(split) {
                let (stem, suffix) = name.split_at(split);
                if suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(ext) {
                    return stem;
                }
            }
        }
    }
    name
}

/// Builder for ContentTypeConfig
pub struct ContentTypeConfigBuilder {
    config: ContentTypeConfig,
}

impl ContentTypeConfigBuilder {
    /// Create a new builder
    pub fn new(id: impl Into<String>, folder_pattern: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            config: ContentTypeConfig {
                name: id.clone(),
                id,
                folder_pattern: folder_pattern.into(),
                ..ContentTypeConfig::default()
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Switch to folder mode with the given index file name
    pub fn folder_mode(mut self, index_file_name: impl Into<String>) -> Self {
        self.config.creation_mode = CreationMode::Folder;
        self.config.index_file_name = index_file_name.into();
        self
    }

    pub fn ignore_subfolders(mut self, ignore: bool) -> Self {
        self.config.ignore_subfolders = ignore;
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.config.template = template.into();
        self
    }

    pub fn link_base_path(mut self, base: impl Into<String>) -> Self {
        self.config.link_base_path = base.into();
        self
    }

    pub fn alt_extension(mut self, alt: bool) -> Self {
        self.config.use_alt_extension = alt;
        self
    }

    pub fn underscore_prefix(mut self, prefix: bool) -> Self {
        self.config.underscore_prefix = prefix;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<ContentTypeConfig> {
        if self.config.id.trim().is_empty() {
            return Err(Error::config_error("Content type id cannot be empty"));
        }
        Ok(self.config)
    }
}

/// Complete settings handed to the engine by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComposerSettings {
    /// Content types in declaration order (order breaks specificity ties)
    pub content_types: Vec<ContentTypeConfig>,
    /// Moment-style date format (`YYYY-MM-DD`, `YYYY-MM-DD HH:mm`, ...)
    pub date_format: String,
    /// Append `/` to every rewritten link, not only elided index links
    pub add_trailing_slash: bool,
    /// Let the watcher process newly created notes
    pub process_new_files: bool,
    /// How long a path written by the engine stays suppressed, in seconds
    pub self_write_ttl_secs: u64,
    /// Window for collapsing duplicate create notifications, in milliseconds
    pub debounce_ms: u64,
    pub log_level: String,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            content_types: Vec::new(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            add_trailing_slash: false,
            process_new_files: true,
            self_write_ttl_secs: 180,
            debounce_ms: 500,
            log_level: "info".to_string(),
        }
    }
}

impl ComposerSettings {
    /// Create new settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings: ids must be present and unique
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for content_type in &self.content_types {
            if content_type.id.trim().is_empty() {
                return Err(Error::config_error(format!(
                    "Content type '{}' has an empty id",
                    content_type.name
                )));
            }
            if !seen.insert(content_type.id.as_str()) {
                return Err(Error::config_error(format!(
                    "Content type ids must be unique: '{}' appears more than once",
                    content_type.id
                )));
            }
        }
        Ok(())
    }

    /// Look up a content type by id
    pub fn content_type(&self, id: &str) -> Option<&ContentTypeConfig> {
        self.content_types.iter().find(|ct| ct.id == id)
    }

    /// Date format with the default applied
    pub fn effective_date_format(&self) -> &str {
        if self.date_format.trim().is_empty() {
            DEFAULT_DATE_FORMAT
        } else {
            &self.date_format
        }
    }

    /// Parse settings from JSON (the host's persisted format)
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| Error::config_error(format!("Invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config_error(format!("Invalid settings YAML: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::config_error(format!("Failed to serialize settings: {}", e)))
    }

    /// Load settings from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config_error(format!(
                "Failed to load settings from {}: {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Save settings as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| {
            Error::config_error(format!(
                "Failed to save settings to {}: {}",
                path.display(),
                e
            ))
        })
    }
}
