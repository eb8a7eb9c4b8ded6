//! Core data models shared by the parser, the vault layer and the CLI.
//!
//! These types are designed to be:
//! - **Serializable**: All types derive Serialize/Deserialize
//! - **Ordered**: frontmatter keys keep first-seen order via `IndexMap`
//! - **Immutable once produced**: callers build new values instead of mutating parsed state

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A frontmatter value: a single-line scalar or a block/inline list of strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Scalar(String),
    List(Vec<String>),
}

impl PropertyValue {
    /// Create a scalar value
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Create a list value
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            Self::Scalar(_) => None,
        }
    }

    /// View the value as list items: a non-empty scalar counts as one item
    pub fn items(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            Self::Scalar(s) if s.trim().is_empty() => Vec::new(),
            Self::Scalar(s) => vec![s.clone()],
        }
    }
}

/// Ordered mapping of frontmatter keys to values
pub type Properties = IndexMap<String, PropertyValue>;

/// Result of decoding a document's leading frontmatter block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFrontmatter {
    /// Keys in first-seen order
    pub properties: Properties,
    /// Text between the delimiters (or the whole remainder when unclosed)
    pub raw_block_text: String,
    /// Byte offset immediately after the closing delimiter line
    pub block_end_offset: usize,
    /// Document text after the block
    pub body: String,
    /// Whether the document opened with a block delimiter
    pub has_block: bool,
    /// Opened a block but never closed it
    pub malformed: bool,
}

impl ParsedFrontmatter {
    /// A document without any frontmatter block
    pub fn without_block(text: &str) -> Self {
        Self {
            properties: Properties::new(),
            raw_block_text: String::new(),
            block_end_offset: 0,
            body: text.to_string(),
            has_block: false,
            malformed: false,
        }
    }

    /// Scalar value of a key, if present and scalar
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_scalar)
    }
}

/// Values substituted into `{{title}}`, `{{date}}` and `{{slug}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContext {
    pub title: String,
    /// Already formatted by the caller
    pub date: String,
    pub slug: String,
}

impl TemplateContext {
    /// Build a context whose slug is the kebab-case of the title
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        let title = title.into();
        let slug = crate::utils::kebab_case(&title);
        Self {
            title,
            date: date.into(),
            slug,
        }
    }
}

/// Properties a template declares once its placeholders are expanded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRenderResult {
    /// Keys in first-seen template order
    pub declared_keys: Vec<String>,
    pub values: Properties,
}

impl TemplateRenderResult {
    pub fn is_empty(&self) -> bool {
        self.declared_keys.is_empty()
    }
}

/// A single resolved internal reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    /// Path as written, URL-decoded, extension removed
    pub raw_path: String,
    /// Fragment including the leading `#`
    pub anchor: Option<String>,
    /// Id of the owning content type
    pub matched_content_type: Option<String>,
    /// Kebab-cased site path below the base path
    pub slug: String,
    pub trailing_slash: bool,
}

/// Advisory information surfaced to the host; never an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// The path belongs to no enabled content type
    NoContentType { path: String },
    /// Several content types matched at the same specificity; the first declared won
    AmbiguousContentType {
        path: String,
        chosen: String,
        candidates: Vec<String>,
    },
    /// The template has no `{{title}}` placeholder, so a title update was not attempted
    NoTitlePlaceholder { content_type: String },
    /// The document opens a frontmatter block that never closes
    MalformedFrontmatter { path: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContentType { path } => write!(f, "no content type matched: {}", path),
            Self::AmbiguousContentType {
                path,
                chosen,
                candidates,
            } => write!(
                f,
                "multiple content types matched at equal specificity: {} ({}); using {}",
                path,
                candidates.join(", "),
                chosen
            ),
            Self::NoTitlePlaceholder { content_type } => write!(
                f,
                "template has no title placeholder, rename skipped ({})",
                content_type
            ),
            Self::MalformedFrontmatter { path } => write!(
                f,
                "frontmatter block malformed, falling back to raw pass-through: {}",
                path
            ),
        }
    }
}
