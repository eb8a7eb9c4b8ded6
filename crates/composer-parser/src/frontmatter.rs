//! Frontmatter codec: the leading `---` block of a note.
//!
//! A deliberately small YAML subset. Every value is a single-line scalar or a list
//! of single-line strings, written either as a block (`key:` followed by `- item`
//! lines) or inline (`key: [a, "b"]`). Decoding never fails; lines the grammar does
//! not recognise are kept as fallback scalars so nothing the user wrote is lost.
//!
//! The scanner is a two-state machine over lines (outside the block, inside the
//! block) with a per-line classifier, [`classify_line`].

use composer_core::{ParsedFrontmatter, Properties, PropertyValue};
use regex::Regex;
use std::sync::LazyLock;

/// Block delimiter line
pub const DELIMITER: &str = "---";

/// `key: value` with an identifier-like key
static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*):(?:\s+(.*?))?\s*$").unwrap());

/// `- item` (any indentation)
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-(?:\s+(.*?))?\s*$").unwrap());

/// What a single block line is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `key: value` (value is empty for a bare `key:`)
    KeyValue { key: &'a str, value: &'a str },
    /// `- item`
    ListItem(&'a str),
    Blank,
    /// Anything else, trimmed
    Other(&'a str),
}

/// Classify one line of a frontmatter block
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(caps) = KEY_VALUE.captures(line) {
        let key = caps.get(1).map_or("", |m| m.as_str());
        let value = caps.get(2).map_or("", |m| m.as_str());
        return LineKind::KeyValue { key, value };
    }
    if let Some(caps) = LIST_ITEM.captures(line) {
        return LineKind::ListItem(caps.get(1).map_or("", |m| m.as_str()));
    }
    LineKind::Other(line.trim())
}

/// How a `key: value` line's value is typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValueShape {
    /// Empty value or `[]`: a list, items may follow on `- ` lines
    EmptyList,
    /// `[a, "b"]`
    InlineList(Vec<String>),
    Scalar,
}

pub(crate) fn value_shape(value: &str) -> ValueShape {
    let value = value.trim();
    if value.is_empty() {
        return ValueShape::EmptyList;
    }
    if value.starts_with('[') && value.ends_with(']') {
        let items = split_inline_list(&value[1..value.len() - 1]);
        if items.is_empty() {
            return ValueShape::EmptyList;
        }
        return ValueShape::InlineList(items);
    }
    ValueShape::Scalar
}

/// Split the inside of `[...]` on commas that are not inside quotes.
///
/// Each item is trimmed and unquoted; empty items are dropped.
pub fn split_inline_list(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some('"') if c == '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            Some('\'') if c == '\'' && chars.peek() == Some(&'\'') => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
            }
            None if c == ',' => {
                push_item(&mut items, &current);
                current.clear();
            }
            None => current.push(c),
        }
    }
    push_item(&mut items, &current);
    items
}

fn push_item(items: &mut Vec<String>, raw: &str) {
    let raw = raw.trim();
    if !raw.is_empty() {
        items.push(unquote(raw));
    }
}

/// Strip one pair of matching surrounding quotes, resolving escapes inside them
pub fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 {
        if value.starts_with('"') && value.ends_with('"') {
            let inner = &value[1..value.len() - 1];
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\'
                    && let Some(next) = chars.next()
                {
                    out.push(next);
                } else {
                    out.push(c);
                }
            }
            return out;
        }
        if value.starts_with('\'') && value.ends_with('\'') {
            return value[1..value.len() - 1].replace("''", "'");
        }
    }
    value.to_string()
}

/// Double-quote a scalar for safe single-line YAML output
pub fn quote_scalar(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Whether a raw scalar would be misread by YAML if written unquoted.
///
/// Values already wrapped in matching quotes are left alone.
pub fn needs_quoting(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
    if quoted {
        return false;
    }
    has_yaml_indicator(trimmed)
}

fn has_yaml_indicator(value: &str) -> bool {
    value.contains(": ")
        || value.contains(" #")
        || value.ends_with(':')
        || value.starts_with("- ")
        || value.starts_with(|c: char| "[]{}&*!|>'\"%@`#,?".contains(c))
}

/// Write a decoded list item so that it decodes back to itself
fn encode_list_item(item: &str) -> String {
    if item.is_empty() || item.trim() != item || has_yaml_indicator(item) {
        quote_scalar(item)
    } else {
        item.to_string()
    }
}

/// Location of a document's frontmatter block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockSpan {
    /// Byte offset where the block content starts (after the opening line)
    pub content_start: usize,
    /// Byte offset where the block content ends (start of the closing line)
    pub content_end: usize,
    /// Byte offset just past the closing line
    pub end: usize,
    pub closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    OutsideBlock,
    InsideBlock,
}

/// Find the leading block, if the document opens with one
pub(crate) fn find_block(text: &str) -> Option<BlockSpan> {
    let mut state = ScanState::OutsideBlock;
    let mut offset = 0;
    let mut content_start = 0;

    for line in text.split_inclusive('\n') {
        let is_delimiter = line.trim_end() == DELIMITER;
        match state {
            ScanState::OutsideBlock => {
                if !is_delimiter {
                    return None;
                }
                state = ScanState::InsideBlock;
                content_start = offset + line.len();
            }
            ScanState::InsideBlock if is_delimiter => {
                return Some(BlockSpan {
                    content_start,
                    content_end: offset,
                    end: offset + line.len(),
                    closed: true,
                });
            }
            ScanState::InsideBlock => {}
        }
        offset += line.len();
    }

    match state {
        ScanState::OutsideBlock => None,
        ScanState::InsideBlock => Some(BlockSpan {
            content_start: content_start.min(text.len()),
            content_end: text.len(),
            end: text.len(),
            closed: false,
        }),
    }
}

/// Line-by-line property reader shared by the codec and the template engine
#[derive(Debug, Default)]
pub(crate) struct PropertyReader {
    properties: Properties,
    current_list: Option<String>,
}

impl PropertyReader {
    pub fn read_line(&mut self, line: &str) {
        match classify_line(line) {
            LineKind::Blank => {}
            LineKind::KeyValue { key, value } => {
                let parsed = match value_shape(value) {
                    ValueShape::EmptyList => PropertyValue::List(Vec::new()),
                    ValueShape::InlineList(items) => PropertyValue::List(items),
                    ValueShape::Scalar => PropertyValue::Scalar(value.trim().to_string()),
                };
                self.current_list = parsed.is_list().then(|| key.to_string());
                self.properties.insert(key.to_string(), parsed);
            }
            LineKind::ListItem(item) => match &self.current_list {
                Some(key) => {
                    // A bare `-` carries nothing; `- ""` is a real empty item
                    if let Some(PropertyValue::List(items)) = self.properties.get_mut(key)
                        && !item.is_empty()
                    {
                        items.push(unquote(item));
                    }
                }
                None => log::debug!("Dropping list item outside a list key: {}", item),
            },
            LineKind::Other(line) => {
                let (key, value) = match line.split_once(':') {
                    Some((key, value)) if !key.trim().is_empty() => (key.trim(), value.trim()),
                    _ => (line, ""),
                };
                log::debug!("Unrecognised frontmatter line kept as scalar '{}'", key);
                self.current_list = None;
                self.properties
                    .insert(key.to_string(), PropertyValue::Scalar(value.to_string()));
            }
        }
    }

    pub fn finish(self) -> Properties {
        self.properties
    }
}

/// Parse the properties of a block's inner text
pub fn parse_properties(block: &str) -> Properties {
    let mut reader = PropertyReader::default();
    for line in block.lines() {
        reader.read_line(line);
    }
    reader.finish()
}

/// Decode the leading frontmatter block of a document.
///
/// Documents without a block yield no properties and the full text as body. A
/// block that is never closed swallows the rest of the document and is flagged
/// `malformed`; callers should treat such a document as opaque.
pub fn decode(text: &str) -> ParsedFrontmatter {
    let Some(span) = find_block(text) else {
        return ParsedFrontmatter::without_block(text);
    };

    let raw_block_text = text[span.content_start..span.content_end].to_string();
    let properties = parse_properties(&raw_block_text);

    if !span.closed {
        log::warn!("Frontmatter block is never closed; treating the remainder as the block");
    }

    ParsedFrontmatter {
        properties,
        raw_block_text,
        block_end_offset: span.end,
        body: text[span.end..].to_string(),
        has_block: true,
        malformed: !span.closed,
    }
}

/// Encode properties as a complete `---` block (trailing newline included)
pub fn encode(properties: &Properties) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');

    for (key, value) in properties {
        match value {
            PropertyValue::List(items) => {
                out.push_str(key);
                out.push_str(":\n");
                for item in items {
                    out.push_str("  - ");
                    out.push_str(&encode_list_item(item));
                    out.push('\n');
                }
            }
            PropertyValue::Scalar(value) if value.is_empty() => {
                out.push_str(key);
                out.push_str(": \"\"\n");
            }
            PropertyValue::Scalar(value) => {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value);
                out.push('\n');
            }
        }
    }

    out.push_str(DELIMITER);
    out.push('\n');
    out
}

/// Encode properties and reattach a body verbatim
pub fn compose(properties: &Properties, body: &str) -> String {
    let mut out = encode(properties);
    out.push_str(body);
    out
}
