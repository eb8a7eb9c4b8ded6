//! Internal reference scanning.
//!
//! Two passes over the document:
//!
//! 1. A `pulldown-cmark` pass records byte ranges where link syntax must not be
//!    interpreted: code blocks, inline code, raw HTML and the frontmatter block.
//! 2. Regex passes find wikilinks, embeds and markdown links, skipping any match
//!    that starts inside an excluded range.

use crate::frontmatter::find_block;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Wikilink or embed: `[[target]]`, `[[target|alias]]`, `![[target]]`
static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\[\]\n]+)\]\]").unwrap());

/// Markdown link or image: `[text](dest "title")`, `![alt](dest)`
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\[\]\n]*)\]\(([^()\n]+)\)").unwrap());

/// Extensions treated as images and never rewritten
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "bmp", "ico", "tif", "tiff",
];

/// Syntax a reference was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `[[target]]`
    WikiLink,
    /// `![[target]]`
    Embed,
    /// `[text](dest)`
    MarkdownLink,
    /// `![alt](dest)`
    Image,
}

/// One reference found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// Byte range of the whole token
    pub range: Range<usize>,
    /// Target as written (wikilink target or markdown destination), alias removed
    pub target: String,
    /// Byte range of `target` inside the document
    pub target_range: Range<usize>,
    /// Wikilink alias or markdown link text
    pub display: Option<String>,
}

/// Byte ranges excluded from reference scanning.
#[derive(Debug, Default, Clone)]
pub(crate) struct ExcludedRanges {
    ranges: Vec<Range<usize>>,
}

impl ExcludedRanges {
    /// Check if a byte offset falls within any excluded range.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.start <= offset);
        idx > 0 && offset < self.ranges[idx - 1].end
    }

    fn add(&mut self, range: Range<usize>) {
        if !range.is_empty() {
            self.ranges.push(range);
        }
    }

    /// Sort and merge overlapping ranges.
    fn optimize(&mut self) {
        if self.ranges.is_empty() {
            return;
        }
        self.ranges.sort_by_key(|r| r.start);

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(current) if range.start <= current.end => {
                    current.end = current.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }

    /// Collect the excluded ranges of a document
    pub fn scan(content: &str) -> Self {
        let mut excluded = Self::default();

        if let Some(span) = find_block(content) {
            excluded.add(0..span.end);
        }

        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        opts.insert(Options::ENABLE_TABLES);

        let mut code_block_start: Option<usize> = None;
        for (event, range) in Parser::new_ext(content, opts).into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(_)) => code_block_start = Some(range.start),
                Event::End(TagEnd::CodeBlock) => {
                    let start = code_block_start.take().unwrap_or(range.start);
                    excluded.add(start..range.end);
                }
                Event::Code(_) | Event::Html(_) | Event::InlineHtml(_) => excluded.add(range),
                Event::Start(Tag::MetadataBlock(_)) => excluded.add(range),
                _ => {}
            }
        }

        excluded.optimize();
        excluded
    }
}

/// Whether a reference points outside the vault
pub fn is_external(target: &str) -> bool {
    let lower = target.trim().to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with("//")
}

/// Whether a path names an image file
pub fn is_image(path: &str) -> bool {
    let path = path.split(['#', '?']).next().unwrap_or(path);
    match path.rsplit_once('.') {
        Some((_, ext)) => IMAGE_EXTENSIONS
            .iter()
            .any(|candidate| ext.eq_ignore_ascii_case(candidate)),
        None => false,
    }
}

/// Split a wikilink body into target and alias
pub fn split_alias(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once('|') {
        Some((target, alias)) => (target.trim(), Some(alias.trim())),
        None => (raw.trim(), None),
    }
}

/// Locate the destination inside a markdown link's parentheses.
///
/// Handles `<dest with spaces>` and an optional `"title"`; returns the destination
/// and its byte range relative to `inner`.
fn markdown_destination(inner: &str) -> Option<(&str, Range<usize>)> {
    let leading = inner.len() - inner.trim_start().len();
    let rest = &inner[leading..];

    if let Some(stripped) = rest.strip_prefix('<') {
        let close = stripped.find('>')?;
        let start = leading + 1;
        return Some((&stripped[..close], start..start + close));
    }

    let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    if len == 0 {
        return None;
    }
    Some((&rest[..len], leading..leading + len))
}

/// Find every wikilink, embed, markdown link and image outside code and frontmatter.
///
/// References are returned in document order.
pub fn scan_references(content: &str) -> Vec<Reference> {
    if !content.contains("[[") && !content.contains("](") {
        return Vec::new();
    }

    let excluded = ExcludedRanges::scan(content);
    let mut references = Vec::new();

    for caps in WIKILINK.captures_iter(content) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if excluded.contains(whole.start()) {
            continue;
        }
        let embed = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let (target, alias) = split_alias(body.as_str());
        let target_start = body.start() + body.as_str().find(target).unwrap_or(0);

        references.push(Reference {
            kind: if embed {
                ReferenceKind::Embed
            } else {
                ReferenceKind::WikiLink
            },
            range: whole.range(),
            target: target.to_string(),
            target_range: target_start..target_start + target.len(),
            display: alias.map(str::to_string),
        });
    }

    for caps in MARKDOWN_LINK.captures_iter(content) {
        let (Some(whole), Some(text), Some(inner)) = (caps.get(0), caps.get(2), caps.get(3))
        else {
            continue;
        };
        if excluded.contains(whole.start()) {
            continue;
        }
        // `[[a]](b)` is a wikilink followed by text
        if references.iter().any(|r| r.range.contains(&whole.start())) {
            continue;
        }
        let Some((dest, local)) = markdown_destination(inner.as_str()) else {
            continue;
        };
        let image = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

        references.push(Reference {
            kind: if image {
                ReferenceKind::Image
            } else {
                ReferenceKind::MarkdownLink
            },
            range: whole.range(),
            target: dest.to_string(),
            target_range: inner.start() + local.start..inner.start() + local.end,
            display: Some(text.as_str().to_string()),
        });
    }

    references.sort_by_key(|r| r.range.start);
    references
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(content: &str) -> Vec<(ReferenceKind, String)> {
        scan_references(content)
            .into_iter()
            .map(|r| (r.kind, r.target))
            .collect()
    }

    #[test]
    fn test_scan_all_kinds_in_order() {
        let content = "See [[Note|alias]], ![[Embedded]], [text](posts/a.md) and ![img](pic.png).";
        assert_eq!(
            targets(content),
            vec![
                (ReferenceKind::WikiLink, "Note".to_string()),
                (ReferenceKind::Embed, "Embedded".to_string()),
                (ReferenceKind::MarkdownLink, "posts/a.md".to_string()),
                (ReferenceKind::Image, "pic.png".to_string()),
            ]
        );
    }

    #[test]
    fn test_alias_and_target_range() {
        let content = "x [[ Folder/Note#Intro | Shown ]] y";
        let refs = scan_references(content);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target, "Folder/Note#Intro");
        assert_eq!(refs[0].display.as_deref(), Some("Shown"));
        assert_eq!(&content[refs[0].target_range.clone()], "Folder/Note#Intro");
        assert_eq!(&content[refs[0].range.clone()], "[[ Folder/Note#Intro | Shown ]]");
    }

    #[test]
    fn test_code_is_excluded() {
        let content = r#"
Normal [[Valid Link]] here.

```rust
let link = "[[Fake Link Inside Code]]";
```

Inline `[x](y.md)` and [real](z.md)
"#;
        assert_eq!(
            targets(content),
            vec![
                (ReferenceKind::WikiLink, "Valid Link".to_string()),
                (ReferenceKind::MarkdownLink, "z.md".to_string()),
            ]
        );
    }

    #[test]
    fn test_frontmatter_is_excluded() {
        let content = "---\nrelated: \"[[Other]]\"\n---\nBody [[Note]]\n";
        assert_eq!(
            targets(content),
            vec![(ReferenceKind::WikiLink, "Note".to_string())]
        );
    }

    #[test]
    fn test_markdown_destination_forms() {
        let content = "[a](<my note.md> \"Title\") [b](plain.md \"T\")";
        let refs = scan_references(content);
        assert_eq!(refs[0].target, "my note.md");
        assert_eq!(&content[refs[0].target_range.clone()], "my note.md");
        assert_eq!(refs[1].target, "plain.md");
        assert_eq!(&content[refs[1].target_range.clone()], "plain.md");
    }

    #[test]
    fn test_excluded_ranges_merge() {
        let mut excluded = ExcludedRanges::default();
        excluded.add(10..20);
        excluded.add(0..5);
        excluded.add(15..25);
        excluded.optimize();
        assert!(excluded.contains(0));
        assert!(!excluded.contains(5));
        assert!(excluded.contains(24));
        assert!(!excluded.contains(25));
    }

    #[test]
    fn test_classifiers() {
        assert!(is_external("https://example.com/x"));
        assert!(is_external("HTTP://EXAMPLE.COM"));
        assert!(is_external("mailto:me@example.com"));
        assert!(!is_external("posts/a.md"));

        assert!(is_image("diagram.png"));
        assert!(is_image("assets/Photo.JPG"));
        assert!(is_image("icon.svg#frag"));
        assert!(!is_image("notes/a.md"));
        assert!(!is_image("README"));
    }
}
