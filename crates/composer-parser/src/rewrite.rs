//! Internal reference rewriting into site-relative URLs.
//!
//! A reference is rewritten only when its target (or, for a bare file name, the
//! note containing it) belongs to an enabled content type. The URL is
//! `{linkBasePath}{slug}{/}{#anchor}` where the slug is the target path with the
//! content type's folder prefix removed, a folder-mode index file elided and every
//! segment kebab-cased.
//!
//! The anchor is kebab-cased too (`#Getting Started` becomes `#getting-started`),
//! matching the heading ids Astro generates rather than the heading text as written.
//! A bare file name is a sibling in the source note's content type; from an
//! unmanaged source it is resolved as a path of its own.

use crate::links::{ReferenceKind, is_external, is_image, scan_references};
use composer_core::path_match;
use composer_core::utils::{kebab_case, normalize_base_path, parent_dir};
use composer_core::{
    ComposerSettings, ContentTypeConfig, ContentTypeResolver, CreationMode, LinkTarget,
    strip_markdown_extension,
};
use percent_encoding::percent_decode_str;
use serde::Serialize;

/// Why a reference was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SkipReason {
    Empty,
    /// `http(s)://`, `mailto:` and protocol-relative URLs
    External,
    Image,
    /// `#anchor` with no path
    SameDocument,
    /// Neither the target nor the source note belongs to a content type
    Unmanaged,
}

/// Outcome of rewriting one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    Converted { url: String, target: LinkTarget },
    Skipped { original: String, reason: SkipReason },
}

impl Rewrite {
    /// Replacement text: the URL, or the reference unchanged
    pub fn text(&self) -> &str {
        match self {
            Self::Converted { url, .. } => url,
            Self::Skipped { original, .. } => original,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Converted { url, .. } => Some(url),
            Self::Skipped { .. } => None,
        }
    }
}

/// Result of converting every reference in a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkConversion {
    pub content: String,
    pub converted: usize,
    pub skipped: usize,
}

impl LinkConversion {
    pub fn changed(&self) -> bool {
        self.converted > 0
    }
}

/// Rewrites references against a fixed content-type set
#[derive(Debug, Clone)]
pub struct LinkRewriter<'a> {
    resolver: ContentTypeResolver<'a>,
    add_trailing_slash: bool,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(configs: &'a [ContentTypeConfig], add_trailing_slash: bool) -> Self {
        Self {
            resolver: ContentTypeResolver::new(configs),
            add_trailing_slash,
        }
    }

    pub fn from_settings(settings: &'a ComposerSettings) -> Self {
        Self::new(&settings.content_types, settings.add_trailing_slash)
    }

    /// Rewrite a single raw reference found in `source_path`
    pub fn rewrite_reference(&self, raw_ref: &str, source_path: &str) -> Rewrite {
        let skip = |reason| Rewrite::Skipped {
            original: raw_ref.to_string(),
            reason,
        };

        let raw = raw_ref.trim();
        if raw.is_empty() {
            return skip(SkipReason::Empty);
        }
        if is_external(raw) {
            return skip(SkipReason::External);
        }

        let (path, anchor) = match raw.split_once('#') {
            Some((path, anchor)) => (path, Some(anchor)),
            None => (raw, None),
        };
        let decoded = percent_decode_str(path).decode_utf8_lossy();
        if is_image(&decoded) {
            return skip(SkipReason::Image);
        }
        if decoded.trim().is_empty() {
            return skip(SkipReason::SameDocument);
        }

        match self.locate(&decoded, anchor, source_path) {
            Some((url, target)) => Rewrite::Converted { url, target },
            None => skip(SkipReason::Unmanaged),
        }
    }

    /// URL of a heading inside a managed note
    pub fn heading_url(&self, file_path: &str, heading: &str) -> Option<String> {
        let heading = heading.trim().trim_start_matches('#').trim();
        let anchor = (!heading.is_empty()).then_some(heading);
        self.locate(file_path, anchor, file_path).map(|(url, _)| url)
    }

    /// Rewrite every reference in a note's body.
    ///
    /// Wikilinks and note embeds become markdown links (`[alias](url)`); markdown
    /// links keep their text and title and only get a new destination. Images are
    /// never touched.
    pub fn convert_document(&self, content: &str, source_path: &str) -> LinkConversion {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        let mut converted = 0;
        let mut skipped = 0;

        for reference in scan_references(content) {
            if reference.range.start < last {
                continue;
            }

            let replacement = match reference.kind {
                ReferenceKind::Image => None,
                ReferenceKind::Embed if is_image(&reference.target) => None,
                ReferenceKind::WikiLink | ReferenceKind::Embed => self
                    .rewrite_reference(&reference.target, source_path)
                    .url()
                    .map(|url| {
                        let display = reference
                            .display
                            .clone()
                            .filter(|d| !d.is_empty())
                            .unwrap_or_else(|| wikilink_display(&reference.target));
                        (reference.range.clone(), format!("[{}]({})", display, url))
                    }),
                ReferenceKind::MarkdownLink => self
                    .rewrite_reference(&reference.target, source_path)
                    .url()
                    .map(|url| (reference.target_range.clone(), url.to_string())),
            };

            match replacement {
                Some((range, text)) => {
                    out.push_str(&content[last..range.start]);
                    out.push_str(&text);
                    last = range.end;
                    converted += 1;
                }
                None => skipped += 1,
            }
        }
        out.push_str(&content[last..]);

        log::debug!(
            "Converted {} references in {} ({} skipped)",
            converted,
            source_path,
            skipped
        );

        LinkConversion {
            content: out,
            converted,
            skipped,
        }
    }

    /// Resolve a decoded path to its URL and target description
    fn locate(
        &self,
        path: &str,
        anchor: Option<&str>,
        source_path: &str,
    ) -> Option<(String, LinkTarget)> {
        let raw_path = strip_markdown_extension(path.trim()).to_string();
        let normalized = resolve_relative(&raw_path, source_path);
        let bare = !normalized.contains('/');

        // A bare name is a sibling in the source note's type; when the source is
        // unmanaged the name itself may still resolve (a root-pattern type).
        let (content_type, sibling) = match bare
            .then(|| self.resolver.resolve(source_path).content_type)
            .flatten()
        {
            Some(content_type) => (content_type, true),
            None => (self.resolver.resolve(&normalized).content_type?, false),
        };

        let rest = if sibling {
            normalized.clone()
        } else {
            path_match::strip_prefix(&normalized, &content_type.folder_pattern)
                .unwrap_or_else(|| normalized.clone())
        };

        let mut segments = path_match::segments(&rest);
        let mut trailing_slash = false;
        if content_type.creation_mode == CreationMode::Folder
            && segments
                .last()
                .is_some_and(|last| last.eq_ignore_ascii_case(content_type.index_file_stem()))
        {
            segments.pop();
            trailing_slash = true;
        }

        let slug = segments
            .iter()
            .map(|segment| kebab_case(segment))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        let trailing_slash = trailing_slash || self.add_trailing_slash;

        let mut url = normalize_base_path(&content_type.link_base_path);
        url.push_str(&slug);
        if trailing_slash && !slug.is_empty() {
            url.push('/');
        }
        let anchor_slug = anchor.map(kebab_case).filter(|a| !a.is_empty());
        if let Some(anchor_slug) = &anchor_slug {
            url.push('#');
            url.push_str(anchor_slug);
        }

        let target = LinkTarget {
            raw_path,
            anchor: anchor.map(|a| format!("#{}", a)),
            matched_content_type: Some(content_type.id.clone()),
            slug,
            trailing_slash,
        };
        Some((url, target))
    }
}

/// Resolve `./` and `../` references against the source note's folder
fn resolve_relative(path: &str, source_path: &str) -> String {
    if !(path.starts_with("./") || path.starts_with("../")) {
        return path_match::normalize_path(path);
    }

    let mut stack = path_match::segments(parent_dir(source_path));
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack.join("/")
}

/// Text shown for a converted wikilink without an alias
fn wikilink_display(target: &str) -> String {
    match target.split_once('#') {
        Some((path, anchor)) => format!("{}#{}", strip_markdown_extension(path), anchor),
        None => strip_markdown_extension(target).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configs() -> Vec<ContentTypeConfig> {
        vec![
            ContentTypeConfig::builder("posts", "blog")
                .link_base_path("/blog/")
                .build()
                .unwrap(),
            ContentTypeConfig::builder("projects", "projects")
                .folder_mode("index")
                .link_base_path("/work/")
                .build()
                .unwrap(),
            ContentTypeConfig::builder("guides", "docs/*")
                .link_base_path("guides")
                .build()
                .unwrap(),
            ContentTypeConfig::builder("pages", "pages").build().unwrap(),
        ]
    }

    fn rewrite(raw: &str, source: &str) -> String {
        let configs = configs();
        LinkRewriter::new(&configs, false)
            .rewrite_reference(raw, source)
            .text()
            .to_string()
    }

    #[test]
    fn test_index_elision() {
        let configs = configs();
        let rewriter = LinkRewriter::new(&configs, false);
        match rewriter.rewrite_reference("projects/my-app/index.md", "notes.md") {
            Rewrite::Converted { url, target } => {
                assert_eq!(url, "/work/my-app/");
                assert!(target.trailing_slash);
                assert_eq!(target.slug, "my-app");
                assert_eq!(target.matched_content_type.as_deref(), Some("projects"));
            }
            other => panic!("expected conversion, got {:?}", other),
        }
    }

    #[test]
    fn test_external_and_images_are_skipped() {
        let configs = configs();
        let rewriter = LinkRewriter::new(&configs, false);
        for (raw, reason) in [
            ("https://example.com/x", SkipReason::External),
            ("diagram.png", SkipReason::Image),
            ("#Local Heading", SkipReason::SameDocument),
            ("", SkipReason::Empty),
        ] {
            assert_eq!(
                rewriter.rewrite_reference(raw, "blog/post.md"),
                Rewrite::Skipped {
                    original: raw.to_string(),
                    reason
                }
            );
        }
    }

    #[test]
    fn test_prefix_stripped_and_segments_kebab_cased() {
        assert_eq!(rewrite("blog/My Post.md", "x.md"), "/blog/my-post");
        assert_eq!(rewrite("blog/2024/Year Review.md", "x.md"), "/blog/2024/year-review");
        assert_eq!(rewrite("docs/setup/Install Guide.md", "x.md"), "/guides/install-guide");
        assert_eq!(rewrite("pages/About Us", "x.md"), "/about-us");
    }

    #[test]
    fn test_url_decoding_and_anchor() {
        assert_eq!(
            rewrite("blog/My%20Post.md#Some Heading", "x.md"),
            "/blog/my-post#some-heading"
        );
    }

    #[test]
    fn test_bare_reference_uses_source_type() {
        assert_eq!(rewrite("Other Post", "blog/first.md"), "/blog/other-post");
        assert_eq!(rewrite("Other Post", "random/first.md"), "Other Post");
    }

    #[test]
    fn test_bare_reference_resolves_itself_from_unmanaged_source() {
        let configs = vec![
            ContentTypeConfig::builder("pages", "").build().unwrap(),
            ContentTypeConfig::builder("posts", "blog")
                .link_base_path("/blog/")
                .build()
                .unwrap(),
        ];
        let rewriter = LinkRewriter::new(&configs, false);

        match rewriter.rewrite_reference("About Us", "journal/today.md") {
            Rewrite::Converted { url, target } => {
                assert_eq!(url, "/about-us");
                assert_eq!(target.matched_content_type.as_deref(), Some("pages"));
            }
            other => panic!("expected conversion, got {:?}", other),
        }
        assert_eq!(
            rewriter.rewrite_reference("Other", "blog/first.md").text(),
            "/blog/other"
        );
    }

    #[test]
    fn test_relative_reference() {
        assert_eq!(rewrite("../blog/b.md", "blog/a.md"), "/blog/b");
        assert_eq!(rewrite("./sub/c.md", "blog/a.md"), "/blog/sub/c");
    }

    #[test]
    fn test_unmanaged_target_left_untouched() {
        let configs = configs();
        let rewriter = LinkRewriter::new(&configs, false);
        let result = rewriter.rewrite_reference("archive/old.md", "blog/a.md");
        assert!(!result.is_converted());
        assert_eq!(result.text(), "archive/old.md");
    }

    #[test]
    fn test_global_trailing_slash() {
        let configs = configs();
        let rewriter = LinkRewriter::new(&configs, true);
        assert_eq!(
            rewriter.rewrite_reference("blog/a.md#Top", "x.md").text(),
            "/blog/a/#top"
        );
        assert_eq!(
            rewriter.rewrite_reference("projects/app/index.md", "x.md").text(),
            "/work/app/"
        );
    }

    #[test]
    fn test_heading_url() {
        let configs = configs();
        let rewriter = LinkRewriter::new(&configs, false);
        assert_eq!(
            rewriter.heading_url("projects/my-app/index.md", "## Getting Started"),
            Some("/work/my-app/#getting-started".to_string())
        );
        assert_eq!(rewriter.heading_url("random/x.md", "Intro"), None);
    }

    #[test]
    fn test_convert_document() {
        let configs = configs();
        let rewriter = LinkRewriter::new(&configs, false);
        let content = "---\nrelated: \"[[blog/Hidden]]\"\n---\n\
See [[blog/First Post|the first]], ![[projects/app/index]] and [docs](../blog/Second.md \"T\").\n\
Skip [[random/x]], ![[pic.png]], ![alt](img.jpg), [ext](https://example.com) and `[[blog/code]]`.\n";

        let result = rewriter.convert_document(content, "blog/current.md");
        assert_eq!(result.converted, 3);
        assert_eq!(result.skipped, 4);
        insta::assert_snapshot!(result.content, @r#"
        ---
        related: "[[blog/Hidden]]"
        ---
        See [the first](/blog/first-post), [projects/app/index](/work/app/) and [docs](/blog/second "T").
        Skip [[random/x]], ![[pic.png]], ![alt](img.jpg), [ext](https://example.com) and `[[blog/code]]`.
        "#);
    }
}
