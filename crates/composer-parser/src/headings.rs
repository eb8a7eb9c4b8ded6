//! Heading extraction via pulldown-cmark.

use composer_core::utils::kebab_case;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;

/// A heading and the anchor slug a static site would generate for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub text: String,
    pub level: u8,
    pub slug: String,
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Parse all headings from content (frontmatter and code blocks are not headings)
pub fn parse_headings(content: &str) -> Vec<Heading> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let mut headings = Vec::new();
    let mut current: Option<(u8, String)> = None;

    for event in Parser::new_ext(content, opts) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((level_number(level), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = current.take() {
                    let text = text.trim().to_string();
                    headings.push(Heading {
                        slug: kebab_case(&text),
                        text,
                        level,
                    });
                }
            }
            _ => {}
        }
    }

    headings
}

/// Find a heading by its text or slug (case-insensitive)
pub fn find_heading<'a>(headings: &'a [Heading], query: &str) -> Option<&'a Heading> {
    let query = query.trim().trim_start_matches('#').trim();
    let query_slug = kebab_case(query);
    headings
        .iter()
        .find(|h| h.text.eq_ignore_ascii_case(query))
        .or_else(|| headings.iter().find(|h| h.slug == query_slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_and_slugs() {
        let content = "# Main Title\n\n## Getting `Started`!\n\n###### Deep";
        let headings = parse_headings(content);
        assert_eq!(headings.len(), 3);
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[1].text, "Getting Started!");
        assert_eq!(headings[1].slug, "getting-started");
        assert_eq!(headings[2].level, 6);
    }

    #[test]
    fn test_frontmatter_and_code_are_not_headings() {
        let content = "---\ntitle: x\n---\n\n```sh\n# not a heading\n```\n\n# Real\n";
        let headings = parse_headings(content);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "Real");
    }

    #[test]
    fn test_find_heading() {
        let headings = parse_headings("# Intro\n## Setup Guide\n");
        assert_eq!(find_heading(&headings, "setup guide").map(|h| h.level), Some(2));
        assert_eq!(find_heading(&headings, "#setup-guide").map(|h| h.level), Some(2));
        assert!(find_heading(&headings, "Missing").is_none());
    }
}
