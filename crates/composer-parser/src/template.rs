//! Template rendering for new and standardized notes.
//!
//! A template is a frontmatter block plus an optional body. Placeholders
//! `{{title}}`, `{{date}}` and `{{slug}}` are replaced verbatim. When a scalar is
//! quoted in the template, substituted values are escaped for that quote style so a
//! title containing quotes cannot break the line.

use crate::frontmatter::{LineKind, classify_line, find_block, parse_properties};
use composer_core::{Properties, PropertyValue, TemplateContext, TemplateRenderResult};

pub const TITLE_PLACEHOLDER: &str = "{{title}}";
pub const DATE_PLACEHOLDER: &str = "{{date}}";
pub const SLUG_PLACEHOLDER: &str = "{{slug}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    Plain,
    Double,
    Single,
}

fn quoting_of(value: &str) -> Quoting {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Quoting::Double
    } else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        Quoting::Single
    } else {
        Quoting::Plain
    }
}

fn escape(value: &str, quoting: Quoting) -> String {
    match quoting {
        Quoting::Plain => value.to_string(),
        Quoting::Double => value.replace('\\', "\\\\").replace('"', "\\\""),
        Quoting::Single => value.replace('\'', "''"),
    }
}

/// Single pass, so a title containing `{{date}}` is not expanded twice
fn expand(text: &str, ctx: &TemplateContext, quoting: Quoting) -> String {
    let placeholders = [
        (TITLE_PLACEHOLDER, ctx.title.as_str()),
        (DATE_PLACEHOLDER, ctx.date.as_str()),
        (SLUG_PLACEHOLDER, ctx.slug.as_str()),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match placeholders
            .iter()
            .find(|(token, _)| candidate.starts_with(token))
        {
            Some((token, value)) => {
                out.push_str(&escape(value, quoting));
                rest = &candidate[token.len()..];
            }
            None => {
                out.push_str("{{");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn expand_value(value: PropertyValue, ctx: &TemplateContext) -> PropertyValue {
    match value {
        PropertyValue::Scalar(s) => {
            let quoting = quoting_of(&s);
            PropertyValue::Scalar(expand(&s, ctx, quoting))
        }
        PropertyValue::List(items) => PropertyValue::List(
            items
                .iter()
                .map(|item| expand(item, ctx, Quoting::Plain))
                .filter(|item| !item.trim().is_empty())
                .collect(),
        ),
    }
}

/// Properties declared by the template's block, placeholders still in place
fn declared_properties(template: &str) -> Properties {
    match find_block(template) {
        Some(span) => parse_properties(&template[span.content_start..span.content_end]),
        None => Properties::new(),
    }
}

/// Expand a template's block into its declared properties.
///
/// Text after the block is ignored. List/scalar classification is decided on the
/// raw template, so it never depends on the context values.
pub fn render(template: &str, ctx: &TemplateContext) -> TemplateRenderResult {
    let values: Properties = declared_properties(template)
        .into_iter()
        .map(|(key, value)| (key, expand_value(value, ctx)))
        .collect();

    TemplateRenderResult {
        declared_keys: values.keys().cloned().collect(),
        values,
    }
}

/// Full text of a new note: the template with every placeholder substituted and its
/// layout preserved
pub fn render_document(template: &str, ctx: &TemplateContext) -> String {
    let span = find_block(template);
    let mut out = String::with_capacity(template.len() + ctx.title.len());
    let mut offset = 0;

    for line in template.split_inclusive('\n') {
        let in_block =
            span.is_some_and(|s| offset >= s.content_start && offset < s.content_end);
        let quoting = match classify_line(line) {
            LineKind::KeyValue { value, .. } if in_block => quoting_of(value),
            _ => Quoting::Plain,
        };
        out.push_str(&expand(line, ctx, quoting));
        offset += line.len();
    }
    out
}

/// Only the rendered block of a template, closing delimiter line included.
///
/// Empty when the template has no block.
pub fn render_block(template: &str, ctx: &TemplateContext) -> String {
    match find_block(template) {
        Some(span) => {
            let mut block = render_document(&template[..span.end], ctx);
            if !block.ends_with('\n') {
                block.push('\n');
            }
            block
        }
        None => String::new(),
    }
}

/// Keys whose template value carries `{{title}}`
pub fn title_keys(template: &str) -> Vec<String> {
    declared_properties(template)
        .into_iter()
        .filter(|(_, value)| match value {
            PropertyValue::Scalar(s) => s.contains(TITLE_PLACEHOLDER),
            PropertyValue::List(items) => items.iter().any(|i| i.contains(TITLE_PLACEHOLDER)),
        })
        .map(|(key, _)| key)
        .collect()
}

/// Whether a rename can update the title stored in frontmatter
pub fn has_title_placeholder(template: &str) -> bool {
    !title_keys(template).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_core::config::DEFAULT_TEMPLATE;

    fn ctx() -> TemplateContext {
        TemplateContext::new("My Awesome Post!! 2024", "2024-05-01")
    }

    #[test]
    fn test_render_default_template() {
        let result = render(DEFAULT_TEMPLATE, &ctx());
        assert_eq!(
            result.declared_keys,
            vec!["title", "description", "pubDate", "tags"]
        );
        assert_eq!(
            result.values["title"],
            PropertyValue::scalar("\"My Awesome Post!! 2024\"")
        );
        assert_eq!(result.values["pubDate"], PropertyValue::scalar("2024-05-01"));
        assert_eq!(result.values["tags"], PropertyValue::List(vec![]));
    }

    #[test]
    fn test_slug_and_list_substitution() {
        let template = "---\npermalink: /{{slug}}/\ntags:\n  - post\n  - \"{{slug}}\"\n---\n";
        let result = render(template, &ctx());
        assert_eq!(
            result.values["permalink"],
            PropertyValue::scalar("/my-awesome-post-2024/")
        );
        assert_eq!(
            result.values["tags"],
            PropertyValue::list(["post", "my-awesome-post-2024"])
        );
    }

    #[test]
    fn test_quoted_title_is_escaped() {
        let ctx = TemplateContext::new("Say \"hi\"", "2024-05-01");
        let template = "---\ntitle: \"{{title}}\"\nalt: '{{title}}'\nplain: {{title}}\n---\n";
        let result = render(template, &ctx);
        assert_eq!(result.values["title"], PropertyValue::scalar("\"Say \\\"hi\\\"\""));
        assert_eq!(result.values["alt"], PropertyValue::scalar("'Say \"hi\"'"));
        assert_eq!(result.values["plain"], PropertyValue::scalar("Say \"hi\""));
    }

    #[test]
    fn test_classification_independent_of_context() {
        let template = "---\ntitle: {{title}}\ntags: []\n---\n";
        let empty = render(template, &TemplateContext::new("", ""));
        let full = render(template, &ctx());
        assert_eq!(empty.values["title"].is_list(), full.values["title"].is_list());
        assert!(!empty.values["title"].is_list());
    }

    #[test]
    fn test_last_write_wins_keeps_first_position() {
        let template = "---\na: 1\nb: 2\na: 3\n---\n";
        let result = render(template, &ctx());
        assert_eq!(result.declared_keys, vec!["a", "b"]);
        assert_eq!(result.values["a"], PropertyValue::scalar("3"));
    }

    #[test]
    fn test_empty_or_blockless_template() {
        assert!(render("", &ctx()).is_empty());
        assert!(render("Just a body {{title}}", &ctx()).is_empty());
    }

    #[test]
    fn test_body_is_ignored_by_render_but_kept_by_document() {
        let template = "---\ntitle: \"{{title}}\"\n---\n\n# {{title}}\n";
        assert_eq!(render(template, &ctx()).declared_keys, vec!["title"]);
        insta::assert_snapshot!(render_document(template, &ctx()), @r#"
        ---
        title: "My Awesome Post!! 2024"
        ---

        # My Awesome Post!! 2024
        "#);
    }

    #[test]
    fn test_render_block_excludes_body() {
        let template = "---\ntitle: \"{{title}}\"\n---\nBody {{slug}}";
        assert_eq!(
            render_block(template, &ctx()),
            "---\ntitle: \"My Awesome Post!! 2024\"\n---\n"
        );
        assert_eq!(render_block("no block", &ctx()), "");
    }

    #[test]
    fn test_placeholders_in_values_are_not_reexpanded() {
        let ctx = TemplateContext::new("{{date}}", "2024-05-01");
        let result = render("---\ntitle: {{title}}\n---\n", &ctx);
        assert_eq!(result.values["title"], PropertyValue::scalar("{{date}}"));
    }

    #[test]
    fn test_title_keys() {
        assert_eq!(title_keys(DEFAULT_TEMPLATE), vec!["title"]);
        assert!(has_title_placeholder(DEFAULT_TEMPLATE));
        assert!(!has_title_placeholder("---\ntags: []\n---\n# {{title}}\n"));
    }
}
