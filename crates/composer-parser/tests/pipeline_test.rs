//! End-to-end text pipeline: decode, render, merge, compose

use composer_core::config::DEFAULT_TEMPLATE;
use composer_core::{PropertyValue, TemplateContext};
use composer_parser::{compose, decode, encode, merge, render};

fn standardize(note: &str, template: &str, title: &str) -> String {
    let parsed = decode(note);
    let rendered = render(template, &TemplateContext::new(title, "2024-05-01"));
    let merged = merge(&parsed.properties, &rendered);
    compose(&merged.properties, &parsed.body)
}

#[test]
fn test_standardize_is_idempotent() {
    let note = "---\ntitle: \"Custom\"\ntags:\n  - rust\ndraft: true\n---\n\n# Heading\n\nBody text.\n";

    let once = standardize(note, DEFAULT_TEMPLATE, "Generated");
    let twice = standardize(&once, DEFAULT_TEMPLATE, "Generated");
    assert_eq!(once, twice);

    let parsed = decode(&once);
    assert_eq!(parsed.scalar("title"), Some("\"Custom\""));
    assert_eq!(parsed.scalar("draft"), Some("true"));
    assert_eq!(parsed.scalar("pubDate"), Some("2024-05-01"));
    assert_eq!(parsed.properties["tags"], PropertyValue::list(["rust"]));
    assert_eq!(parsed.body, "\n# Heading\n\nBody text.\n");
}

#[test]
fn test_note_without_block_gets_template_properties() {
    let out = standardize("Just a body.\n", DEFAULT_TEMPLATE, "Fresh Note");
    assert_eq!(
        out,
        "---\ntitle: \"Fresh Note\"\ndescription: \"\"\npubDate: 2024-05-01\ntags:\n---\nJust a body.\n"
    );
}

#[test]
fn test_round_trip_of_well_formed_documents() {
    let documents = [
        "---\ntitle: Hello\n---\nBody",
        "---\ntags:\n  - a\n  - b\nempty:\nquoted: \"x: y\"\n---\n",
        "---\naliases: [one, \"two, three\"]\nurl: https://example.com/a\n---\n\ntext\n",
        "---\n---\nNo properties\n",
    ];

    for text in documents {
        let parsed = decode(text);
        let again = decode(&compose(&parsed.properties, &parsed.body));
        assert_eq!(again.properties, parsed.properties, "properties for {:?}", text);
        assert_eq!(again.body, parsed.body, "body for {:?}", text);
    }
}

#[test]
fn test_encode_of_empty_properties() {
    assert_eq!(encode(&Default::default()), "---\n---\n");
}
