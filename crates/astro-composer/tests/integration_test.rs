//! Integration tests for Astro Composer

use astro_composer::prelude::*;
use astro_composer::settings::{DEFAULT_SETTINGS_FILE, settings_path};
use chrono::NaiveDate;
use tempfile::TempDir;
use tokio::fs;

const SETTINGS_JSON: &str = r#"{
  "contentTypes": [
    {
      "id": "posts",
      "name": "Posts",
      "folderPattern": "content/*/posts",
      "linkBasePath": "/blog/",
      "template": "---\ntitle: \"{{title}}\"\nslug: {{slug}}\npubDate: {{date}}\ntags: [blog]\n---\n\n# {{title}}\n"
    },
    {
      "id": "docs",
      "name": "Docs",
      "folderPattern": "docs",
      "creationMode": "folder",
      "indexFileName": "README",
      "linkBasePath": "docs"
    }
  ],
  "dateFormat": "DD.MM.YYYY",
  "addTrailingSlash": true
}"#;

/// Helper to create a test vault with a settings file in its root
async fn create_test_vault() -> (TempDir, NoteComposer<VaultManager>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    fs::write(root.join(DEFAULT_SETTINGS_FILE), SETTINGS_JSON)
        .await
        .expect("Failed to write settings");
    fs::create_dir_all(root.join("content/en/posts"))
        .await
        .expect("Failed to create posts folder");
    fs::create_dir_all(root.join("docs/getting-started"))
        .await
        .expect("Failed to create docs folder");
    fs::write(
        root.join("docs/getting-started/README.md"),
        "---\ntitle: Getting Started\n---\n\n## Install\n\nRead [the intro](../../content/en/posts/Hello%20World.md).\n",
    )
    .await
    .expect("Failed to write doc");

    let path = settings_path(None, Some(root)).expect("Settings file not found");
    let settings = load_settings(Some(&path)).expect("Failed to load settings");
    let manager = VaultManager::new(root).expect("Failed to create vault manager");
    (temp_dir, NoteComposer::new(manager, settings))
}

#[tokio::test]
async fn test_settings_loaded_from_vault() {
    let (_temp, composer) = create_test_vault().await;
    let settings = composer.settings();

    assert_eq!(settings.content_types.len(), 2);
    assert_eq!(settings.date_format, "DD.MM.YYYY");
    assert!(settings.add_trailing_slash);
    assert!(validate_settings(settings).passed);
}

#[tokio::test]
async fn test_new_post_with_wildcard_pattern() {
    let (temp, composer) = create_test_vault().await;
    fs::write(temp.path().join("content/en/posts/Untitled.md"), "")
        .await
        .unwrap();

    let now = NaiveDate::from_ymd_opt(2025, 3, 9)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let outcome = composer
        .process_new_file("content/en/posts/Untitled.md", "Hello World", now)
        .await
        .unwrap();

    assert_eq!(outcome.path, "content/en/posts/hello-world.md");
    let content = fs::read_to_string(temp.path().join("content/en/posts/hello-world.md"))
        .await
        .unwrap();
    assert_eq!(
        content,
        "---\ntitle: \"Hello World\"\nslug: hello-world\npubDate: 09.03.2025\ntags: [blog]\n---\n\n# Hello World\n"
    );
}

#[tokio::test]
async fn test_relative_link_into_other_content_type() {
    let (temp, composer) = create_test_vault().await;

    let report = composer
        .convert_links("docs/getting-started/README.md")
        .await
        .unwrap();
    assert_eq!(report.converted, 1);

    let content = fs::read_to_string(temp.path().join("docs/getting-started/README.md"))
        .await
        .unwrap();
    assert!(content.contains("[the intro](/blog/hello-world/)"));
}

#[tokio::test]
async fn test_heading_link_with_index_elision() {
    let (_temp, composer) = create_test_vault().await;
    let url = composer
        .heading_link("docs/getting-started/README.md", "Install")
        .await
        .unwrap();
    assert_eq!(url.as_deref(), Some("/docs/getting-started/#install"));
}

#[test]
fn test_resolver_through_facade() {
    let settings = ComposerSettings::from_json(SETTINGS_JSON).unwrap();
    let resolver = ContentTypeResolver::new(&settings.content_types);

    assert_eq!(resolver.resolve_id("content/de/posts/a.md"), Some("posts"));
    assert_eq!(resolver.resolve_id("docs/a/README.md"), Some("docs"));
    assert_eq!(resolver.resolve_id("content/posts/a.md"), None);
}
