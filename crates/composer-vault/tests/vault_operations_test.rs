//! Note operations against a vault on disk

use chrono::{NaiveDate, NaiveDateTime};
use composer_vault::prelude::*;
use tempfile::TempDir;
use tokio::fs;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 2)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap()
}

fn settings() -> ComposerSettings {
    ComposerSettings {
        content_types: vec![
            ContentTypeConfig::builder("posts", "blog/posts")
                .name("Posts")
                .link_base_path("/blog/")
                .build()
                .expect("Failed to build posts type"),
            ContentTypeConfig::builder("projects", "projects")
                .name("Projects")
                .folder_mode("index")
                .alt_extension(true)
                .link_base_path("/work/")
                .build()
                .expect("Failed to build projects type"),
        ],
        date_format: "YYYY-MM-DD HH:mm".to_string(),
        ..ComposerSettings::default()
    }
}

async fn create_test_vault() -> (TempDir, NoteComposer<VaultManager>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    fs::create_dir_all(root.join("blog/posts"))
        .await
        .expect("Failed to create posts folder");
    fs::create_dir_all(root.join("projects/my-app"))
        .await
        .expect("Failed to create project folder");
    fs::create_dir_all(root.join(".obsidian"))
        .await
        .expect("Failed to create config folder");

    fs::write(
        root.join("blog/posts/hello-world.md"),
        "---\ntitle: \"Hello World\"\n---\nSee [[projects/my-app/index#Setup|the app]].\n",
    )
    .await
    .expect("Failed to write post");
    fs::write(
        root.join("projects/my-app/index.mdx"),
        "---\ntitle: \"My App\"\ntags: [rust]\n---\n\n## Setup\n",
    )
    .await
    .expect("Failed to write project");
    fs::write(root.join(".obsidian/notes.md"), "[[blog/posts/hello-world]]")
        .await
        .expect("Failed to write hidden note");

    let manager = VaultManager::new(root).expect("Failed to create vault manager");
    (temp_dir, NoteComposer::new(manager, settings()))
}

#[tokio::test]
async fn test_new_project_lands_in_entry_folder() {
    let (temp_dir, composer) = create_test_vault().await;
    fs::write(temp_dir.path().join("projects/Untitled.md"), "")
        .await
        .unwrap();

    let outcome = composer
        .process_new_file("projects/Untitled.md", "Side Quest", now())
        .await
        .unwrap();

    assert_eq!(outcome.path, "projects/side-quest/index.mdx");
    let written = fs::read_to_string(temp_dir.path().join("projects/side-quest/index.mdx"))
        .await
        .unwrap();
    assert!(written.contains("title: \"Side Quest\"\n"));
    assert!(written.contains("pubDate: 2024-11-02 14:30\n"));
    assert!(!temp_dir.path().join("projects/Untitled.md").exists());
}

#[tokio::test]
async fn test_new_note_collision_leaves_files_alone() {
    let (temp_dir, composer) = create_test_vault().await;
    fs::write(temp_dir.path().join("projects/Untitled.md"), "draft")
        .await
        .unwrap();

    let err = composer
        .process_new_file("projects/Untitled.md", "My App", now())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PathConflict { ref path } if path == "projects/my-app"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("projects/Untitled.md"))
            .await
            .unwrap(),
        "draft"
    );
}

#[tokio::test]
async fn test_rename_project_entry_folder() {
    let (temp_dir, composer) = create_test_vault().await;

    let outcome = composer
        .rename_note("projects/my-app/index.mdx", "Main App")
        .await
        .unwrap();

    assert_eq!(outcome.path, "projects/main-app/index.mdx");
    assert!(!temp_dir.path().join("projects/my-app").exists());
    let content = fs::read_to_string(temp_dir.path().join("projects/main-app/index.mdx"))
        .await
        .unwrap();
    assert!(content.starts_with("---\ntitle: \"Main App\"\ntags:\n  - rust\n---\n"));
}

#[tokio::test]
async fn test_convert_all_skips_hidden_folders() {
    let (temp_dir, composer) = create_test_vault().await;

    let summary = composer.convert_all().await.unwrap();
    assert!(summary.success());
    assert_eq!(summary.visited, 2);
    assert_eq!(summary.links_converted, 1);

    let post = fs::read_to_string(temp_dir.path().join("blog/posts/hello-world.md"))
        .await
        .unwrap();
    assert!(post.contains("See [the app](/work/my-app/#setup)."));

    let hidden = fs::read_to_string(temp_dir.path().join(".obsidian/notes.md"))
        .await
        .unwrap();
    assert_eq!(hidden, "[[blog/posts/hello-world]]");
}

#[tokio::test]
async fn test_standardize_all_then_idempotent() {
    let (_temp_dir, composer) = create_test_vault().await;

    let first = composer.standardize_all(now()).await.unwrap();
    assert_eq!(first.visited, 2);
    assert_eq!(first.changed, 2);

    let second = composer.standardize_all(now()).await.unwrap();
    assert_eq!(second.changed, 0);
    assert_eq!(second.unchanged, 2);
}

#[tokio::test]
async fn test_heading_link_on_disk() {
    let (_temp_dir, composer) = create_test_vault().await;
    let url = composer
        .heading_link("projects/my-app/index.mdx", "setup")
        .await
        .unwrap();
    assert_eq!(url.as_deref(), Some("/work/my-app/#setup"));
}
