//! Astro Composer CLI

use anyhow::{Context, Result, bail};
use astro_composer::prelude::*;
use astro_composer::settings::settings_path;
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Astro Composer - content-type aware note authoring for static sites
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the vault directory (`~` and `$VARS` are expanded)
    #[arg(short, long, env = "COMPOSER_VAULT", default_value = ".")]
    vault: String,

    /// Settings file (.json, .yaml or .yml); defaults to astro-composer.json in the vault
    #[arg(short, long, env = "COMPOSER_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, overriding the settings' logLevel (RUST_LOG wins over both)
    #[arg(long)]
    log_level: Option<String>,

    /// Print machine-readable JSON where supported
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show which content type owns each path
    Resolve {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Name a freshly created note after its title and apply its template
    New {
        path: String,
        #[arg(short, long)]
        title: String,
    },
    /// Add missing template properties to one note, or every managed note
    Standardize {
        #[arg(required_unless_present = "all")]
        path: Option<String>,
        #[arg(long, conflicts_with = "path")]
        all: bool,
    },
    /// Rename a note (or its entry folder) and update its title
    Rename {
        path: String,
        #[arg(short, long)]
        title: String,
    },
    /// Rewrite internal links as site URLs in one note, or every note
    ConvertLinks {
        #[arg(required_unless_present = "all")]
        path: Option<String>,
        #[arg(long, conflicts_with = "path")]
        all: bool,
    },
    /// Print the site URL of a heading
    HeadingLink { path: String, heading: String },
    /// Validate the settings and report conflicts
    CheckConfig,
    /// Watch the vault and process new notes as they appear
    Watch,
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Vault-relative form of a path given on the command line
fn vault_relative(vault: &Path, raw: &str) -> Result<String> {
    let path = Path::new(raw);
    if path.is_absolute() {
        let relative = match path.strip_prefix(vault) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path
                .canonicalize()
                .ok()
                .and_then(|p| p.strip_prefix(vault).ok().map(Path::to_path_buf))
                .with_context(|| format!("{} is not inside the vault", raw))?,
        };
        return Ok(composer_core::path_match::normalize_path(
            &relative.to_string_lossy(),
        ));
    }
    Ok(composer_core::path_match::normalize_path(raw))
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("note: {}", notice);
    }
}

fn print_outcome(outcome: &NoteOutcome) {
    println!("{}: {}", outcome.status, outcome.path);
    print_notices(&outcome.notices);
}

fn print_summary(label: &str, summary: &BatchSummary) {
    println!(
        "{}: {} visited, {} changed, {} unchanged, {} skipped",
        label, summary.visited, summary.changed, summary.unchanged, summary.skipped
    );
    if summary.links_converted > 0 {
        println!("{} links converted", summary.links_converted);
    }
    print_notices(&summary.notices);
    for failure in &summary.failures {
        eprintln!("error: {}: {}", failure.path, failure.error);
    }
}

fn check_config(settings: &ComposerSettings, json: bool) -> Result<()> {
    let report = validate_settings(settings);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for issue in &report.issues {
            let scope = issue.content_type.as_deref().unwrap_or("settings");
            println!("{:?} [{}]: {}", issue.severity, scope, issue.message);
            if let Some(suggestion) = &issue.suggestion {
                println!("  suggestion: {}", suggestion);
            }
        }
        println!(
            "{} content types, {} errors, {} warnings",
            settings.content_types.len(),
            report.summary.error_count,
            report.summary.warning_count
        );
    }

    if report.has_failures() {
        bail!("settings are invalid");
    }
    Ok(())
}

fn resolve_paths(settings: &ComposerSettings, paths: &[String], json: bool) -> Result<()> {
    let resolver = ContentTypeResolver::new(&settings.content_types);
    let mut rows = Vec::new();

    for path in paths {
        let path = composer_core::path_match::normalize_path(path);
        let resolution = resolver.resolve(&path);
        let notice = resolution.notice(&path);
        if json {
            rows.push(serde_json::json!({
                "path": path,
                "contentType": resolution.id(),
                "notice": notice,
            }));
        } else {
            println!("{}\t{}", path, resolution.id().unwrap_or("-"));
            if let Some(notice) = notice {
                eprintln!("note: {}", notice);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }
    Ok(())
}

async fn watch(composer: NoteComposer<VaultManager>) -> Result<()> {
    let root = composer.store().vault_path().to_path_buf();
    let (mut watcher, mut events) = VaultWatcher::new(&root, WatcherConfig::default());
    watcher.start()?;
    tracing::info!("Watching {} (Ctrl-C to stop)", root.display());

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let Some(path) = composer.store().relative_path(event.path()) else {
                    continue;
                };
                match composer.handle_event(&event, &path, now()).await {
                    Ok(Some(outcome)) => print_outcome(&outcome),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Could not process {}: {}", path, e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    watcher.stop();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let vault = expand_vault_path(&args.vault)?;
    let settings_file = settings_path(args.config.as_deref(), Some(&vault));
    let settings = load_settings(settings_file.as_deref())?;

    init_logging(args.log_level.as_deref().unwrap_or(&settings.log_level));
    tracing::debug!(
        "Astro Composer v{} | vault: {} | settings: {}",
        env!("CARGO_PKG_VERSION"),
        vault.display(),
        settings_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );

    if settings.content_types.is_empty() && !matches!(args.command, Command::CheckConfig) {
        tracing::warn!("No content types configured; every note is unmanaged");
    }

    match args.command {
        Command::Resolve { paths } => return resolve_paths(&settings, &paths, args.json),
        Command::CheckConfig => return check_config(&settings, args.json),
        _ => {}
    }

    let composer = NoteComposer::new(VaultManager::new(&vault)?, settings);

    match args.command {
        Command::New { path, title } => {
            let path = vault_relative(&vault, &path)?;
            print_outcome(&composer.process_new_file(&path, &title, now()).await?);
        }
        Command::Standardize { all: true, .. } => {
            let summary = composer.standardize_all(now()).await?;
            print_summary("standardize", &summary);
            if !summary.success() {
                bail!("{} notes failed", summary.failures.len());
            }
        }
        Command::Standardize { path, .. } => {
            let path = vault_relative(&vault, &path.context("a note path or --all is required")?)?;
            print_outcome(&composer.standardize(&path, now()).await?);
        }
        Command::Rename { path, title } => {
            let path = vault_relative(&vault, &path)?;
            print_outcome(&composer.rename_note(&path, &title).await?);
        }
        Command::ConvertLinks { all: true, .. } => {
            let summary = composer.convert_all().await?;
            print_summary("convert-links", &summary);
            if !summary.success() {
                bail!("{} notes failed", summary.failures.len());
            }
        }
        Command::ConvertLinks { path, .. } => {
            let path = vault_relative(&vault, &path.context("a note path or --all is required")?)?;
            let report = composer.convert_links(&path).await?;
            println!(
                "{}: {} converted, {} left as is",
                report.path, report.converted, report.skipped
            );
        }
        Command::HeadingLink { path, heading } => {
            let path = vault_relative(&vault, &path)?;
            match composer.heading_link(&path, &heading).await? {
                Some(url) => println!("{}", url),
                None => bail!("{} is not managed by any content type", path),
            }
        }
        Command::Watch => watch(composer).await?,
        Command::Resolve { .. } | Command::CheckConfig => {}
    }

    Ok(())
}
