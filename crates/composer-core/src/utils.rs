//! Shared string and path helpers.
//!
//! Provides:
//! - Kebab-case slugs for titles and path segments
//! - Link base path normalization
//! - Moment-style date formatting on top of chrono
//! - Vault-relative path splitting and joining

use chrono::NaiveDateTime;

/// Kebab-case a title or path segment.
///
/// Lowercases, drops punctuation, turns whitespace, `_` and `-` runs into a single
/// hyphen and trims hyphens from both ends.
///
/// ```
/// use composer_core::utils::kebab_case;
///
/// assert_eq!(kebab_case("My Awesome Post!! 2024"), "my-awesome-post-2024");
/// assert_eq!(kebab_case("  snake_case -- Title "), "snake-case-title");
/// ```
pub fn kebab_case(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalize a link base path so it starts and ends with `/` (empty becomes `/`)
pub fn normalize_base_path(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Format a timestamp with a moment-style format string.
///
/// Supported tokens: `YYYY YY MMMM MMM MM M DD D HH H hh h mm m ss s A a`.
/// Text inside `[...]` is emitted literally.
///
/// ```
/// use chrono::NaiveDate;
/// use composer_core::utils::format_date;
///
/// let ts = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap().and_hms_opt(9, 5, 0).unwrap();
/// assert_eq!(format_date("YYYY-MM-DD", &ts), "2024-03-07");
/// assert_eq!(format_date("YYYY-MM-DD HH:mm", &ts), "2024-03-07 09:05");
/// ```
pub fn format_date(format: &str, timestamp: &NaiveDateTime) -> String {
    timestamp
        .format(&moment_to_strftime(format))
        .to_string()
}

const MOMENT_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("A", "%p"),
    ("a", "%P"),
];

fn moment_to_strftime(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'outer: while let Some(c) = rest.chars().next() {
        if c == '['
            && let Some(close) = rest.find(']')
        {
            push_literal(&mut out, &rest[1..close]);
            rest = &rest[close + 1..];
            continue;
        }

        for (token, spec) in MOMENT_TOKENS {
            if rest.starts_with(token) {
                out.push_str(spec);
                rest = &rest[token.len()..];
                continue 'outer;
            }
        }

        push_literal(&mut out, &rest[..c.len_utf8()]);
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn push_literal(out: &mut String, text: &str) {
    out.push_str(&text.replace('%', "%%"));
}

/// Parent folder of a vault-relative path (empty for root-level files)
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Final segment of a vault-relative path
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// File name without its extension
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Join a folder and a name into a vault-relative path
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
