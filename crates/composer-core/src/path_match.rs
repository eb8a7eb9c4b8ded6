//! Folder-pattern matching over vault-relative paths.
//!
//! Paths and patterns are `/`-separated and compared case-insensitively. A pattern is
//! either empty (vault root), a literal folder prefix (`blog/posts`), or a sequence of
//! segments where `*` stands for exactly one folder level (`docs/*`). A `*` inside a
//! segment (`20*-archive`) matches any run of characters within that one segment.
//!
//! Wildcards match folders, never the note's own file name: `docs/*` matches
//! `docs/guides/intro.md` but not `docs/intro.md`. Literal patterns keep prefix
//! semantics and match descendants at any depth.

/// Normalize a path to the canonical `/`-separated form without leading `./` or `/`
pub fn normalize_path(path: &str) -> String {
    segments(path).join("/")
}

/// Non-empty, non-`.` segments of a path or pattern
pub fn segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Number of folders above the file (0 for a root-level note)
pub fn directory_depth(path: &str) -> usize {
    segments(path).len().saturating_sub(1)
}

/// Specificity of a pattern: its segment count (0 for root)
pub fn specificity_rank(pattern: &str) -> usize {
    segments(pattern).len()
}

/// True when `path` lies under the folder described by `pattern`
pub fn matches(path: &str, pattern: &str) -> bool {
    let path_segments = segments(path);
    let pattern_segments = segments(pattern);

    if pattern_segments.is_empty() {
        return path_segments.len() <= 1;
    }
    if pattern_segments.len() > path_segments.len() {
        return false;
    }

    pattern_segments
        .iter()
        .zip(path_segments.iter())
        .enumerate()
        .all(|(i, (pat, seg))| {
            if pat.contains('*') {
                i + 1 < path_segments.len() && glob_segment(pat, seg)
            } else {
                pat.to_lowercase() == seg.to_lowercase()
            }
        })
}

/// Remove the segments consumed by `pattern` from `path`.
///
/// Returns `None` when the pattern does not match.
pub fn strip_prefix(path: &str, pattern: &str) -> Option<String> {
    if !matches(path, pattern) {
        return None;
    }
    let consumed = specificity_rank(pattern);
    Some(segments(path)[consumed..].join("/"))
}

/// Stable sort, most specific pattern first
pub fn sort_by_specificity<T>(items: &mut [T], pattern_of: impl Fn(&T) -> &str) {
    items.sort_by_key(|item| std::cmp::Reverse(specificity_rank(pattern_of(item))));
}

/// Match one path segment against a segment pattern containing `*`
fn glob_segment(pattern: &str, segment: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let segment: Vec<char> = segment.to_lowercase().chars().collect();

    let (mut p, mut s) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while s < segment.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            resume = s;
            p += 1;
        } else if p < pattern.len() && pattern[p] == segment[s] {
            p += 1;
            s += 1;
        } else if let Some(star_pos) = star {
            p = star_pos + 1;
            resume += 1;
            s = resume;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
