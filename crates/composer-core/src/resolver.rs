//! Content-type resolution: which configured type owns a path.
//!
//! Enabled types are tried most specific first (deepest pattern), ties broken by
//! declaration order. An unmatched path is an ordinary outcome, never an error.

use crate::config::{ContentTypeConfig, CreationMode};
use crate::models::Notice;
use crate::path_match;

/// Outcome of resolving one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// Winning content type, if any
    pub content_type: Option<&'a ContentTypeConfig>,
    /// Every type that matched at the winner's specificity, winner first
    pub candidates: Vec<&'a ContentTypeConfig>,
}

impl<'a> Resolution<'a> {
    fn none() -> Self {
        Self {
            content_type: None,
            candidates: Vec::new(),
        }
    }

    /// Id of the winning type
    pub fn id(&self) -> Option<&'a str> {
        self.content_type.map(|ct| ct.id.as_str())
    }

    /// More than one type matched at equal specificity
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }

    /// Advisory notice for the host, if this resolution deserves one
    pub fn notice(&self, path: &str) -> Option<Notice> {
        match self.content_type {
            None => Some(Notice::NoContentType {
                path: path.to_string(),
            }),
            Some(winner) if self.is_ambiguous() => Some(Notice::AmbiguousContentType {
                path: path.to_string(),
                chosen: winner.display_name().to_string(),
                candidates: self
                    .candidates
                    .iter()
                    .map(|ct| ct.display_name().to_string())
                    .collect(),
            }),
            Some(_) => None,
        }
    }
}

/// Resolver over a fixed configuration set, pre-sorted once for repeated lookups
#[derive(Debug, Clone)]
pub struct ContentTypeResolver<'a> {
    ordered: Vec<&'a ContentTypeConfig>,
}

impl<'a> ContentTypeResolver<'a> {
    /// Keep enabled types, most specific first (stable)
    pub fn new(configs: &'a [ContentTypeConfig]) -> Self {
        let mut ordered: Vec<&ContentTypeConfig> = configs.iter().filter(|ct| ct.enabled).collect();
        path_match::sort_by_specificity(&mut ordered, |ct| ct.folder_pattern.as_str());
        Self { ordered }
    }

    /// Resolve the owning content type of a vault-relative path
    pub fn resolve(&self, path: &str) -> Resolution<'a> {
        let Some(winner) = self.ordered.iter().copied().find(|ct| accepts(path, ct)) else {
            return Resolution::none();
        };

        let rank = winner.pattern_depth();
        let candidates: Vec<&ContentTypeConfig> = self
            .ordered
            .iter()
            .copied()
            .filter(|ct| ct.pattern_depth() == rank && accepts(path, ct))
            .collect();

        if candidates.len() > 1 {
            log::warn!(
                "Content types {:?} all match {} at equal specificity; using '{}'",
                candidates.iter().map(|ct| ct.id.as_str()).collect::<Vec<_>>(),
                path,
                winner.id
            );
        }

        Resolution {
            content_type: Some(winner),
            candidates,
        }
    }

    /// Shorthand returning only the winning id
    pub fn resolve_id(&self, path: &str) -> Option<&'a str> {
        self.resolve(path).id()
    }
}

/// Resolve a path against a configuration list in one call
pub fn resolve<'a>(path: &str, configs: &'a [ContentTypeConfig]) -> Resolution<'a> {
    ContentTypeResolver::new(configs).resolve(path)
}

/// Pattern match plus the `ignore_subfolders` depth restriction
fn accepts(path: &str, config: &ContentTypeConfig) -> bool {
    if !path_match::matches(path, &config.folder_pattern) {
        return false;
    }
    if !config.ignore_subfolders {
        return true;
    }

    let depth = path_match::directory_depth(path);
    let pattern_depth = config.pattern_depth();
    depth == pattern_depth
        || (config.creation_mode == CreationMode::Folder && depth == pattern_depth + 1)
}
