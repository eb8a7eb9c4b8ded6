//! Settings validation.
//!
//! Reports configuration problems the host should show the user: hard errors
//! (missing or duplicate ids) and advisory findings such as content types whose
//! patterns compete at the same specificity.

use crate::config::{ComposerSettings, ContentTypeConfig, CreationMode};
use crate::path_match;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational message (not a problem)
    Info,
    /// Warning (should be addressed but not critical)
    Warning,
    /// Error (must be fixed before the settings are usable)
    Error,
}

impl Severity {
    /// Check if this severity is considered a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// A validation issue found in the settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Content type the issue concerns, if any
    pub content_type: Option<String>,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            content_type: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attach the content type id
    pub fn for_type(mut self, id: impl Into<String>) -> Self {
        self.content_type = Some(id.into());
        self
    }

    /// Set a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Summary of validation results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub info_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
}

/// Result of validating settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether validation passed (no errors)
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    /// Create a new validation report
    pub fn new() -> Self {
        Self {
            passed: true,
            issues: Vec::new(),
            summary: ValidationSummary::default(),
        }
    }

    /// Add an issue to the report
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Info => self.summary.info_count += 1,
            Severity::Warning => self.summary.warning_count += 1,
            Severity::Error => {
                self.summary.error_count += 1;
                self.passed = false;
            }
        }
        self.issues.push(issue);
    }

    /// Get issues by severity
    pub fn issues_by_severity(&self, severity: Severity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    /// Check if there are any failures
    pub fn has_failures(&self) -> bool {
        !self.passed
    }

    /// Total issue count
    pub fn total_issues(&self) -> usize {
        self.issues.len()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a settings set
pub fn validate_settings(settings: &ComposerSettings) -> ValidationReport {
    let mut report = ValidationReport::new();
    let mut seen_ids = HashSet::new();

    for ct in &settings.content_types {
        if ct.id.trim().is_empty() {
            report.add_issue(
                ValidationIssue::new(
                    Severity::Error,
                    format!("Content type '{}' has an empty id", ct.display_name()),
                )
                .with_suggestion("Give every content type a stable id"),
            );
        } else if !seen_ids.insert(ct.id.as_str()) {
            report.add_issue(
                ValidationIssue::new(Severity::Error, format!("Duplicate content type id '{}'", ct.id))
                    .for_type(&ct.id),
            );
        }

        check_template(ct, &mut report);

        if ct.creation_mode == CreationMode::File && !ct.index_file_name.trim().is_empty() {
            report.add_issue(
                ValidationIssue::new(
                    Severity::Info,
                    "Index file name is only used in folder mode and will be ignored",
                )
                .for_type(&ct.id),
            );
        }
    }

    let enabled: Vec<&ContentTypeConfig> = settings
        .content_types
        .iter()
        .filter(|ct| ct.enabled)
        .collect();
    for (i, first) in enabled.iter().enumerate() {
        for second in &enabled[i + 1..] {
            if patterns_overlap(&first.folder_pattern, &second.folder_pattern) {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Warning,
                        format!(
                            "Content types '{}' and '{}' match the same folders at equal specificity; '{}' wins",
                            first.display_name(),
                            second.display_name(),
                            first.display_name()
                        ),
                    )
                    .for_type(&second.id)
                    .with_suggestion("Make one folder pattern more specific or disable one type"),
                );
            }
        }
    }

    report
}

fn check_template(ct: &ContentTypeConfig, report: &mut ValidationReport) {
    let template = ct.template.trim_start();
    if template.is_empty() {
        report.add_issue(
            ValidationIssue::new(Severity::Info, "Template is empty; new notes get no properties")
                .for_type(&ct.id),
        );
        return;
    }
    if !template.starts_with("---") {
        report.add_issue(
            ValidationIssue::new(
                Severity::Warning,
                "Template does not open with a '---' frontmatter block",
            )
            .for_type(&ct.id),
        );
    }
    if !ct.template.contains("{{title}}") {
        report.add_issue(
            ValidationIssue::new(
                Severity::Info,
                "Template has no {{title}} placeholder; rename will not update titles",
            )
            .for_type(&ct.id),
        );
    }
}

/// Two patterns of equal specificity that can match the same folder
fn patterns_overlap(a: &str, b: &str) -> bool {
    let a_segments = path_match::segments(a);
    let b_segments = path_match::segments(b);
    if a_segments.len() != b_segments.len() {
        return false;
    }
    a_segments.iter().zip(b_segments.iter()).all(|(x, y)| {
        x.contains('*') || y.contains('*') || x.to_lowercase() == y.to_lowercase()
    })
}
