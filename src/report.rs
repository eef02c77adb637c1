//! Result sink and validation report
//!
//! Every phase reports through a [`ResultSink`] instead of returning errors, so one bad
//! software cluster never hides the issues of its siblings. [`ValidationReport`] is the
//! in-memory sink used by the binary and the tests.

use crate::error::{ErrorCode, GenerationError};
use serde::{Deserialize, Serialize};

/// Validation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationSeverity {
    /// An entity or model is wrong; its output is missing or falls back to a default
    Error,
    /// Output is produced but likely not what the integrator wants
    Warning,
    /// Informational message
    Info,
}

/// A single reported finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
    pub location: Option<String>,
    pub suggestion: Option<String>,
    pub code: Option<ErrorCode>,
}

impl ValidationIssue {
    pub fn error(message: impl Into<String>, location: Option<String>) -> Self {
        Self::with_severity(ValidationSeverity::Error, message, location)
    }

    pub fn warning(message: impl Into<String>, location: Option<String>) -> Self {
        Self::with_severity(ValidationSeverity::Warning, message, location)
    }

    pub fn info(message: impl Into<String>, location: Option<String>) -> Self {
        Self::with_severity(ValidationSeverity::Info, message, location)
    }

    fn with_severity(
        severity: ValidationSeverity,
        message: impl Into<String>,
        location: Option<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            location,
            suggestion: None,
            code: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl From<&GenerationError> for ValidationIssue {
    fn from(error: &GenerationError) -> Self {
        Self {
            severity: ValidationSeverity::Error,
            message: error.to_string(),
            location: Some(error.location().to_string()),
            suggestion: error.suggestion().map(str::to_string),
            code: Some(error.code()),
        }
    }
}

/// Accepts findings keyed by severity. Storage and presentation belong to the implementor.
pub trait ResultSink {
    fn report(&mut self, issue: ValidationIssue);

    fn report_error(&mut self, error: &GenerationError) {
        self.report(ValidationIssue::from(error));
    }
}

/// Complete validation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            issues: Vec::new(),
            error_count: 0,
            warning_count: 0,
            info_count: 0,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.by_severity(ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.by_severity(ValidationSeverity::Warning)
    }

    pub fn by_severity(
        &self,
        severity: ValidationSeverity,
    ) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity == severity)
    }

    /// Emit every issue as a tracing event at the matching level
    pub fn log(&self) {
        for issue in &self.issues {
            let location = issue.location.as_deref().unwrap_or("-");
            match issue.severity {
                ValidationSeverity::Error => tracing::error!(
                    location,
                    code = ?issue.code,
                    suggestion = ?issue.suggestion,
                    "{}",
                    issue.message
                ),
                ValidationSeverity::Warning => {
                    tracing::warn!(location, "{}", issue.message)
                }
                ValidationSeverity::Info => tracing::info!(location, "{}", issue.message),
            }
        }
    }
}

impl ResultSink for ValidationReport {
    fn report(&mut self, issue: ValidationIssue) {
        match issue.severity {
            ValidationSeverity::Error => self.error_count += 1,
            ValidationSeverity::Warning => self.warning_count += 1,
            ValidationSeverity::Info => self.info_count += 1,
        }
        self.issues.push(issue);
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
