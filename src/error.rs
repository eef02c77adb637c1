//! Error handling for the generation pipeline
//!
//! This module provides:
//! - Stable numeric error codes with a category used for report aggregation
//! - `GenerationError`, the typed error every model and extractor returns
//! - Remediation hints attached to each error kind
//!
//! Model-scoped errors never cross a phase boundary: the processor turns them into
//! `ValidationIssue`s on the result sink and keeps going with the sibling models.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Error codes reported alongside every issue raised by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    /// A source entity carries a physical address with the wrong addressing scheme
    MalformedEntity = 1001,
    /// A generation model rejected its own data
    ValidationFailed = 1002,
    /// A generation model could not render its document
    RenderingFailed = 1003,
    /// The external writer refused a document
    WriteFailed = 1004,
    /// A document could not be serialized
    SerializationFailed = 1005,
}

impl ErrorCode {
    /// Get the integer code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get the error category for report aggregation
    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::MalformedEntity => "source_model",
            ErrorCode::ValidationFailed => "validation_error",
            ErrorCode::RenderingFailed | ErrorCode::SerializationFailed => "rendering_error",
            ErrorCode::WriteFailed => "io_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

// =============================================================================
// GENERATION ERROR
// =============================================================================

/// Errors raised while extracting, validating, rendering or writing
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(
        "software cluster '{cluster}' has a physical address without a network address field (scheme '{scheme}')"
    )]
    MalformedEntity { cluster: String, scheme: String },

    #[error("validation of '{model}' failed: {reason}")]
    Validation { model: String, reason: String },

    #[error("rendering of '{model}' failed: {reason}")]
    Rendering { model: String, reason: String },

    #[error("failed to write '{path}': {reason}")]
    Write { path: String, reason: String },

    #[error("failed to serialize '{path}': {source}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GenerationError {
    pub fn validation(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub fn rendering(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rendering {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GenerationError::MalformedEntity { .. } => ErrorCode::MalformedEntity,
            GenerationError::Validation { .. } => ErrorCode::ValidationFailed,
            GenerationError::Rendering { .. } => ErrorCode::RenderingFailed,
            GenerationError::Write { .. } => ErrorCode::WriteFailed,
            GenerationError::Serialization { .. } => ErrorCode::SerializationFailed,
        }
    }

    /// Where the error happened, used as the issue location on the result sink
    pub fn location(&self) -> &str {
        match self {
            GenerationError::MalformedEntity { cluster, .. } => cluster,
            GenerationError::Validation { model, .. } | GenerationError::Rendering { model, .. } => {
                model
            }
            GenerationError::Write { path, .. } | GenerationError::Serialization { path, .. } => {
                path
            }
        }
    }

    /// Remediation hint shown next to the error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            GenerationError::MalformedEntity { .. } => {
                Some("Configure the physical diagnostic address as a DoIP logical address")
            }
            GenerationError::Rendering { .. } => {
                Some("Run BuildAndValidate before generating the model")
            }
            GenerationError::Write { .. } => {
                Some("Check that the output root exists and is writable")
            }
            GenerationError::Validation { .. } | GenerationError::Serialization { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::MalformedEntity.code(), 1001);
        assert_eq!(ErrorCode::ValidationFailed.code(), 1002);
        assert_eq!(ErrorCode::RenderingFailed.code(), 1003);
        assert_eq!(ErrorCode::WriteFailed.code(), 1004);
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(ErrorCode::MalformedEntity.category(), "source_model");
        assert_eq!(ErrorCode::ValidationFailed.category(), "validation_error");
        assert_eq!(ErrorCode::SerializationFailed.category(), "rendering_error");
        assert_eq!(ErrorCode::WriteFailed.category(), "io_error");
    }

    #[test]
    fn test_error_display() {
        let error = GenerationError::validation("server:ClusterA", "name is empty");
        assert_eq!(
            error.to_string(),
            "validation of 'server:ClusterA' failed: name is empty"
        );
        assert_eq!(error.code(), ErrorCode::ValidationFailed);
        assert_eq!(error.location(), "server:ClusterA");
    }

    #[test]
    fn test_malformed_entity_has_suggestion() {
        let error = GenerationError::MalformedEntity {
            cluster: "ClusterA".to_string(),
            scheme: "can".to_string(),
        };
        assert!(error.to_string().contains("scheme 'can'"));
        assert!(error.suggestion().is_some());
    }
}
