//! Aggregated result of a generation run

use super::Phase;
use crate::error::{ErrorCode, GenerationError};
use crate::output::GenerationReceipt;
use serde::Serialize;
use std::path::PathBuf;

/// A model (or document) that did not make it into the output
#[derive(Debug, Clone, Serialize)]
pub struct ModelFailure {
    pub phase: Phase,
    /// Model id, or the output path for write failures
    pub model_id: String,
    pub code: ErrorCode,
    pub error: String,
}

impl ModelFailure {
    pub fn new(phase: Phase, model_id: impl Into<String>, error: &GenerationError) -> Self {
        Self {
            phase,
            model_id: model_id.into(),
            code: error.code(),
            error: error.to_string(),
        }
    }
}

/// Summary statistics of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutcomeSummary {
    pub model_count: usize,
    pub generated_count: usize,
    pub failure_count: usize,
    pub skipped_count: usize,
    pub document_count: usize,
    /// Share of models that generated, 0-100
    pub success_rate: f64,
}

/// What a run produced and what it could not produce
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ModelFailure>,
    /// Models whose generate step was skipped after a validation failure
    pub skipped: Vec<String>,
    pub summary: OutcomeSummary,
    pub receipt: GenerationReceipt,
}

impl GenerationOutcome {
    pub(crate) fn new(
        model_count: usize,
        generated_count: usize,
        written: Vec<PathBuf>,
        failures: Vec<ModelFailure>,
        skipped: Vec<String>,
        receipt: GenerationReceipt,
    ) -> Self {
        let success_rate = if model_count > 0 {
            (generated_count as f64 / model_count as f64) * 100.0
        } else {
            0.0
        };

        let summary = OutcomeSummary {
            model_count,
            generated_count,
            failure_count: failures.len(),
            skipped_count: skipped.len(),
            document_count: written.len(),
            success_rate,
        };

        Self {
            written,
            failures,
            skipped,
            summary,
            receipt,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn is_partial_success(&self) -> bool {
        self.summary.generated_count > 0 && !self.failures.is_empty()
    }

    /// True only when no model generated at all
    pub fn is_complete_failure(&self) -> bool {
        self.summary.model_count > 0 && self.summary.generated_count == 0
    }

    pub fn failures_in(&self, phase: Phase) -> impl Iterator<Item = &ModelFailure> {
        self.failures.iter().filter(move |f| f.phase == phase)
    }
}
