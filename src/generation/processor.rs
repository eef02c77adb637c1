//! Generation processor with type-level phase tracking
//!
//! The phase is encoded with PhantomData, so a run cannot generate before it was
//! validated or calculate twice without cleaning in between.
//!
//! **Valid transitions**:
//! - Fresh -> Calculated (via `calculate()`)
//! - Calculated -> Validated (via `build_and_validate()`)
//! - Validated -> Generated (via `generate()`)
//! - Generated -> Fresh (via `clean()`)
//!
//! Inside a phase, failures are collected per model and reported to the result sink.
//! A failing model never stops its siblings.

use super::context::GenerationContext;
use super::outcome::{GenerationOutcome, ModelFailure};
use super::registry::{ModelStatus, RegisteredModel};
use super::{BaseConfigModel, ModelKind, Phase, ServerModel};
use crate::error::GenerationError;
use crate::extract::extract_software_clusters;
use crate::guards::find_overlapping_outputs;
use crate::logging::{model_span, phase_span};
use crate::output::{DocumentWriter, GenerationReceipt, OutputCollector, OutputPath};
use crate::report::ResultSink;
use crate::source::SourceModel;
use std::marker::PhantomData;

// ============================================================================
// Phase Markers
// ============================================================================

/// Marker: nothing registered yet
pub struct Fresh;

/// Marker: server models registered
pub struct Calculated;

/// Marker: models validated, base config registered
pub struct Validated;

/// Marker: documents rendered and materialized
pub struct Generated;

// ============================================================================
// Processor
// ============================================================================

/// Drives one generation run through its phases
pub struct GenerationProcessor<'m, State> {
    context: GenerationContext<'m>,
    collector: OutputCollector,
    failures: Vec<ModelFailure>,
    _state: PhantomData<State>,
}

impl<'m, State> GenerationProcessor<'m, State> {
    pub fn context(&self) -> &GenerationContext<'m> {
        &self.context
    }

    /// Failures recorded so far in this run
    pub fn failures(&self) -> &[ModelFailure] {
        &self.failures
    }

    fn into_state<Next>(self) -> GenerationProcessor<'m, Next> {
        GenerationProcessor {
            context: self.context,
            collector: self.collector,
            failures: self.failures,
            _state: PhantomData,
        }
    }
}

impl<'m> GenerationProcessor<'m, Fresh> {
    pub fn new(source: &'m dyn SourceModel) -> Self {
        Self {
            context: GenerationContext::new(source),
            collector: OutputCollector::new(),
            failures: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Extract software clusters and register one server model per cluster
    pub fn calculate(mut self, sink: &mut dyn ResultSink) -> GenerationProcessor<'m, Calculated> {
        let _span = phase_span(Phase::Calculate).entered();

        let clusters = extract_software_clusters(self.context.source(), sink);
        let cluster_count = clusters.len();
        for cluster in clusters {
            self.context.register(Box::new(ServerModel::new(cluster)));
        }

        tracing::info!(clusters = cluster_count, "calculate complete");
        self.into_state()
    }
}

impl<'m> GenerationProcessor<'m, Calculated> {
    /// Validate every registered model, then add and validate the base config.
    ///
    /// A model that fails validation, or whose output path is already claimed, is rejected
    /// and will not be generated.
    pub fn build_and_validate(
        mut self,
        sink: &mut dyn ResultSink,
    ) -> GenerationProcessor<'m, Validated> {
        let _span = phase_span(Phase::BuildAndValidate).entered();

        for entry in self.context.registry_mut().iter_mut() {
            validate_entry(entry, sink, &mut self.failures);
        }

        let index = self.context.register(Box::new(BaseConfigModel::new()));
        if let Some(entry) = self.context.registry_mut().get_mut(index) {
            validate_entry(entry, sink, &mut self.failures);
        }

        self.reject_overlapping_outputs(sink);

        let registry = self.context.registry();
        tracing::info!(
            models = registry.len(),
            validated = registry.count_status(ModelStatus::Validated),
            rejected = registry.count_status(ModelStatus::Rejected),
            "build and validate complete"
        );
        self.into_state()
    }

    /// Base config paths are claimed first; among the rest the earliest registration wins.
    fn reject_overlapping_outputs(&mut self, sink: &mut dyn ResultSink) {
        let registry = self.context.registry();
        let mut claims: Vec<(usize, bool, OutputPath)> = registry
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.status() == ModelStatus::Validated)
            .map(|(index, entry)| {
                let model = entry.model();
                (index, model.kind() != ModelKind::BaseConfig, model.output_path())
            })
            .collect();
        claims.sort_by_key(|(index, not_base, _)| (*not_base, *index));

        let rejections: Vec<(usize, GenerationError)> =
            find_overlapping_outputs(claims.iter().map(|(index, _, path)| (*index, path)))
                .into_iter()
                .filter_map(|overlap| {
                    let rejected = registry.get(overlap.index)?.model().id();
                    let owner = registry.get(overlap.owner)?.model().id();
                    let error = GenerationError::validation(
                        rejected,
                        format!(
                            "output path '{}' is already claimed by '{}'",
                            overlap.path, owner
                        ),
                    );
                    Some((overlap.index, error))
                })
                .collect();

        for (index, error) in rejections {
            let Some(entry) = self.context.registry_mut().get_mut(index) else {
                continue;
            };
            tracing::warn!(%error, "rejecting model with overlapping output");
            sink.report_error(&error);
            self.failures.push(ModelFailure::new(
                Phase::BuildAndValidate,
                entry.model().id(),
                &error,
            ));
            entry.set_status(ModelStatus::Rejected);
        }
    }
}

impl<'m> GenerationProcessor<'m, Validated> {
    /// Render every validated model in registration order, then materialize the documents
    /// through `writer`.
    pub fn generate(
        mut self,
        sink: &mut dyn ResultSink,
        writer: &mut dyn DocumentWriter,
    ) -> (GenerationProcessor<'m, Generated>, GenerationOutcome) {
        let _span = phase_span(Phase::Generate).entered();

        let mut skipped = Vec::new();
        let mut generated_count = 0;
        let model_count = self.context.registry().len();

        for entry in self.context.registry_mut().iter_mut() {
            let _model = model_span(entry.model().id()).entered();
            if entry.status() != ModelStatus::Validated {
                tracing::debug!(model = entry.model().id(), "skipping rejected model");
                skipped.push(entry.model().id().to_string());
                continue;
            }

            match entry.model().generate(sink, &mut self.collector) {
                Ok(()) => {
                    entry.set_status(ModelStatus::Generated);
                    generated_count += 1;
                }
                Err(error) => {
                    tracing::warn!(model = entry.model().id(), %error, "generate failed");
                    sink.report_error(&error);
                    self.failures
                        .push(ModelFailure::new(Phase::Generate, entry.model().id(), &error));
                    entry.set_status(ModelStatus::Failed);
                }
            }
        }

        let materialized = self.collector.materialize(writer);
        for error in &materialized.failures {
            sink.report_error(error);
            self.failures
                .push(ModelFailure::new(Phase::Generate, error.location(), error));
        }

        let receipt = GenerationReceipt::from_materialized(&self.collector, &materialized);
        let outcome = GenerationOutcome::new(
            model_count,
            generated_count,
            materialized.written,
            self.failures.clone(),
            skipped,
            receipt,
        );

        tracing::info!(
            documents = outcome.summary.document_count,
            failures = outcome.summary.failure_count,
            receipt = %outcome.receipt.receipt_id,
            "generate complete"
        );
        (self.into_state(), outcome)
    }
}

impl<'m> GenerationProcessor<'m, Generated> {
    /// Documents rendered by this run
    pub fn collector(&self) -> &OutputCollector {
        &self.collector
    }

    /// Drop the run's models and documents; the processor is ready for another run
    pub fn clean(mut self) -> GenerationProcessor<'m, Fresh> {
        let _span = phase_span(Phase::Clean).entered();

        let dropped = self.context.registry().len();
        self.context.registry_mut().clear();
        self.collector = OutputCollector::new();
        self.failures.clear();

        tracing::debug!(models = dropped, "registry cleared");
        self.into_state()
    }
}

fn validate_entry(
    entry: &mut RegisteredModel,
    sink: &mut dyn ResultSink,
    failures: &mut Vec<ModelFailure>,
) {
    let _model = model_span(entry.model().id()).entered();
    match entry.model_mut().update_and_validate(sink) {
        Ok(()) => entry.set_status(ModelStatus::Validated),
        Err(error) => {
            tracing::warn!(model = entry.model().id(), %error, "validation failed");
            sink.report_error(&error);
            failures.push(ModelFailure::new(
                Phase::BuildAndValidate,
                entry.model().id(),
                &error,
            ));
            entry.set_status(ModelStatus::Rejected);
        }
    }
}

/// Run all four phases once against `source`
pub fn run_generation_phases(
    source: &dyn SourceModel,
    sink: &mut dyn ResultSink,
    writer: &mut dyn DocumentWriter,
) -> GenerationOutcome {
    let (generated, outcome) = GenerationProcessor::new(source)
        .calculate(sink)
        .build_and_validate(sink)
        .generate(sink, writer);
    generated.clean();
    outcome
}
