pub mod config;
pub mod error;
pub mod extract;
pub mod generation;
pub mod guards;
pub mod logging;
pub mod output;
pub mod report;
pub mod source;

pub use config::{CliArgs, GeneratorConfig};
pub use error::{ErrorCode, GenerationError};
pub use extract::{NO_PHYSICAL_ADDRESS, SoftwareCluster, extract_software_clusters};
pub use generation::{
    BaseConfigModel, GenerationModel, GenerationOutcome, GenerationProcessor, ModelKind, Phase,
    ServerModel, run_generation_phases,
};
pub use logging::{LoggingConfig, init_logging};
pub use output::{
    DocumentWriter, FileSystemWriter, GenerationReceipt, MemoryWriter, OutputCollector,
};
pub use report::{ResultSink, ValidationReport};
pub use source::{SourceModel, SourceModelDocument};

use anyhow::Result;

/// Load the configured model, run every phase once and persist the outputs.
///
/// Per-model failures are part of the returned outcome; only strict mode turns them into
/// an error.
pub fn run_generation(config: &GeneratorConfig) -> Result<GenerationOutcome> {
    let document = SourceModelDocument::load(&config.model)?;

    tracing::info!(
        model = %config.model.display(),
        output_root = %config.output_root.display(),
        dry_run = config.dry_run,
        clusters = document.software_clusters.len(),
        "starting generation",
    );

    let mut report = ValidationReport::new();
    let outcome = if config.dry_run {
        let mut writer = MemoryWriter::new();
        run_generation_phases(&document, &mut report, &mut writer)
    } else {
        let mut writer = FileSystemWriter::new(&config.output_root).with_backups(config.backups);
        run_generation_phases(&document, &mut report, &mut writer)
    };
    report.log();

    if let Some(path) = config.receipt.as_ref() {
        if config.dry_run {
            tracing::info!(path = %path.display(), "dry run, receipt not saved");
        } else {
            outcome.receipt.save(path)?;
            tracing::info!(
                path = %path.display(),
                receipt = %outcome.receipt.receipt_id,
                "receipt saved"
            );
        }
    }

    if config.strict && outcome.has_failures() {
        anyhow::bail!(
            "{} of {} models failed in strict mode (first: {})",
            outcome.summary.failure_count,
            outcome.summary.model_count,
            outcome
                .failures
                .first()
                .map(|f| f.error.as_str())
                .unwrap_or_default()
        );
    }

    Ok(outcome)
}
