use clap::Parser;
use dm_config_gen::{CliArgs, GeneratorConfig, LoggingConfig, init_logging, run_generation};

fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = GeneratorConfig::from_args(cli)?;

    // fail fast before any model is touched
    config.validate()?;

    let outcome = run_generation(&config)?;
    let summary = &outcome.summary;

    println!(
        "{} documents from {} models ({} generated, {} skipped, {} failures), receipt {}",
        summary.document_count,
        summary.model_count,
        summary.generated_count,
        summary.skipped_count,
        summary.failure_count,
        outcome.receipt.receipt_id
    );
    for failure in &outcome.failures {
        println!("  [{}] {}: {}", failure.phase, failure.model_id, failure.error);
    }

    Ok(())
}
