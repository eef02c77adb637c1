//! Generation pipeline
//!
//! A run moves through four phases, enforced by the type of [`GenerationProcessor`]:
//!
//! ```text
//! Fresh ─calculate→ Calculated ─build_and_validate→ Validated ─generate→ Generated ─clean→ Fresh
//! ```
//!
//! - **Calculate**: extract software clusters and register one [`ServerModel`] each
//! - **BuildAndValidate**: validate every model (collect-all), add the [`BaseConfigModel`],
//!   reject overlapping outputs
//! - **Generate**: render every validated model into the collector, then materialize
//! - **Clean**: drop the run's models so the next run starts empty
//!
//! Calling phases out of order does not compile.

pub mod base_config;
pub mod context;
pub mod outcome;
pub mod processor;
pub mod registry;
pub mod server;

pub use base_config::{BASE_CONFIG_FILE_NAME, BaseConfigModel, DEFAULT_MAX_PAYLOAD_BYTES};
pub use context::GenerationContext;
pub use outcome::{GenerationOutcome, ModelFailure, OutcomeSummary};
pub use processor::{
    Calculated, Fresh, Generated, GenerationProcessor, Validated, run_generation_phases,
};
pub use registry::{ModelRegistry, ModelStatus, RegisteredModel};
pub use server::{MAX_TARGET_ADDRESS, SERVER_CONFIG_SUFFIX, ServerModel};

use crate::error::GenerationError;
use crate::output::{OutputCollector, OutputPath};
use crate::report::ResultSink;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Lifecycle stage of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Calculate,
    BuildAndValidate,
    Generate,
    Clean,
}

/// The closed set of model kinds a run can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelKind {
    BaseConfig,
    Server,
}

/// One unit of generated output.
///
/// The processor only sees this capability; it never matches on the concrete type.
pub trait GenerationModel {
    fn kind(&self) -> ModelKind;

    /// Stable identifier used in reports, e.g. `server:ClusterA`
    fn id(&self) -> &str;

    /// Where the rendered document will be written
    fn output_path(&self) -> OutputPath;

    /// Derive and check data before rendering
    fn update_and_validate(&mut self, _sink: &mut dyn ResultSink) -> Result<(), GenerationError> {
        Ok(())
    }

    /// Render the document and hand it to `collector`. Pure, no I/O.
    fn generate(
        &self,
        sink: &mut dyn ResultSink,
        collector: &mut OutputCollector,
    ) -> Result<(), GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Calculate.to_string(), "calculate");
        assert_eq!(Phase::BuildAndValidate.as_ref(), "build_and_validate");
        assert_eq!(ModelKind::BaseConfig.to_string(), "base_config");
    }
}
