use super::{GenerationModel, ModelKind};
use crate::error::GenerationError;
use crate::output::{OutputCollector, OutputPath, ROOT_SUB_FOLDER};
use crate::report::ResultSink;
use serde_json::json;

pub const BASE_CONFIG_FILE_NAME: &str = "dm_base_config.json";

/// Largest payload, in bytes, the diagnostic manager logs per message
pub const DEFAULT_MAX_PAYLOAD_BYTES: u32 = 13;

/// Global diagnostic manager settings. Exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseConfigModel {
    max_payload_bytes: u32,
}

impl BaseConfigModel {
    pub fn new() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl Default for BaseConfigModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationModel for BaseConfigModel {
    fn kind(&self) -> ModelKind {
        ModelKind::BaseConfig
    }

    fn id(&self) -> &str {
        "base_config"
    }

    fn output_path(&self) -> OutputPath {
        OutputPath::new(ROOT_SUB_FOLDER, BASE_CONFIG_FILE_NAME)
    }

    fn generate(
        &self,
        _sink: &mut dyn ResultSink,
        collector: &mut OutputCollector,
    ) -> Result<(), GenerationError> {
        collector.add(
            json!({
                "LogOutput": {
                    "MaxPayloadBytes": self.max_payload_bytes
                }
            }),
            BASE_CONFIG_FILE_NAME,
            ROOT_SUB_FOLDER,
        );
        Ok(())
    }
}
