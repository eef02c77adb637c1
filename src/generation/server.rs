use super::{GenerationModel, ModelKind};
use crate::error::GenerationError;
use crate::extract::{NO_PHYSICAL_ADDRESS, SoftwareCluster};
use crate::guards::validate_file_name_safe;
use crate::output::{OutputCollector, OutputPath, ROOT_SUB_FOLDER};
use crate::report::{ResultSink, ValidationIssue};
use serde_json::json;

pub const SERVER_CONFIG_SUFFIX: &str = "_config.json";

/// The runtime reads `TargetAddress` as an unsigned 16-bit value
pub const MAX_TARGET_ADDRESS: i64 = u16::MAX as i64;

/// Per-cluster diagnostic server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerModel {
    id: String,
    cluster: SoftwareCluster,
    /// Set by `update_and_validate`; `None` means the model is not ready to render
    target_address: Option<i64>,
}

impl ServerModel {
    pub fn new(cluster: SoftwareCluster) -> Self {
        Self {
            id: format!("server:{}", cluster.name()),
            cluster,
            target_address: None,
        }
    }

    pub fn cluster(&self) -> &SoftwareCluster {
        &self.cluster
    }

    pub fn target_address(&self) -> Option<i64> {
        self.target_address
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.cluster.name(), SERVER_CONFIG_SUFFIX)
    }
}

impl GenerationModel for ServerModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Server
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn output_path(&self) -> OutputPath {
        OutputPath::new(ROOT_SUB_FOLDER, self.file_name())
    }

    fn update_and_validate(&mut self, sink: &mut dyn ResultSink) -> Result<(), GenerationError> {
        if self.cluster.name().trim().is_empty() {
            return Err(GenerationError::validation(
                &self.id,
                "software cluster name is empty",
            ));
        }

        let file_name = self.file_name();
        validate_file_name_safe(&file_name)
            .map_err(|e| GenerationError::validation(&self.id, e.to_string()))?;

        let address = self.cluster.physical_address();
        if address == NO_PHYSICAL_ADDRESS {
            sink.report(
                ValidationIssue::warning(
                    format!(
                        "software cluster '{}' has no physical diagnostic address, TargetAddress is -1",
                        self.cluster.name()
                    ),
                    Some(self.id.clone()),
                )
                .with_suggestion("Add a DoIP physical address to the cluster's diagnostic addresses"),
            );
        } else if !(0..=MAX_TARGET_ADDRESS).contains(&address) {
            return Err(GenerationError::validation(
                &self.id,
                format!("physical address {address} is outside 0..={MAX_TARGET_ADDRESS}"),
            ));
        }

        self.target_address = Some(address);
        Ok(())
    }

    fn generate(
        &self,
        _sink: &mut dyn ResultSink,
        collector: &mut OutputCollector,
    ) -> Result<(), GenerationError> {
        let Some(target_address) = self.target_address else {
            return Err(GenerationError::rendering(
                &self.id,
                "target address was never derived, the model has not been validated",
            ));
        };

        tracing::debug!(
            model = %self.id,
            target_address,
            contribution = ?self.cluster.diagnostic_contribution(),
            "rendering server config"
        );
        collector.add(
            json!({ "TargetAddress": target_address }),
            self.file_name(),
            ROOT_SUB_FOLDER,
        );
        Ok(())
    }
}
