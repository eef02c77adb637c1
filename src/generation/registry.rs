use super::{GenerationModel, ModelKind};
use std::fmt;

/// Where a registered model stands within the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Registered,
    Validated,
    /// Failed BuildAndValidate; its generate step is skipped
    Rejected,
    Generated,
    /// Failed Generate
    Failed,
}

/// A model plus its lifecycle status
pub struct RegisteredModel {
    model: Box<dyn GenerationModel>,
    status: ModelStatus,
}

impl RegisteredModel {
    pub fn model(&self) -> &dyn GenerationModel {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> &mut dyn GenerationModel {
        self.model.as_mut()
    }

    pub fn status(&self) -> ModelStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ModelStatus) {
        self.status = status;
    }
}

impl fmt::Debug for RegisteredModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredModel")
            .field("id", &self.model.id())
            .field("kind", &self.model.kind())
            .field("status", &self.status)
            .finish()
    }
}

/// Models of a single run, in registration order
#[derive(Debug, Default)]
pub struct ModelRegistry {
    entries: Vec<RegisteredModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model and return its position
    pub fn register(&mut self, model: Box<dyn GenerationModel>) -> usize {
        tracing::debug!(model = model.id(), kind = %model.kind(), "registered model");
        self.entries.push(RegisteredModel {
            model,
            status: ModelStatus::Registered,
        });
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&RegisteredModel> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut RegisteredModel> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredModel> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RegisteredModel> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_kind(&self, kind: ModelKind) -> usize {
        self.entries
            .iter()
            .filter(|e| e.model.kind() == kind)
            .count()
    }

    pub fn count_status(&self, status: ModelStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Drop every model
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
