use super::GenerationModel;
use super::registry::ModelRegistry;
use crate::source::SourceModel;

/// Per-run handle: the source model to query and the registry models are added to.
///
/// One context per run. Independent runs never share one.
pub struct GenerationContext<'m> {
    source: &'m dyn SourceModel,
    registry: ModelRegistry,
}

impl<'m> GenerationContext<'m> {
    pub fn new(source: &'m dyn SourceModel) -> Self {
        Self {
            source,
            registry: ModelRegistry::new(),
        }
    }

    pub fn source(&self) -> &'m dyn SourceModel {
        self.source
    }

    pub fn register(&mut self, model: Box<dyn GenerationModel>) -> usize {
        self.registry.register(model)
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModelRegistry {
        &mut self.registry
    }
}
