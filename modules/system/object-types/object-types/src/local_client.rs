//! Local client implementing the `ObjectTypesApi` trait.

use std::sync::Arc;

use object_types_sdk::{ObjectTypesApi, ObjectTypesError, OutputItem, TypeDescriptor, TypeFilter};
use tracing::debug;

use crate::domain::registry::TypeRegistry;
use crate::domain::sequence::SequenceAnalyzer;

/// Local client for the Object Types module.
///
/// Freezes the registry on first use and runs each request over the frozen
/// catalog.
pub struct ObjectTypesLocalClient {
    registry: Arc<TypeRegistry>,
}

impl ObjectTypesLocalClient {
    /// Creates a new local client over the given registry.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }
}

impl ObjectTypesApi for ObjectTypesLocalClient {
    fn descriptor(&self, object_type: &str) -> Result<Arc<TypeDescriptor>, ObjectTypesError> {
        let catalog = self.registry.ensure_all()?;
        Ok(catalog.require_descriptor(object_type)?)
    }

    fn output_types(
        &self,
        requested: Option<&[String]>,
        filter: &dyn TypeFilter,
    ) -> Result<Vec<String>, ObjectTypesError> {
        let catalog = self.registry.ensure_all()?;
        let analyzer = match requested {
            Some(types) => SequenceAnalyzer::with_types(&catalog, filter, types),
            None => SequenceAnalyzer::new(&catalog, filter),
        };
        Ok(analyzer.output_type_names().map(str::to_owned).collect())
    }

    fn sequence(
        &self,
        requested: Option<&[String]>,
        filter: &dyn TypeFilter,
    ) -> Result<Vec<OutputItem>, ObjectTypesError> {
        let catalog = self.registry.ensure_all()?;
        let analyzer = match requested {
            Some(types) => SequenceAnalyzer::with_types(&catalog, filter, types),
            None => SequenceAnalyzer::new(&catalog, filter),
        };
        let items: Vec<OutputItem> = analyzer.sequence().collect();
        debug!(items = items.len(), "Object type sequence computed");
        Ok(items)
    }
}
