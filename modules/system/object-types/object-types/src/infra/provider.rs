//! In-memory entity provider for dynamically-named object types.

use std::sync::Arc;

use object_types_sdk::{EntityProvider, ObjectEntity, TypeDescriptor};
use tracing::trace;

use crate::config::DynamicTypeTemplate;

/// Synthesizes descriptors for names matching a registered prefix.
///
/// The first matching template wins; the produced descriptor carries the
/// requested name as its object type.
#[derive(Debug, Clone, Default)]
pub struct TemplateEntityProvider {
    templates: Vec<(String, TypeDescriptor)>,
}

impl TemplateEntityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(templates: &[DynamicTypeTemplate]) -> Self {
        templates.iter().fold(Self::new(), |provider, t| {
            provider.with_template(&t.prefix, t.descriptor.clone())
        })
    }

    /// Adds a template for names starting with `prefix` (case-insensitive).
    #[must_use]
    pub fn with_template(mut self, prefix: &str, descriptor: TypeDescriptor) -> Self {
        self.templates.push((prefix.to_ascii_lowercase(), descriptor));
        self
    }

    fn template_for(&self, object_type: &str) -> Option<&TypeDescriptor> {
        let name = object_type.to_ascii_lowercase();
        self.templates
            .iter()
            .find(|(prefix, _)| name.len() > prefix.len() && name.starts_with(prefix.as_str()))
            .map(|(_, descriptor)| descriptor)
    }
}

impl EntityProvider for TemplateEntityProvider {
    fn read_only_instance(&self, object_type: &str) -> Option<Arc<dyn ObjectEntity>> {
        let template = self.template_for(object_type)?;
        trace!(object_type = %object_type, "Synthesizing descriptor from template");
        let descriptor = TypeDescriptor {
            object_type: object_type.to_owned(),
            ..template.clone()
        };
        Some(Arc::new(TemplateEntity {
            descriptor: Arc::new(descriptor),
        }))
    }
}

/// Read-only entity produced by [`TemplateEntityProvider`].
#[derive(Debug)]
struct TemplateEntity {
    descriptor: Arc<TypeDescriptor>,
}

impl ObjectEntity for TemplateEntity {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        Arc::clone(&self.descriptor)
    }
}
