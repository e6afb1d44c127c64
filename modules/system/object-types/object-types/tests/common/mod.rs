#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for object-types integration tests

use std::sync::Arc;

use object_types::{OutputItem, TypeCatalog, TypeDescriptor, TypeRegistry, WellKnownTypes};

/// Registers the descriptors (backing type `<name>Info`) and marks the
/// registry pre-initialized.
pub fn create_registry(descriptors: Vec<TypeDescriptor>) -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new(WellKnownTypes::default());
    for descriptor in descriptors {
        let name = descriptor.object_type.clone();
        registry
            .register(&name, descriptor, &format!("{name}Info"))
            .unwrap();
    }
    registry.mark_pre_initialized();
    Arc::new(registry)
}

pub fn create_catalog(descriptors: Vec<TypeDescriptor>) -> Arc<TypeCatalog> {
    create_registry(descriptors).ensure_all().unwrap()
}

pub fn names(items: &[OutputItem]) -> Vec<&str> {
    items.iter().map(|i| i.object_type.as_str()).collect()
}

/// Position of the first item of `object_type`.
pub fn position(items: &[OutputItem], object_type: &str) -> usize {
    items
        .iter()
        .position(|i| i.object_type.eq_ignore_ascii_case(object_type))
        .unwrap_or_else(|| panic!("{object_type} not in sequence"))
}
