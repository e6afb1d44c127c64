//! Frozen type catalog.
//!
//! `TypeCatalog` is the immutable snapshot produced by
//! [`TypeRegistry::ensure_all`](super::registry::TypeRegistry::ensure_all).
//! Building it completes every descriptor's relationship fields in place:
//!
//! 1. composite membership (`component_types`),
//! 2. extensions: each declared extension becomes a dependency of the extended
//!    type and of every composite above it,
//! 3. parent linking: each type is pushed into the child / binding /
//!    other-binding set of its declared parents.
//!
//! Phase 3 reads binding-kind dependencies, so phase 2 must be complete for
//! all types before it starts.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use object_types_sdk::{
    DependencyKind, EntityProvider, ObjectDependency, Relationship, TypeDescriptor, TypeKey,
    WellKnownTypes,
};
use tracing::{debug, info};

use super::error::DomainError;

/// Immutable, fully linked set of registered object types.
pub struct TypeCatalog {
    descriptors: IndexMap<TypeKey, Arc<TypeDescriptor>>,
    backing_types: HashMap<TypeKey, String>,
    well_known: WellKnownTypes,
    entity_provider: Option<Arc<dyn EntityProvider>>,
    all_types: OnceLock<Vec<String>>,
    binding_types: OnceLock<Vec<String>>,
    listing_types: OnceLock<Vec<String>>,
    main_types: OnceLock<Vec<String>>,
    types_with_macros: OnceLock<Vec<String>>,
    types_with_dynamic_dependency: OnceLock<Vec<String>>,
    ci_enabled_types: OnceLock<Vec<String>>,
}

impl std::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("types", &self.descriptors.len())
            .field("well_known", &self.well_known)
            .field("has_entity_provider", &self.entity_provider.is_some())
            .finish_non_exhaustive()
    }
}

/// A registered descriptor together with its backing implementation name.
#[derive(Debug, Clone)]
pub struct Registration {
    pub descriptor: Arc<TypeDescriptor>,
    pub backing_type: String,
}

impl TypeCatalog {
    /// Links the registered descriptors and freezes them.
    pub(crate) fn build(
        registrations: &IndexMap<TypeKey, Registration>,
        well_known: WellKnownTypes,
        entity_provider: Option<Arc<dyn EntityProvider>>,
    ) -> Self {
        let mut working: IndexMap<TypeKey, TypeDescriptor> = registrations
            .iter()
            .map(|(key, reg)| (key.clone(), (*reg.descriptor).clone()))
            .collect();

        link_composites(&mut working);
        apply_extensions(&mut working, entity_provider.as_deref());
        link_parents(&mut working, &well_known);

        let backing_types = registrations
            .iter()
            .map(|(key, reg)| (key.clone(), reg.backing_type.clone()))
            .collect();
        let descriptors = working
            .into_iter()
            .map(|(key, descriptor)| (key, Arc::new(descriptor)))
            .collect::<IndexMap<_, _>>();

        info!(types = descriptors.len(), "Object type catalog frozen");

        Self {
            descriptors,
            backing_types,
            well_known,
            entity_provider,
            all_types: OnceLock::new(),
            binding_types: OnceLock::new(),
            listing_types: OnceLock::new(),
            main_types: OnceLock::new(),
            types_with_macros: OnceLock::new(),
            types_with_dynamic_dependency: OnceLock::new(),
            ci_enabled_types: OnceLock::new(),
        }
    }

    /// Returns the registered descriptor for `key`, without provider fallback.
    #[must_use]
    pub fn registered(&self, key: &TypeKey) -> Option<&Arc<TypeDescriptor>> {
        self.descriptors.get(key)
    }

    /// Resolves a descriptor by name, falling back to the entity provider for
    /// types that are not registered.
    #[must_use]
    pub fn get_descriptor(&self, object_type: &str) -> Option<Arc<TypeDescriptor>> {
        if let Some(descriptor) = self.descriptors.get(&TypeKey::new(object_type)) {
            return Some(Arc::clone(descriptor));
        }
        provider_descriptor(self.entity_provider.as_deref(), object_type)
    }

    /// Resolves a descriptor by name, failing when it is unknown.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if neither the catalog nor the entity
    /// provider knows the type.
    pub fn require_descriptor(&self, object_type: &str) -> Result<Arc<TypeDescriptor>, DomainError> {
        self.get_descriptor(object_type)
            .ok_or_else(|| DomainError::not_found(object_type))
    }

    /// Returns the backing implementation name of a registered type.
    #[must_use]
    pub fn backing_type(&self, object_type: &str) -> Option<&str> {
        self.backing_types
            .get(&TypeKey::new(object_type))
            .map(String::as_str)
    }

    #[must_use]
    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterates registered descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.descriptors.values()
    }

    /// All registered type names, in registration order.
    #[must_use]
    pub fn all_types(&self) -> &[String] {
        self.view(&self.all_types, |_| true)
    }

    #[must_use]
    pub fn binding_types(&self) -> &[String] {
        self.view(&self.binding_types, TypeDescriptor::is_binding)
    }

    #[must_use]
    pub fn listing_types(&self) -> &[String] {
        self.view(&self.listing_types, TypeDescriptor::is_listing_type)
    }

    /// Types that are neither bindings, children nor components of a composite.
    #[must_use]
    pub fn main_types(&self) -> &[String] {
        self.view(&self.main_types, |d| {
            !d.is_binding() && !d.has_parent() && d.composite_type.is_none()
        })
    }

    #[must_use]
    pub fn types_with_macros(&self) -> &[String] {
        self.view(&self.types_with_macros, TypeDescriptor::has_macros)
    }

    #[must_use]
    pub fn types_with_dynamic_dependency(&self) -> &[String] {
        self.view(
            &self.types_with_dynamic_dependency,
            TypeDescriptor::has_dynamic_dependency,
        )
    }

    #[must_use]
    pub fn ci_enabled_types(&self) -> &[String] {
        self.view(&self.ci_enabled_types, TypeDescriptor::is_ci_enabled)
    }

    fn view<'a>(
        &'a self,
        cell: &'a OnceLock<Vec<String>>,
        predicate: impl Fn(&TypeDescriptor) -> bool,
    ) -> &'a [String] {
        cell.get_or_init(|| {
            self.descriptors
                .values()
                .filter(|d| predicate(d))
                .map(|d| d.object_type.clone())
                .collect()
        })
    }
}

/// Reads the descriptor off a read-only entity instance.
pub(crate) fn provider_descriptor(
    provider: Option<&dyn EntityProvider>,
    object_type: &str,
) -> Option<Arc<TypeDescriptor>> {
    let entity = provider?.read_only_instance(object_type)?;
    Some(entity.type_descriptor())
}

fn link_composites(working: &mut IndexMap<TypeKey, TypeDescriptor>) {
    let memberships: Vec<(TypeKey, String)> = working
        .values()
        .filter_map(|d| {
            d.composite_type
                .as_deref()
                .map(|c| (TypeKey::new(c), d.object_type.clone()))
        })
        .collect();

    for (composite, component) in memberships {
        if let Some(owner) = working.get_mut(&composite) {
            owner.component_types.insert(component);
        } else {
            debug!(object_type = %component, composite = %composite, "Composite type is not registered, skipping");
        }
    }
}

fn apply_extensions(
    working: &mut IndexMap<TypeKey, TypeDescriptor>,
    provider: Option<&dyn EntityProvider>,
) {
    let mut edges: Vec<(TypeKey, ObjectDependency)> = Vec::new();

    for descriptor in working.values() {
        for extension in &descriptor.extends {
            let dependency = ObjectDependency::new(
                extension.column.clone(),
                descriptor.object_type.clone(),
                extension.kind,
            );
            let extended = TypeKey::new(&extension.extended_type);
            for composite in composite_chain(working, provider, &extension.extended_type) {
                edges.push((composite, dependency.clone()));
            }
            edges.push((extended, dependency));
        }
    }

    for (target, dependency) in edges {
        if let Some(descriptor) = working.get_mut(&target) {
            descriptor.add_dependency(dependency);
        } else {
            debug!(
                object_type = %dependency.target_type,
                extended = %target,
                "Extended type is not registered, skipping"
            );
        }
    }
}

/// Composite owners above `object_type`, nearest first.
fn composite_chain(
    working: &IndexMap<TypeKey, TypeDescriptor>,
    provider: Option<&dyn EntityProvider>,
    object_type: &str,
) -> Vec<TypeKey> {
    let mut chain = Vec::new();
    let mut seen = HashSet::from([TypeKey::new(object_type)]);

    let mut next = match working.get(&TypeKey::new(object_type)) {
        Some(descriptor) => descriptor.composite_type.clone(),
        None => provider_descriptor(provider, object_type).and_then(|d| d.composite_type.clone()),
    };

    while let Some(composite) = next {
        let key = TypeKey::new(&composite);
        if !seen.insert(key.clone()) {
            break;
        }
        next = working.get(&key).and_then(|d| d.composite_type.clone());
        chain.push(key);
    }
    chain
}

fn link_parents(working: &mut IndexMap<TypeKey, TypeDescriptor>, well_known: &WellKnownTypes) {
    let mut links: Vec<(TypeKey, Relationship, String)> = Vec::new();

    for descriptor in working.values() {
        let name = &descriptor.object_type;
        if let Some(declarations) = &descriptor.register_as {
            for declaration in declarations {
                links.push((
                    TypeKey::new(&declaration.target_type),
                    declaration.relationship,
                    name.clone(),
                ));
            }
            continue;
        }

        if let Some(parent) = &descriptor.parent_type {
            let relationship = if descriptor.is_binding() {
                Relationship::Binding
            } else {
                Relationship::Child
            };
            links.push((TypeKey::new(parent), relationship, name.clone()));
        }
        for dependency in &descriptor.dependencies {
            if dependency.kind == DependencyKind::Binding {
                links.push((
                    TypeKey::new(&dependency.target_type),
                    Relationship::OtherBinding,
                    name.clone(),
                ));
            }
        }
        if descriptor.is_site_binding() {
            links.push((
                TypeKey::new(&well_known.site),
                Relationship::OtherBinding,
                name.clone(),
            ));
        }
    }

    for (target, relationship, name) in links {
        if let Some(parent) = working.get_mut(&target) {
            parent.relationship_set_mut(relationship).insert(name);
        } else {
            debug!(object_type = %name, parent = %target, ?relationship, "Parent type is not registered, skipping");
        }
    }
}
