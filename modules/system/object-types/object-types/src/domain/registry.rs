//! Object type registry.
//!
//! The registry has two phases:
//! - **Registration**: startup code registers every type (last write wins).
//! - **Frozen**: `ensure_all` links all descriptors once and publishes an
//!   immutable [`TypeCatalog`]; further registrations are rejected.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use object_types_sdk::{EntityProvider, TypeDescriptor, TypeKey, WellKnownTypes};
use parking_lot::{ReentrantMutex, RwLock};
use tracing::{debug, info};

use super::catalog::{Registration, TypeCatalog, provider_descriptor};
use super::error::DomainError;
use crate::config::ObjectTypesConfig;
use crate::infra::TemplateEntityProvider;

/// Process-wide catalog of object type descriptors.
///
/// Owned by the application context and shared by handle (`Arc<TypeRegistry>`).
pub struct TypeRegistry {
    registrations: RwLock<IndexMap<TypeKey, Registration>>,
    well_known: WellKnownTypes,
    entity_provider: Option<Arc<dyn EntityProvider>>,
    pre_initialized: AtomicBool,
    /// Held while the catalog is built; the flag is set by the building thread.
    ensure_guard: ReentrantMutex<Cell<bool>>,
    catalog: OnceLock<Arc<TypeCatalog>>,
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.len())
            .field("pre_initialized", &self.is_pre_initialized())
            .field("ensured", &self.is_ensured())
            .finish_non_exhaustive()
    }
}

impl TypeRegistry {
    #[must_use]
    pub fn new(well_known: WellKnownTypes) -> Self {
        Self {
            registrations: RwLock::new(IndexMap::new()),
            well_known,
            entity_provider: None,
            pre_initialized: AtomicBool::new(false),
            ensure_guard: ReentrantMutex::new(Cell::new(false)),
            catalog: OnceLock::new(),
        }
    }

    /// Sets the fallback provider used for names that are not registered.
    #[must_use]
    pub fn with_entity_provider(mut self, provider: Arc<dyn EntityProvider>) -> Self {
        self.entity_provider = Some(provider);
        self
    }

    /// Builds a registry from a startup registration list and marks it
    /// pre-initialized.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRegistration` for the first entry that is
    /// missing its name, backing type or descriptor.
    pub fn from_config(config: &ObjectTypesConfig) -> Result<Self, DomainError> {
        let mut registry = Self::new(config.well_known.clone());
        if !config.dynamic_types.is_empty() {
            registry = registry.with_entity_provider(Arc::new(TemplateEntityProvider::from_config(
                &config.dynamic_types,
            )));
        }

        for entry in &config.registrations {
            let descriptor = entry.descriptor.clone().ok_or_else(|| {
                DomainError::invalid_registration(format!(
                    "object type '{}' has no descriptor",
                    entry.name
                ))
            })?;
            registry.register(&entry.name, descriptor, &entry.backing_type)?;
        }

        registry.mark_pre_initialized();
        Ok(registry)
    }

    /// Registers (or replaces) an object type.
    ///
    /// # Errors
    ///
    /// - `InvalidRegistration` if the name or backing type is blank, or the
    ///   descriptor names a different object type
    /// - `RegistrationClosed` if the catalog has already been frozen
    pub fn register(
        &self,
        name: &str,
        mut descriptor: TypeDescriptor,
        backing_type: &str,
    ) -> Result<(), DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_registration("object type name is empty"));
        }
        if backing_type.trim().is_empty() {
            return Err(DomainError::invalid_registration(format!(
                "object type '{name}' has no backing type"
            )));
        }
        if descriptor.object_type.is_empty() {
            name.clone_into(&mut descriptor.object_type);
        } else if !descriptor.object_type.eq_ignore_ascii_case(name) {
            return Err(DomainError::invalid_registration(format!(
                "descriptor of '{name}' declares object type '{}'",
                descriptor.object_type
            )));
        }

        let mut registrations = self.registrations.write();
        if self.catalog.get().is_some() {
            return Err(DomainError::registration_closed(name));
        }

        let key = TypeKey::new(name);
        let registration = Registration {
            descriptor: Arc::new(descriptor),
            backing_type: backing_type.trim().to_owned(),
        };
        if let Some(previous) = registrations.insert(key, registration) {
            debug!(
                object_type = %name,
                previous_backing_type = %previous.backing_type,
                backing_type = %backing_type,
                "Object type re-registered, overriding previous descriptor"
            );
        }
        Ok(())
    }

    /// Marks startup registration as complete; `ensure_all` is allowed afterwards.
    pub fn mark_pre_initialized(&self) {
        if !self.pre_initialized.swap(true, Ordering::AcqRel) {
            info!(types = self.len(), "Object type registration complete");
        }
    }

    #[must_use]
    pub fn is_pre_initialized(&self) -> bool {
        self.pre_initialized.load(Ordering::Acquire)
    }

    /// Returns `true` once the catalog has been frozen.
    #[must_use]
    pub fn is_ensured(&self) -> bool {
        self.catalog.get().is_some()
    }

    #[must_use]
    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.read_recursive().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Links all registered descriptors and freezes them into a catalog.
    ///
    /// Idempotent: every call after the first returns the same snapshot.
    /// Concurrent callers block until the single builder has finished.
    ///
    /// # Errors
    ///
    /// - `NotPreInitialized` if called before [`Self::mark_pre_initialized`]
    /// - `ReentrantEnsure` if called again by the thread that is building
    pub fn ensure_all(&self) -> Result<Arc<TypeCatalog>, DomainError> {
        if let Some(catalog) = self.catalog.get() {
            return Ok(Arc::clone(catalog));
        }
        if !self.is_pre_initialized() {
            return Err(DomainError::NotPreInitialized);
        }

        let building = self.ensure_guard.lock();
        if building.get() {
            return Err(DomainError::ReentrantEnsure);
        }
        if let Some(catalog) = self.catalog.get() {
            return Ok(Arc::clone(catalog));
        }

        building.set(true);
        let _reset = ResetOnDrop(&building);

        // Writers block until the catalog is published.
        let registrations = self.registrations.read_recursive();
        let catalog = Arc::new(TypeCatalog::build(
            &registrations,
            self.well_known.clone(),
            self.entity_provider.clone(),
        ));
        Ok(Arc::clone(self.catalog.get_or_init(|| catalog)))
    }

    /// Resolves a descriptor by name, falling back to the entity provider.
    ///
    /// Before the catalog is frozen this returns descriptors as registered,
    /// without derived relationship sets.
    #[must_use]
    pub fn get_descriptor(&self, object_type: &str) -> Option<Arc<TypeDescriptor>> {
        if let Some(catalog) = self.catalog.get() {
            return catalog.get_descriptor(object_type);
        }
        let registered = self
            .registrations
            .read_recursive()
            .get(&TypeKey::new(object_type))
            .map(|r| Arc::clone(&r.descriptor));
        registered.or_else(|| provider_descriptor(self.entity_provider.as_deref(), object_type))
    }

    /// Resolves a descriptor by name, failing when it is unknown.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the type is neither registered nor
    /// known to the entity provider.
    pub fn require_descriptor(&self, object_type: &str) -> Result<Arc<TypeDescriptor>, DomainError> {
        self.get_descriptor(object_type)
            .ok_or_else(|| DomainError::not_found(object_type))
    }

    /// Returns the backing implementation name of a registered type.
    #[must_use]
    pub fn backing_type(&self, object_type: &str) -> Option<String> {
        self.registrations
            .read_recursive()
            .get(&TypeKey::new(object_type))
            .map(|r| r.backing_type.clone())
    }
}

struct ResetOnDrop<'a>(&'a Cell<bool>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
