//! `ObjectTypesApi` trait definition.
//!
//! This trait defines the in-process API of the `object-types` module. All
//! operations are synchronous: they run over metadata already resident in
//! memory and perform no I/O.

use std::sync::Arc;

use crate::error::ObjectTypesError;
use crate::filter::TypeFilter;
use crate::models::{OutputItem, TypeDescriptor};

/// Public API trait for the `object-types` module.
///
/// Export, staging and continuous-integration workflows use it to learn the
/// order in which object types must be written:
/// ```ignore
/// let items = client.sequence(Some(&requested), &filter)?;
/// ```
pub trait ObjectTypesApi: Send + Sync {
    /// Retrieve the descriptor of an object type.
    ///
    /// # Errors
    ///
    /// * `NotFound` - If the type is neither registered nor known to the entity provider
    /// * `NotPreInitialized` - If startup registration has not completed
    fn descriptor(&self, object_type: &str) -> Result<Arc<TypeDescriptor>, ObjectTypesError>;

    /// Names of the types the filter selects for standalone output, in
    /// processing tie-break order.
    ///
    /// `requested` restricts the available types; `None` means all registered types.
    ///
    /// # Errors
    ///
    /// * `NotPreInitialized` - If startup registration has not completed
    fn output_types(
        &self,
        requested: Option<&[String]>,
        filter: &dyn TypeFilter,
    ) -> Result<Vec<String>, ObjectTypesError>;

    /// Produce the dependency-ordered output items for the requested types.
    ///
    /// `requested` restricts the available types; `None` means all registered types.
    ///
    /// # Errors
    ///
    /// * `NotPreInitialized` - If startup registration has not completed
    /// * `ReentrantEnsure` - If called while the catalog is being built
    fn sequence(
        &self,
        requested: Option<&[String]>,
        filter: &dyn TypeFilter,
    ) -> Result<Vec<OutputItem>, ObjectTypesError>;
}
