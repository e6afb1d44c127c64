//! Output-type selection for a sequencing run.

use std::collections::HashSet;

use crate::models::{TypeDescriptor, TypeKey};

/// Decides which object types a run emits and which children/bindings are
/// processed as part of their parent instead of standalone.
pub trait TypeFilter {
    /// Returns `true` if the type is emitted standalone.
    fn is_included_type(&self, descriptor: &TypeDescriptor) -> bool;

    /// Returns `true` if the child type folds into its parent's unit of work.
    fn is_child_included_to_parent(&self, _descriptor: &TypeDescriptor) -> bool {
        false
    }

    /// Returns `true` if the binding type folds into its parent's unit of work.
    fn is_binding_included_to_parent(&self, _descriptor: &TypeDescriptor) -> bool {
        false
    }
}

/// Baseline filter: includes an enumerated set of type names.
///
/// Folds nothing unless folded children/bindings are listed explicitly.
#[derive(Debug, Clone, Default)]
pub struct IncludedTypesFilter {
    included: HashSet<TypeKey>,
    folded_children: HashSet<TypeKey>,
    folded_bindings: HashSet<TypeKey>,
}

impl IncludedTypesFilter {
    #[must_use]
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            included: types.into_iter().map(|t| TypeKey::new(t.as_ref())).collect(),
            ..Self::default()
        }
    }

    /// Folds the given child types into their parents.
    #[must_use]
    pub fn with_folded_children<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.folded_children
            .extend(types.into_iter().map(|t| TypeKey::new(t.as_ref())));
        self
    }

    /// Folds the given binding types into their parents.
    #[must_use]
    pub fn with_folded_bindings<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.folded_bindings
            .extend(types.into_iter().map(|t| TypeKey::new(t.as_ref())));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.included.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }
}

impl TypeFilter for IncludedTypesFilter {
    fn is_included_type(&self, descriptor: &TypeDescriptor) -> bool {
        self.included.contains(&descriptor.key())
    }

    fn is_child_included_to_parent(&self, descriptor: &TypeDescriptor) -> bool {
        self.folded_children.contains(&descriptor.key())
    }

    fn is_binding_included_to_parent(&self, descriptor: &TypeDescriptor) -> bool {
        self.folded_bindings.contains(&descriptor.key())
    }
}
