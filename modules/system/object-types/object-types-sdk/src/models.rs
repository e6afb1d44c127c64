//! Public models for the `object-types` module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the type registry, the sequence analyzer and the transfer
//! workflows (export, staging, continuous integration) that consume them.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Case-insensitive lookup key for an object type name.
///
/// Names are folded to ASCII upper case, so ordering keys gives the
/// ordinal ignore-case order used as the deterministic tie-break when
/// iterating output types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Box<str>);

impl TypeKey {
    /// Creates a key for the given object type name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_ascii_uppercase().into_boxed_str())
    }

    /// Returns the folded form of the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `name` refers to the same object type as this key.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How strongly a dependency column binds its owner to the target type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// The target must exist before the owner can be written.
    #[default]
    Required,
    /// The owner is an association row between the target and another type.
    Binding,
}

/// A single dependency edge declared by a type: `column` references `target_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectDependency {
    /// Column of the owning type that holds the reference.
    pub column: String,
    /// Object type referenced by the column.
    pub target_type: String,
    /// Dependency kind.
    #[serde(default)]
    pub kind: DependencyKind,
}

impl ObjectDependency {
    #[must_use]
    pub fn new(
        column: impl Into<String>,
        target_type: impl Into<String>,
        kind: DependencyKind,
    ) -> Self {
        Self {
            column: column.into(),
            target_type: target_type.into(),
            kind,
        }
    }

    /// Returns `true` if this is a binding-kind dependency.
    #[must_use]
    pub const fn is_binding(&self) -> bool {
        matches!(self.kind, DependencyKind::Binding)
    }
}

/// Declares that the owning type adds `column` to the table of `extended_type`.
///
/// When the registry completes the graph, the extended type (and each composite
/// above it) receives a dependency on the declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeExtension {
    /// Type whose data is extended.
    pub extended_type: String,
    /// Column added to the extended type.
    pub column: String,
    #[serde(default)]
    pub kind: DependencyKind,
}

/// Relationship set of a parent type that a child can be registered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Child,
    Binding,
    OtherBinding,
}

/// Explicit "register as" declaration overriding the default parent linking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterAs {
    pub relationship: Relationship,
    pub target_type: String,
}

impl RegisterAs {
    #[must_use]
    pub fn new(relationship: Relationship, target_type: impl Into<String>) -> Self {
        Self {
            relationship,
            target_type: target_type.into(),
        }
    }
}

/// Capability flags of an object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCapability {
    /// Type has a listing (list-only) variant.
    ListingType,
    /// Type is a many-to-many association table.
    Binding,
    /// Type instances belong to a site.
    SiteObject,
    /// Type binds objects to sites.
    SiteBinding,
    /// Site type that also has global (site-less) instances.
    GlobalVariant,
    /// Type contains macros.
    Macros,
    /// Some dependency target is known only at runtime.
    DynamicDependency,
    /// Type takes part in continuous integration.
    ContinuousIntegration,
}

/// Per-type metadata.
///
/// Relationship sets (`child_types`, `binding_types`, `other_binding_types`,
/// `component_types`) are derived by the registry when it freezes its catalog;
/// callers normally leave them empty at registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TypeDescriptor {
    /// Object type name (case-insensitive, globally unique).
    pub object_type: String,
    pub parent_type: Option<String>,
    /// Aggregate owner whose data spans this type.
    pub composite_type: Option<String>,
    /// Ordered dependency edges.
    pub dependencies: Vec<ObjectDependency>,
    pub extends: Vec<TypeExtension>,
    /// Explicit parent declarations; `None` means default linking.
    pub register_as: Option<Vec<RegisterAs>>,
    pub capabilities: BTreeSet<TypeCapability>,
    pub child_types: IndexSet<String>,
    pub binding_types: IndexSet<String>,
    pub other_binding_types: IndexSet<String>,
    /// Inverse of `composite_type` ("consists of").
    pub component_types: IndexSet<String>,
}

impl TypeDescriptor {
    /// Creates an empty descriptor for the given object type.
    #[must_use]
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_type: impl Into<String>) -> Self {
        self.parent_type = Some(parent_type.into());
        self
    }

    #[must_use]
    pub fn with_composite(mut self, composite_type: impl Into<String>) -> Self {
        self.composite_type = Some(composite_type.into());
        self
    }

    #[must_use]
    pub fn with_dependency(
        mut self,
        column: impl Into<String>,
        target_type: impl Into<String>,
        kind: DependencyKind,
    ) -> Self {
        self.add_dependency(ObjectDependency::new(column, target_type, kind));
        self
    }

    #[must_use]
    pub fn with_extension(
        mut self,
        extended_type: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.extends.push(TypeExtension {
            extended_type: extended_type.into(),
            column: column.into(),
            kind: DependencyKind::Required,
        });
        self
    }

    #[must_use]
    pub fn with_register_as(mut self, relationship: Relationship, target: impl Into<String>) -> Self {
        self.register_as
            .get_or_insert_with(Vec::new)
            .push(RegisterAs::new(relationship, target));
        self
    }

    #[must_use]
    pub fn with_capability(mut self, capability: TypeCapability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Adds a dependency unless an identical one is already declared.
    ///
    /// Returns `true` if the dependency was added.
    pub fn add_dependency(&mut self, dependency: ObjectDependency) -> bool {
        if self.dependencies.contains(&dependency) {
            return false;
        }
        self.dependencies.push(dependency);
        true
    }

    /// Returns the relationship set backing `relationship`.
    pub fn relationship_set_mut(&mut self, relationship: Relationship) -> &mut IndexSet<String> {
        match relationship {
            Relationship::Child => &mut self.child_types,
            Relationship::Binding => &mut self.binding_types,
            Relationship::OtherBinding => &mut self.other_binding_types,
        }
    }

    /// Returns the lookup key of this descriptor.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        TypeKey::new(&self.object_type)
    }

    #[must_use]
    pub fn has_capability(&self, capability: TypeCapability) -> bool {
        self.capabilities.contains(&capability)
    }

    #[must_use]
    pub fn is_listing_type(&self) -> bool {
        self.has_capability(TypeCapability::ListingType)
    }

    #[must_use]
    pub fn is_binding(&self) -> bool {
        self.has_capability(TypeCapability::Binding)
    }

    #[must_use]
    pub fn is_site_object(&self) -> bool {
        self.has_capability(TypeCapability::SiteObject)
    }

    #[must_use]
    pub fn is_site_binding(&self) -> bool {
        self.has_capability(TypeCapability::SiteBinding)
    }

    #[must_use]
    pub fn supports_global_variant(&self) -> bool {
        self.has_capability(TypeCapability::GlobalVariant)
    }

    #[must_use]
    pub fn has_macros(&self) -> bool {
        self.has_capability(TypeCapability::Macros)
    }

    #[must_use]
    pub fn has_dynamic_dependency(&self) -> bool {
        self.has_capability(TypeCapability::DynamicDependency)
    }

    #[must_use]
    pub fn is_ci_enabled(&self) -> bool {
        self.has_capability(TypeCapability::ContinuousIntegration)
    }

    /// Returns `true` if the type declares a parent, either directly or through
    /// a child/binding `register_as` entry.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent_type.is_some()
            || self.register_as.as_ref().is_some_and(|decls| {
                decls
                    .iter()
                    .any(|d| !matches!(d.relationship, Relationship::OtherBinding))
            })
    }
}

/// Names of the built-in types the sequencing relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WellKnownTypes {
    /// The site type every site object depends on.
    pub site: String,
    /// Generic data class definitions (system root).
    pub data_class: String,
    /// Query definitions (system root).
    pub query: String,
}

impl Default for WellKnownTypes {
    fn default() -> Self {
        Self {
            site: "cms.site".to_owned(),
            data_class: "cms.class".to_owned(),
            query: "cms.query".to_owned(),
        }
    }
}

impl WellKnownTypes {
    /// System-root types, expanded before anything else.
    #[must_use]
    pub fn system_roots(&self) -> [&str; 2] {
        [&self.data_class, &self.query]
    }

    #[must_use]
    pub fn is_site(&self, object_type: &str) -> bool {
        self.site.eq_ignore_ascii_case(object_type)
    }
}

/// A unit emitted by a dependency-ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputItem {
    pub object_type: String,
    /// `false` for the global variant of a site type.
    pub is_site_object: bool,
    pub has_dynamic_dependency: bool,
}

impl OutputItem {
    #[must_use]
    pub fn new(object_type: impl Into<String>, is_site_object: bool, has_dynamic_dependency: bool) -> Self {
        Self {
            object_type: object_type.into(),
            is_site_object,
            has_dynamic_dependency,
        }
    }

    /// Expands a descriptor into its output items.
    ///
    /// A site type supporting a global variant yields the global item first,
    /// then the site-scoped one; every other descriptor yields one item.
    #[must_use]
    pub fn expand(descriptor: &TypeDescriptor, well_known: &WellKnownTypes) -> Vec<Self> {
        let dynamic = descriptor.has_dynamic_dependency();
        let site_like =
            descriptor.is_site_object() || well_known.is_site(&descriptor.object_type);

        if site_like && descriptor.supports_global_variant() {
            vec![
                Self::new(descriptor.object_type.clone(), false, dynamic),
                Self::new(descriptor.object_type.clone(), true, dynamic),
            ]
        } else {
            vec![Self::new(
                descriptor.object_type.clone(),
                descriptor.is_site_object(),
                dynamic,
            )]
        }
    }
}
