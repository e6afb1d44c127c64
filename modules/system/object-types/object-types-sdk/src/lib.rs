//! Object Types SDK
//!
//! This crate provides the public contract for the `object-types` module:
//! - `TypeDescriptor` and its relationship/capability model
//! - `TypeFilter` for selecting the output types of a transfer run
//! - `EntityProvider` for resolving dynamically-named object types
//! - `OutputItem`, the unit emitted by a dependency-ordered sequence
//! - `ObjectTypesApi` trait for in-process consumers
//! - `ObjectTypesError` for error handling
//!
//! ## Usage
//!
//! ```ignore
//! use object_types_sdk::{IncludedTypesFilter, ObjectTypesApi};
//!
//! let filter = IncludedTypesFilter::new(["cms.site", "cms.page"]);
//! for item in client.sequence(None, &filter)? {
//!     export(&item.object_type, item.is_site_object)?;
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod error;
pub mod filter;
pub mod models;
pub mod provider;

// Re-export main types at crate root for convenience
pub use api::ObjectTypesApi;
pub use error::ObjectTypesError;
pub use filter::{IncludedTypesFilter, TypeFilter};
pub use models::{
    DependencyKind, ObjectDependency, OutputItem, RegisterAs, Relationship, TypeCapability,
    TypeDescriptor, TypeExtension, TypeKey, WellKnownTypes,
};
pub use provider::{EntityProvider, ObjectEntity};
