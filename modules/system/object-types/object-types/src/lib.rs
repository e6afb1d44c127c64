//! Object Types Module Implementation
//!
//! This module keeps the metadata of every object type known to the platform
//! and computes the dependency-safe order in which transfer workflows
//! (export, staging, continuous integration) process them.
//! The public API is defined in `object-types-sdk` and re-exported here.
//!
//! ## Architecture
//!
//! - **Two-phase registry**: startup registration → one-time freeze into an immutable catalog
//! - **Lazy sequencing**: a stoppable iterator over an explicit depth-first frame stack
//! - **Entity fallback**: dynamically-named types resolve through an `EntityProvider`

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === PUBLIC API (from SDK) ===
pub use object_types_sdk::{
    DependencyKind, EntityProvider, IncludedTypesFilter, ObjectDependency, ObjectEntity,
    ObjectTypesApi, ObjectTypesError, OutputItem, Relationship, TypeCapability, TypeDescriptor,
    TypeFilter, WellKnownTypes,
};

// === CONFIGURATION ===
pub mod config;
pub use config::{ConfigError, ObjectTypesConfig};

// === LOCAL CLIENT ===
pub mod local_client;
pub use local_client::ObjectTypesLocalClient;

pub mod domain;
pub use domain::{Sequence, SequenceAnalyzer, TypeCatalog, TypeRegistry};

#[doc(hidden)]
pub mod infra;
pub use infra::TemplateEntityProvider;
