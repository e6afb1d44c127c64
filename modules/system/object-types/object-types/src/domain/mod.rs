//! Domain layer for the Object Types module.
//!
//! Contains the registry, the frozen catalog, sequencing and error types.

pub mod catalog;
pub mod error;
pub mod registry;
pub mod sequence;

pub use catalog::TypeCatalog;
pub use error::DomainError;
pub use registry::TypeRegistry;
pub use sequence::{Sequence, SequenceAnalyzer};
