//! Infrastructure layer for the Object Types module.
//!
//! Contains adapters for the entity fallback.

pub mod provider;

pub use provider::TemplateEntityProvider;
