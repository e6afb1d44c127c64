//! Entity fallback for object types that are not registered up front.
//!
//! Some object types are named at runtime (for example one type per content
//! class). Their descriptors are read off a read-only entity instance obtained
//! from an `EntityProvider`.

use std::sync::Arc;

use crate::models::TypeDescriptor;

/// A read-only entity instance exposing the descriptor of its type.
pub trait ObjectEntity: Send + Sync {
    fn type_descriptor(&self) -> Arc<TypeDescriptor>;
}

/// Generic provider of read-only entity instances by object type name.
pub trait EntityProvider: Send + Sync {
    /// Returns a read-only instance for `object_type`, or `None` if the
    /// provider does not know the type.
    fn read_only_instance(&self, object_type: &str) -> Option<Arc<dyn ObjectEntity>>;
}
