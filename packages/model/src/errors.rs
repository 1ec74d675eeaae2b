//! Error types for the object model

use crate::{ObjectId, PropertyId};
use thiserror::Error;

/// Structural problems found in a document.
///
/// Editing primitives panic on misuse; these errors come from lookups and
/// from the invariant checker, where the caller decides what a broken tree
/// means.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    #[error("Property not found: {0:?}")]
    PropertyNotFound(PropertyId),

    #[error("Root object {0:?} has a parent link")]
    RootHasParent(ObjectId),

    #[error("Object {0:?} is reachable more than once")]
    MultipleParents(ObjectId),

    #[error("Object {0:?} has a parent link that does not match its position")]
    ParentMismatch(ObjectId),

    #[error("Property {0:?} has an owner that does not list it")]
    PropertyOwnerMismatch(PropertyId),

    #[error("Property `{name}` appears twice on {object:?}")]
    DuplicateProperty { object: ObjectId, name: String },

    #[error("Object {0:?} belongs to another document")]
    ForeignObject(ObjectId),

    #[error("Duplicate fx:id: {0}")]
    DuplicateFxId(String),
}

/// Result alias used across the model
pub type ModelResult<T> = Result<T, ModelError>;
