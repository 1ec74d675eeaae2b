//! Realization boundary: live UI objects built from model nodes.

use crate::{FxomDocument, ObjectId};
use std::any::Any;
use std::fmt;

/// Live object an FXOM node maps to.
pub trait SceneObject: fmt::Debug {
    /// Concrete type the object was built as
    fn type_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Owned realized representation
pub type Realized = Box<dyn SceneObject>;

/// Builds realized representations.
///
/// Returning `None` leaves the node unresolved; the tree stays editable and
/// realization is retried on the next structural refresh.
pub trait Realizer: Send + Sync {
    fn realize(&self, document: &FxomDocument, object: ObjectId) -> Option<Realized>;
}
