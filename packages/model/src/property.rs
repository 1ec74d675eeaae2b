//! Properties owned by instances.

use crate::object::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

slotmap::new_key_type! {
    /// Stable handle to a property in a document arena.
    pub struct PropertyId;
}

/// Property name scoped to its declaring type.
///
/// Attached properties (layout constraints and the like) belong to the
/// parent container type rather than to the instance carrying them, so
/// `GridPane.rowIndex` on a `Button` has residence `GridPane`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PropertyName {
    residence: Option<String>,
    name: String,
}

impl PropertyName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            residence: None,
            name: name.into(),
        }
    }

    /// Static property declared by `residence`
    pub fn attached(residence: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            residence: Some(residence.into()),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn residence(&self) -> Option<&str> {
        self.residence.as_deref()
    }

    pub fn is_attached(&self) -> bool {
        self.residence.is_some()
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.residence {
            Some(residence) => write!(f, "{}.{}", residence, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for PropertyName {
    /// `"GridPane.rowIndex"` parses as an attached property
    fn from(value: &str) -> Self {
        match value.rsplit_once('.') {
            Some((residence, name)) if !residence.is_empty() && !name.is_empty() => {
                PropertyName::attached(residence, name)
            }
            _ => PropertyName::new(value),
        }
    }
}

impl From<String> for PropertyName {
    fn from(value: String) -> Self {
        PropertyName::from(value.as_str())
    }
}

impl From<PropertyName> for String {
    fn from(value: PropertyName) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// Single textual value, possibly an expression such as `$okButton`
    Text(String),
    /// Ordered object values
    Collection(Vec<ObjectId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FxomProperty {
    pub(crate) name: PropertyName,
    pub(crate) owner: Option<ObjectId>,
    pub(crate) kind: PropertyKind,
}

impl FxomProperty {
    pub fn name(&self) -> &PropertyName {
        &self.name
    }

    /// Instance listing this property, `None` while detached
    pub fn owner(&self) -> Option<ObjectId> {
        self.owner
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Text(value) => Some(value),
            PropertyKind::Collection(_) => None,
        }
    }

    pub fn values(&self) -> &[ObjectId] {
        match &self.kind {
            PropertyKind::Collection(values) => values,
            PropertyKind::Text(_) => &[],
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, PropertyKind::Text(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, PropertyKind::Collection(_))
    }

    pub(crate) fn values_mut(&mut self) -> Option<&mut Vec<ObjectId>> {
        match &mut self.kind {
            PropertyKind::Collection(values) => Some(values),
            PropertyKind::Text(_) => None,
        }
    }
}
