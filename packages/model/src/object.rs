//! Object variants stored in the document arena.

use crate::document::DocumentId;
use crate::property::PropertyId;
use crate::realize::Realized;
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Stable handle to an object in a document arena.
    pub struct ObjectId;
}

/// Placeholder subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntrinsicKind {
    /// Points at external markup through `source`
    Include,
    /// Denotes the object whose fx:id is `source`
    Reference,
    /// Denotes a copy of the object whose fx:id is `source`
    Copy,
}

impl IntrinsicKind {
    /// Markup tag of the placeholder
    pub fn tag(&self) -> &'static str {
        match self {
            IntrinsicKind::Include => "fx:include",
            IntrinsicKind::Reference => "fx:reference",
            IntrinsicKind::Copy => "fx:copy",
        }
    }

    /// Whether `source` names an fx:id inside the same document
    pub fn targets_fx_id(&self) -> bool {
        matches!(self, IntrinsicKind::Reference | IntrinsicKind::Copy)
    }
}

/// Where an object hangs in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParentLink {
    /// Value of a collection property
    Property(PropertyId),
    /// Item of a `Collection` or `Define` object
    Container(ObjectId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub type_name: String,
    pub fx_root: bool,
    pub fx_controller: Option<String>,
    pub(crate) properties: Vec<PropertyId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub type_name: String,
    pub(crate) items: Vec<ObjectId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Intrinsic {
    pub kind: IntrinsicKind,
    pub source: String,
    pub(crate) properties: Vec<PropertyId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub source: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Instance(Instance),
    Collection(Collection),
    Intrinsic(Intrinsic),
    Comment(String),
    Define(Vec<ObjectId>),
    Script(Script),
}

/// A node of the object model.
#[derive(Debug)]
pub struct FxomObject {
    pub(crate) owner: DocumentId,
    pub(crate) kind: ObjectKind,
    pub(crate) fx_id: Option<String>,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) realized: Option<Realized>,
}

impl FxomObject {
    pub(crate) fn new(owner: DocumentId, kind: ObjectKind) -> Self {
        Self {
            owner,
            kind,
            fx_id: None,
            parent: None,
            realized: None,
        }
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Document this object belongs to
    pub fn owner(&self) -> DocumentId {
        self.owner
    }

    pub fn fx_id(&self) -> Option<&str> {
        self.fx_id.as_deref()
    }

    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    /// Live representation, absent when unresolved
    pub fn realized(&self) -> Option<&Realized> {
        self.realized.as_ref()
    }

    pub fn is_unresolved(&self) -> bool {
        self.realized.is_none()
    }

    /// Declared type of instances and collections
    pub fn type_name(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Instance(instance) => Some(&instance.type_name),
            ObjectKind::Collection(collection) => Some(&collection.type_name),
            _ => None,
        }
    }

    /// Short label used in job descriptions and logs
    pub fn label(&self) -> String {
        match &self.kind {
            ObjectKind::Instance(instance) => instance.type_name.clone(),
            ObjectKind::Collection(collection) => collection.type_name.clone(),
            ObjectKind::Intrinsic(intrinsic) => intrinsic.kind.tag().to_string(),
            ObjectKind::Comment(_) => "comment".to_string(),
            ObjectKind::Define(_) => "fx:define".to_string(),
            ObjectKind::Script(_) => "fx:script".to_string(),
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match &self.kind {
            ObjectKind::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_intrinsic(&self) -> Option<&Intrinsic> {
        match &self.kind {
            ObjectKind::Intrinsic(intrinsic) => Some(intrinsic),
            _ => None,
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.kind, ObjectKind::Instance(_))
    }

    /// Whether this object may carry properties
    pub fn has_properties(&self) -> bool {
        matches!(self.kind, ObjectKind::Instance(_) | ObjectKind::Intrinsic(_))
    }

    /// Whether this object holds an ordered item list
    pub fn is_container(&self) -> bool {
        matches!(self.kind, ObjectKind::Collection(_) | ObjectKind::Define(_))
    }

    /// Whether this object may carry an fx:id
    pub fn accepts_fx_id(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::Instance(_) | ObjectKind::Collection(_) | ObjectKind::Intrinsic(_)
        )
    }

    pub fn properties(&self) -> &[PropertyId] {
        match &self.kind {
            ObjectKind::Instance(instance) => &instance.properties,
            ObjectKind::Intrinsic(intrinsic) => &intrinsic.properties,
            _ => &[],
        }
    }

    pub fn items(&self) -> &[ObjectId] {
        match &self.kind {
            ObjectKind::Collection(collection) => &collection.items,
            ObjectKind::Define(items) => items,
            _ => &[],
        }
    }

    pub(crate) fn properties_mut(&mut self) -> Option<&mut Vec<PropertyId>> {
        match &mut self.kind {
            ObjectKind::Instance(instance) => Some(&mut instance.properties),
            ObjectKind::Intrinsic(intrinsic) => Some(&mut intrinsic.properties),
            _ => None,
        }
    }

    pub(crate) fn items_mut(&mut self) -> Option<&mut Vec<ObjectId>> {
        match &mut self.kind {
            ObjectKind::Collection(collection) => Some(&mut collection.items),
            ObjectKind::Define(items) => Some(items),
            _ => None,
        }
    }
}
