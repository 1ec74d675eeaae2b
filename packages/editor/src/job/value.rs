use super::JobOp;
use crate::state::EditorState;
use fxom_model::{FxomDocument, ObjectId, ParentLink, PropertyId};

/// Whether `object` can be inserted somewhere: existing, parentless and not the root
fn is_free(document: &FxomDocument, object: ObjectId) -> bool {
    document.object(object).is_some_and(|o| o.parent().is_none())
        && document.root() != Some(object)
}

/// Adds a detached object to a collection property.
///
/// The property itself may still be detached; batches use this to fill a
/// new property before attaching it.
#[derive(Debug)]
pub struct AddPropertyValueJob {
    value: ObjectId,
    property: PropertyId,
    index: Option<usize>,
}

impl AddPropertyValueJob {
    pub fn new(value: ObjectId, property: PropertyId, index: Option<usize>) -> Self {
        Self {
            value,
            property,
            index,
        }
    }
}

impl JobOp for AddPropertyValueJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        let Some(property) = document.property(self.property) else {
            return false;
        };
        if !property.is_collection() || !is_free(document, self.value) {
            return false;
        }
        if let Some(owner) = property.owner() {
            if document.is_ancestor_or_self(self.value, owner) {
                return false;
            }
        }
        self.index.map_or(true, |index| index <= property.values().len())
    }

    fn execute(&mut self, state: &mut EditorState) {
        state.document.add_value(self.property, self.value, self.index);
    }

    fn undo(&mut self, state: &mut EditorState) {
        state.document.remove_from_parent(self.value);
    }

    fn description(&self) -> String {
        "Add Value".to_string()
    }
}

#[derive(Debug)]
pub struct RemovePropertyValueJob {
    value: ObjectId,
    removed: Option<(PropertyId, usize)>,
}

impl RemovePropertyValueJob {
    pub fn new(value: ObjectId) -> Self {
        Self {
            value,
            removed: None,
        }
    }
}

impl JobOp for RemovePropertyValueJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        state.document.parent_property(self.value).is_some()
    }

    fn execute(&mut self, state: &mut EditorState) {
        match state.document.remove_from_parent(self.value) {
            (ParentLink::Property(property), index) => self.removed = Some((property, index)),
            (link, _) => panic!("{:?} is not a property value (parent {:?})", self.value, link),
        }
    }

    fn undo(&mut self, state: &mut EditorState) {
        let (property, index) = self.removed.expect("undo before execute");
        state
            .document
            .insert_into(ParentLink::Property(property), self.value, index);
    }

    fn description(&self) -> String {
        "Remove Value".to_string()
    }
}

/// Adds a detached object to a `Collection` or `Define`
#[derive(Debug)]
pub struct AddCollectionItemJob {
    item: ObjectId,
    container: ObjectId,
    index: Option<usize>,
}

impl AddCollectionItemJob {
    pub fn new(item: ObjectId, container: ObjectId, index: Option<usize>) -> Self {
        Self {
            item,
            container,
            index,
        }
    }
}

impl JobOp for AddCollectionItemJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        let Some(container) = document.object(self.container) else {
            return false;
        };
        container.is_container()
            && is_free(document, self.item)
            && !document.is_ancestor_or_self(self.item, self.container)
            && self.index.map_or(true, |index| index <= container.items().len())
    }

    fn execute(&mut self, state: &mut EditorState) {
        state.document.add_item(self.container, self.item, self.index);
    }

    fn undo(&mut self, state: &mut EditorState) {
        state.document.remove_from_parent(self.item);
    }

    fn description(&self) -> String {
        "Add Item".to_string()
    }
}

#[derive(Debug)]
pub struct RemoveCollectionItemJob {
    item: ObjectId,
    removed: Option<(ObjectId, usize)>,
}

impl RemoveCollectionItemJob {
    pub fn new(item: ObjectId) -> Self {
        Self {
            item,
            removed: None,
        }
    }
}

impl JobOp for RemoveCollectionItemJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        matches!(
            state.document.parent_link(self.item),
            Some(ParentLink::Container(_))
        )
    }

    fn execute(&mut self, state: &mut EditorState) {
        match state.document.remove_from_parent(self.item) {
            (ParentLink::Container(container), index) => self.removed = Some((container, index)),
            (link, _) => panic!("{:?} is not a collection item (parent {:?})", self.item, link),
        }
    }

    fn undo(&mut self, state: &mut EditorState) {
        let (container, index) = self.removed.expect("undo before execute");
        state
            .document
            .insert_into(ParentLink::Container(container), self.item, index);
    }

    fn description(&self) -> String {
        "Remove Item".to_string()
    }
}
