use super::JobOp;
use crate::state::EditorState;
use fxom_model::{FxomDocument, ObjectId, PropertyId};

fn can_attach(document: &FxomDocument, property: PropertyId, target: ObjectId, index: Option<usize>) -> bool {
    let (Some(prop), Some(object)) = (document.property(property), document.object(target)) else {
        return false;
    };
    if prop.owner().is_some() || !object.has_properties() {
        return false;
    }
    if document.find_property(target, prop.name()).is_some() {
        return false;
    }
    if prop.values().iter().any(|value| document.is_ancestor_or_self(*value, target)) {
        return false;
    }
    index.map_or(true, |index| index <= object.properties().len())
}

/// Attaches a detached property to an object
#[derive(Debug)]
pub struct AddPropertyJob {
    property: PropertyId,
    target: ObjectId,
    index: Option<usize>,
}

impl AddPropertyJob {
    pub fn new(property: PropertyId, target: ObjectId, index: Option<usize>) -> Self {
        Self {
            property,
            target,
            index,
        }
    }
}

impl JobOp for AddPropertyJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        can_attach(&state.document, self.property, self.target, self.index)
    }

    fn execute(&mut self, state: &mut EditorState) {
        state
            .document
            .add_property(self.target, self.property, self.index);
    }

    fn undo(&mut self, state: &mut EditorState) {
        state.document.remove_property(self.property);
    }

    fn description(&self) -> String {
        "Add Property".to_string()
    }
}

#[derive(Debug)]
pub struct RemovePropertyJob {
    property: PropertyId,
    removed: Option<(ObjectId, usize)>,
}

impl RemovePropertyJob {
    pub fn new(property: PropertyId) -> Self {
        Self {
            property,
            removed: None,
        }
    }
}

impl JobOp for RemovePropertyJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        state
            .document
            .property(self.property)
            .map_or(false, |p| p.owner().is_some())
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.removed = Some(state.document.remove_property(self.property));
    }

    fn undo(&mut self, state: &mut EditorState) {
        let (owner, index) = self.removed.expect("undo before execute");
        state.document.add_property(owner, self.property, Some(index));
    }

    fn description(&self) -> String {
        "Remove Property".to_string()
    }
}

/// Swaps a property for a detached one at the same position
#[derive(Debug)]
pub struct ReplacePropertyJob {
    original: PropertyId,
    replacement: PropertyId,
    slot: Option<(ObjectId, usize)>,
}

impl ReplacePropertyJob {
    pub fn new(original: PropertyId, replacement: PropertyId) -> Self {
        Self {
            original,
            replacement,
            slot: None,
        }
    }
}

impl JobOp for ReplacePropertyJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        let (Some(original), Some(replacement)) = (
            document.property(self.original),
            document.property(self.replacement),
        ) else {
            return false;
        };
        let Some(owner) = original.owner() else {
            return false;
        };
        if self.original == self.replacement || replacement.owner().is_some() {
            return false;
        }
        let clash = document
            .find_property(owner, replacement.name())
            .is_some_and(|existing| existing != self.original);
        let cycle = replacement
            .values()
            .iter()
            .any(|value| document.is_ancestor_or_self(*value, owner));
        !clash && !cycle
    }

    fn execute(&mut self, state: &mut EditorState) {
        let (owner, index) = state.document.remove_property(self.original);
        state
            .document
            .add_property(owner, self.replacement, Some(index));
        self.slot = Some((owner, index));
    }

    fn undo(&mut self, state: &mut EditorState) {
        let (owner, index) = self.slot.expect("undo before execute");
        state.document.remove_property(self.replacement);
        state.document.add_property(owner, self.original, Some(index));
    }

    fn description(&self) -> String {
        "Replace Property".to_string()
    }
}
