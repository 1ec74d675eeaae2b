use super::JobOp;
use crate::state::EditorState;
use fxom_model::{
    is_valid_fx_id, FxomDocument, ObjectId, PropertyId, PropertyMetadata, ReferenceSite,
};

/// What a [`ModifyObjectJob`] did to the property
#[derive(Debug, Clone)]
enum ValueChange {
    Created { property: PropertyId, index: usize },
    Removed { property: PropertyId, index: usize },
    Updated { property: PropertyId, old: String, new: String },
}

/// Sets one text property of an instance through its metadata.
///
/// A value equal to the property default removes the property. The realized
/// object, when there is one, is written through the metadata accessor in
/// both directions.
#[derive(Debug)]
pub struct ModifyObjectJob {
    object: ObjectId,
    metadata: PropertyMetadata,
    value: Option<String>,
    change: Option<ValueChange>,
}

impl ModifyObjectJob {
    pub fn new(object: ObjectId, metadata: PropertyMetadata, value: Option<String>) -> Self {
        let value = metadata.normalize(value);
        Self {
            object,
            metadata,
            value,
            change: None,
        }
    }

    fn current_value<'d>(&self, document: &'d FxomDocument) -> Option<&'d str> {
        document.text_of(self.object, &self.metadata.name)
    }

    fn write_realized(&self, state: &mut EditorState, value: Option<&str>) {
        let Some(accessor) = &self.metadata.accessor else {
            return;
        };
        let value = value.or(self.metadata.default_value.as_deref());
        if let Some(realized) = state.document.realized_mut(self.object) {
            accessor.write(&mut **realized, value);
        }
    }
}

impl JobOp for ModifyObjectJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        if self.metadata.read_only || !document.object(self.object).is_some_and(|o| o.has_properties()) {
            return false;
        }
        if let Some(existing) = document.find_property(self.object, &self.metadata.name) {
            if document[existing].is_collection() {
                return false;
            }
        }
        self.current_value(document) != self.value.as_deref()
    }

    fn execute(&mut self, state: &mut EditorState) {
        let document = &mut state.document;
        let existing = document.find_property(self.object, &self.metadata.name);
        let change = match (existing, &self.value) {
            (Some(property), Some(value)) => {
                let old = document.set_text(property, value.clone());
                ValueChange::Updated {
                    property,
                    old,
                    new: value.clone(),
                }
            }
            (Some(property), None) => {
                let (_, index) = document.remove_property(property);
                ValueChange::Removed { property, index }
            }
            (None, Some(value)) => {
                let property = document.create_text_property(self.metadata.name.clone(), value.clone());
                document.add_property(self.object, property, None);
                let index = document[self.object].properties().len() - 1;
                ValueChange::Created { property, index }
            }
            (None, None) => panic!("{} is already unset", self.metadata.name),
        };
        self.change = Some(change);
        let value = self.value.clone();
        self.write_realized(state, value.as_deref());
    }

    fn undo(&mut self, state: &mut EditorState) {
        let document = &mut state.document;
        let old = match self.change.clone().expect("undo before execute") {
            ValueChange::Created { property, .. } => {
                document.remove_property(property);
                None
            }
            ValueChange::Removed { property, index } => {
                document.add_property(self.object, property, Some(index));
                document[property].text().map(str::to_string)
            }
            ValueChange::Updated { property, old, .. } => {
                document.set_text(property, old.clone());
                Some(old)
            }
        };
        self.write_realized(state, old.as_deref());
    }

    fn redo(&mut self, state: &mut EditorState) {
        let document = &mut state.document;
        match self.change.clone().expect("redo before execute") {
            ValueChange::Created { property, index } => {
                document.add_property(self.object, property, Some(index));
            }
            ValueChange::Removed { property, .. } => {
                document.remove_property(property);
            }
            ValueChange::Updated { property, new, .. } => {
                document.set_text(property, new);
            }
        }
        let value = self.value.clone();
        self.write_realized(state, value.as_deref());
    }

    fn description(&self) -> String {
        format!("Set {}", self.metadata.name)
    }
}

/// Renames an object's fx:id together with every reference to it
#[derive(Debug)]
pub struct ModifyFxIdJob {
    object: ObjectId,
    fx_id: Option<String>,
    sites: Vec<ReferenceSite>,
    previous: Option<Option<String>>,
    renamed: Vec<(ReferenceSite, String)>,
}

impl ModifyFxIdJob {
    pub fn new(object: ObjectId, fx_id: Option<String>, document: &FxomDocument) -> Self {
        let sites = document
            .object(object)
            .and_then(|o| o.fx_id())
            .map(|current| document.collect_references(Some(current)))
            .unwrap_or_default();
        Self {
            object,
            fx_id,
            sites,
            previous: None,
            renamed: Vec::new(),
        }
    }
}

impl JobOp for ModifyFxIdJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        let Some(object) = document.object(self.object) else {
            return false;
        };
        if !object.accepts_fx_id() || object.fx_id() == self.fx_id.as_deref() {
            return false;
        }
        match &self.fx_id {
            Some(id) => {
                is_valid_fx_id(id)
                    && document
                        .search_with_fx_id(id)
                        .map_or(true, |owner| owner == self.object)
            }
            // Clearing is refused while something still points at the id
            None => self.sites.is_empty(),
        }
    }

    fn execute(&mut self, state: &mut EditorState) {
        let document = &mut state.document;
        self.previous = Some(document.set_fx_id(self.object, self.fx_id.clone()));
        self.renamed.clear();

        let Some(new_id) = &self.fx_id else {
            return;
        };
        for site in &self.sites {
            let old = match *site {
                ReferenceSite::Intrinsic(placeholder) => {
                    document.set_intrinsic_source(placeholder, new_id.clone())
                }
                ReferenceSite::Expression(property) => {
                    document.set_text(property, format!("${}", new_id))
                }
            };
            self.renamed.push((*site, old));
        }
    }

    fn undo(&mut self, state: &mut EditorState) {
        let document = &mut state.document;
        for (site, old) in self.renamed.iter().rev() {
            match *site {
                ReferenceSite::Intrinsic(placeholder) => {
                    document.set_intrinsic_source(placeholder, old.clone());
                }
                ReferenceSite::Expression(property) => {
                    document.set_text(property, old.clone());
                }
            }
        }
        let previous = self.previous.clone().expect("undo before execute");
        document.set_fx_id(self.object, previous);
    }

    fn description(&self) -> String {
        match &self.fx_id {
            Some(id) => format!("Set fx:id to {}", id),
            None => "Clear fx:id".to_string(),
        }
    }
}

/// Sets `fx:controller` on the root instance
#[derive(Debug)]
pub struct ModifyFxControllerJob {
    object: ObjectId,
    controller: Option<String>,
    previous: Option<Option<String>>,
}

impl ModifyFxControllerJob {
    pub fn new(object: ObjectId, controller: Option<String>) -> Self {
        Self {
            object,
            controller,
            previous: None,
        }
    }
}

impl JobOp for ModifyFxControllerJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        document.root() == Some(self.object)
            && document
                .object(self.object)
                .and_then(|o| o.as_instance())
                .is_some_and(|instance| instance.fx_controller != self.controller)
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.previous = Some(
            state
                .document
                .set_fx_controller(self.object, self.controller.clone()),
        );
    }

    fn undo(&mut self, state: &mut EditorState) {
        let previous = self.previous.clone().expect("undo before execute");
        state.document.set_fx_controller(self.object, previous);
    }

    fn description(&self) -> String {
        "Set Controller".to_string()
    }
}
