use crate::document::FxomDocument;
use crate::errors::{ModelError, ModelResult};
use crate::object::{ObjectId, ParentLink};
use crate::property::PropertyId;
use crate::visitor::{walk_document, walk_object, walk_property, Visitor};
use std::collections::HashSet;

/// Walks the attached tree and reports the first structural inconsistency.
///
/// Checks single parenthood, back-links, ownership by this document,
/// property ownership and name uniqueness, and fx:id uniqueness.
pub fn check_invariants(document: &FxomDocument) -> ModelResult<()> {
    if let Some(root) = document.root() {
        let object = document
            .object(root)
            .ok_or(ModelError::ObjectNotFound(root))?;
        if object.parent().is_some() {
            return Err(ModelError::RootHasParent(root));
        }
    }

    let mut checker = InvariantChecker {
        seen: HashSet::new(),
        fx_ids: HashSet::new(),
        error: None,
    };
    walk_document(&mut checker, document);
    match checker.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

struct InvariantChecker {
    seen: HashSet<ObjectId>,
    fx_ids: HashSet<String>,
    error: Option<ModelError>,
}

impl InvariantChecker {
    fn fail(&mut self, error: ModelError) {
        self.error.get_or_insert(error);
    }

    fn check_child(&mut self, document: &FxomDocument, child: ObjectId, expected: ParentLink) -> bool {
        match document.object(child) {
            None => {
                self.fail(ModelError::ObjectNotFound(child));
                false
            }
            Some(object) if object.parent() != Some(expected) => {
                self.fail(ModelError::ParentMismatch(child));
                false
            }
            Some(_) => true,
        }
    }
}

impl Visitor for InvariantChecker {
    fn visit_object(&mut self, document: &FxomDocument, object: ObjectId) {
        if self.error.is_some() {
            return;
        }
        if !self.seen.insert(object) {
            self.fail(ModelError::MultipleParents(object));
            return;
        }

        let obj = &document[object];
        if obj.owner() != document.id() {
            self.fail(ModelError::ForeignObject(object));
            return;
        }
        if let Some(fx_id) = obj.fx_id() {
            if !self.fx_ids.insert(fx_id.to_string()) {
                self.fail(ModelError::DuplicateFxId(fx_id.to_string()));
                return;
            }
        }

        let mut names = HashSet::new();
        for &property in obj.properties() {
            let Some(prop) = document.property(property) else {
                self.fail(ModelError::PropertyNotFound(property));
                return;
            };
            if prop.owner() != Some(object) {
                self.fail(ModelError::PropertyOwnerMismatch(property));
                return;
            }
            if !names.insert(prop.name()) {
                self.fail(ModelError::DuplicateProperty {
                    object,
                    name: prop.name().to_string(),
                });
                return;
            }
        }
        for &item in obj.items() {
            if !self.check_child(document, item, ParentLink::Container(object)) {
                return;
            }
        }

        walk_object(self, document, object);
    }

    fn visit_property(&mut self, document: &FxomDocument, property: PropertyId) {
        for &value in document[property].values() {
            if !self.check_child(document, value, ParentLink::Property(property)) {
                return;
            }
        }
        walk_property(self, document, property);
    }
}
