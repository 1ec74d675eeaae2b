use crate::document::FxomDocument;
use crate::object::ObjectId;
use crate::property::PropertyId;

/// Read-only traversal of a document tree.
///
/// The default methods walk everything in document order: an object, then
/// its properties (and their values), then its items. Override a `visit_*`
/// method and call the matching `walk_*` function to keep descending.
pub trait Visitor: Sized {
    fn visit_object(&mut self, document: &FxomDocument, object: ObjectId) {
        walk_object(self, document, object);
    }

    fn visit_property(&mut self, document: &FxomDocument, property: PropertyId) {
        walk_property(self, document, property);
    }
}

pub fn walk_document<V: Visitor>(visitor: &mut V, document: &FxomDocument) {
    if let Some(root) = document.root() {
        visitor.visit_object(document, root);
    }
}

pub fn walk_object<V: Visitor>(visitor: &mut V, document: &FxomDocument, object: ObjectId) {
    let object = &document[object];
    for &property in object.properties() {
        visitor.visit_property(document, property);
    }
    for &item in object.items() {
        visitor.visit_object(document, item);
    }
}

pub fn walk_property<V: Visitor>(visitor: &mut V, document: &FxomDocument, property: PropertyId) {
    for &value in document[property].values() {
        visitor.visit_object(document, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::NodeSnapshot;

    struct TypeCollector(Vec<String>);

    impl Visitor for TypeCollector {
        fn visit_object(&mut self, document: &FxomDocument, object: ObjectId) {
            self.0.push(document[object].label());
            walk_object(self, document, object);
        }
    }

    #[test]
    fn test_walk_matches_document_order() {
        let root = NodeSnapshot::instance("BorderPane")
            .with_objects("top", vec![NodeSnapshot::instance("Label")])
            .with_objects(
                "center",
                vec![NodeSnapshot::instance("VBox")
                    .with_objects("children", vec![NodeSnapshot::instance("Button")])],
            );
        let doc = FxomDocument::from_snapshot(Some(&root));

        let mut collector = TypeCollector(Vec::new());
        walk_document(&mut collector, &doc);

        assert_eq!(collector.0, vec!["BorderPane", "Label", "VBox", "Button"]);
        let order: Vec<String> = doc.document_order().iter().map(|id| doc[*id].label()).collect();
        assert_eq!(collector.0, order);
    }
}
