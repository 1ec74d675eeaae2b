//! Deep copy with fx:id regeneration.

use crate::document::FxomDocument;
use crate::ids::FxIdGenerator;
use crate::object::ObjectId;
use crate::references::expression_reference_target;
use crate::snapshot::{NodeSnapshot, SnapshotValue};
use std::collections::HashMap;

/// Clones subtrees into a document, renaming fx:ids that would collide.
///
/// One cloner may serve several clones in a row; ids it issued are taken
/// into account by the following ones.
#[derive(Clone, Debug)]
pub struct FxomCloner {
    generator: FxIdGenerator,
}

impl FxomCloner {
    /// Cloner for copies landing in `target`
    pub fn new(target: &FxomDocument) -> Self {
        Self {
            generator: FxIdGenerator::from_document(target),
        }
    }

    /// Detached copy of `object` inside the same document
    pub fn clone_object(&mut self, document: &mut FxomDocument, object: ObjectId) -> ObjectId {
        let mut snapshot = document.snapshot_object(object);
        self.rename(&mut snapshot);
        document.materialize(&snapshot)
    }

    /// Detached copy of `object` from `source` into `target`
    pub fn import(
        &mut self,
        target: &mut FxomDocument,
        source: &FxomDocument,
        object: ObjectId,
    ) -> ObjectId {
        let mut snapshot = source.snapshot_object(object);
        self.rename(&mut snapshot);
        target.materialize(&snapshot)
    }

    /// Regenerates colliding ids in `snapshot` and rewrites the references
    /// inside it that point at them. References to ids declared outside the
    /// snapshot are left alone.
    pub fn rename(&mut self, snapshot: &mut NodeSnapshot) {
        let mut renamed: HashMap<String, String> = HashMap::new();
        snapshot.for_each_mut(&mut |node| {
            let fx_id = match node {
                NodeSnapshot::Instance { fx_id, .. }
                | NodeSnapshot::Collection { fx_id, .. }
                | NodeSnapshot::Intrinsic { fx_id, .. } => fx_id,
                _ => return,
            };
            if let Some(id) = fx_id.as_mut() {
                if self.generator.is_used(id) {
                    let fresh = self.generator.next_id(id);
                    renamed.entry(id.clone()).or_insert_with(|| fresh.clone());
                    *id = fresh;
                } else {
                    self.generator.reserve(id.clone());
                }
            }
        });

        if renamed.is_empty() {
            return;
        }
        snapshot.for_each_mut(&mut |node| {
            let properties = match node {
                NodeSnapshot::Intrinsic {
                    intrinsic,
                    source,
                    properties,
                    ..
                } => {
                    if intrinsic.targets_fx_id() {
                        if let Some(new) = renamed.get(source.as_str()) {
                            *source = new.clone();
                        }
                    }
                    properties
                }
                NodeSnapshot::Instance { properties, .. } => properties,
                _ => return,
            };
            for property in properties {
                if let SnapshotValue::Text(text) = &mut property.value {
                    let rewritten = expression_reference_target(text)
                        .and_then(|target| renamed.get(target))
                        .map(|new| format!("${}", new));
                    if let Some(rewritten) = rewritten {
                        *text = rewritten;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::IntrinsicKind;

    fn form() -> FxomDocument {
        let root = NodeSnapshot::instance("VBox").with_objects(
            "children",
            vec![
                NodeSnapshot::instance("HBox").with_fx_id("row").with_objects(
                    "children",
                    vec![
                        NodeSnapshot::instance("Button").with_fx_id("ok"),
                        NodeSnapshot::instance("Label")
                            .with_fx_id("caption")
                            .with_text("labelFor", "$ok"),
                        NodeSnapshot::instance("Label").with_text("labelFor", "$outside"),
                        NodeSnapshot::intrinsic(IntrinsicKind::Reference, "ok"),
                    ],
                ),
                NodeSnapshot::instance("TextField").with_fx_id("outside"),
            ],
        );
        FxomDocument::from_snapshot(Some(&root))
    }

    #[test]
    fn test_clone_regenerates_ids_and_rewrites_internal_references() {
        let mut doc = form();
        let row = doc.search_with_fx_id("row").unwrap();

        let mut cloner = FxomCloner::new(&doc);
        let copy = cloner.clone_object(&mut doc, row);
        let snapshot = doc.snapshot_object(copy);

        let expected = NodeSnapshot::instance("HBox").with_fx_id("row1").with_objects(
            "children",
            vec![
                NodeSnapshot::instance("Button").with_fx_id("ok1"),
                NodeSnapshot::instance("Label")
                    .with_fx_id("caption1")
                    .with_text("labelFor", "$ok1"),
                NodeSnapshot::instance("Label").with_text("labelFor", "$outside"),
                NodeSnapshot::intrinsic(IntrinsicKind::Reference, "ok1"),
            ],
        );
        assert_eq!(snapshot, expected);
        assert!(!doc.is_attached(copy));
    }

    #[test]
    fn test_cloner_tracks_ids_it_issued() {
        let mut doc = form();
        let ok = doc.search_with_fx_id("ok").unwrap();

        let mut cloner = FxomCloner::new(&doc);
        let first = cloner.clone_object(&mut doc, ok);
        let second = cloner.clone_object(&mut doc, ok);

        assert_eq!(doc[first].fx_id(), Some("ok1"));
        assert_eq!(doc[second].fx_id(), Some("ok2"));
    }

    #[test]
    fn test_import_keeps_free_ids() {
        let source = form();
        let mut target = FxomDocument::new();
        let row = source.search_with_fx_id("row").unwrap();

        let mut cloner = FxomCloner::new(&target);
        let imported = cloner.import(&mut target, &source, row);

        assert_eq!(target.snapshot_object(imported), source.snapshot_object(row));
        assert_eq!(target[imported].owner(), target.id());
    }
}
