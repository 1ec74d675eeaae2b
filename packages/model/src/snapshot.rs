//! Handle-free owned copies of subtrees.
//!
//! Snapshots are what tests compare (deep structural equality through
//! `PartialEq`), what the cloner rewrites, and what crosses document
//! boundaries. Realized representations and handles are not captured.

use crate::document::FxomDocument;
use crate::object::{IntrinsicKind, ObjectId, ObjectKind};
use crate::property::{PropertyKind, PropertyName};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeSnapshot {
    #[serde(rename_all = "camelCase")]
    Instance {
        type_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fx_id: Option<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        fx_root: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fx_controller: Option<String>,
        #[serde(default)]
        properties: Vec<PropertySnapshot>,
    },
    #[serde(rename_all = "camelCase")]
    Collection {
        type_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fx_id: Option<String>,
        #[serde(default)]
        items: Vec<NodeSnapshot>,
    },
    #[serde(rename_all = "camelCase")]
    Intrinsic {
        intrinsic: IntrinsicKind,
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fx_id: Option<String>,
        #[serde(default)]
        properties: Vec<PropertySnapshot>,
    },
    Comment {
        text: String,
    },
    Define {
        #[serde(default)]
        items: Vec<NodeSnapshot>,
    },
    Script {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        body: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub name: PropertyName,
    pub value: SnapshotValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotValue {
    Text(String),
    Objects(Vec<NodeSnapshot>),
}

impl NodeSnapshot {
    pub fn instance(type_name: impl Into<String>) -> Self {
        NodeSnapshot::Instance {
            type_name: type_name.into(),
            fx_id: None,
            fx_root: false,
            fx_controller: None,
            properties: Vec::new(),
        }
    }

    pub fn intrinsic(kind: IntrinsicKind, source: impl Into<String>) -> Self {
        NodeSnapshot::Intrinsic {
            intrinsic: kind,
            source: source.into(),
            fx_id: None,
            properties: Vec::new(),
        }
    }

    pub fn with_fx_id(mut self, id: impl Into<String>) -> Self {
        match &mut self {
            NodeSnapshot::Instance { fx_id, .. }
            | NodeSnapshot::Collection { fx_id, .. }
            | NodeSnapshot::Intrinsic { fx_id, .. } => *fx_id = Some(id.into()),
            _ => panic!("{} cannot carry an fx:id", self.label()),
        }
        self
    }

    pub fn with_text(self, name: impl Into<PropertyName>, value: impl Into<String>) -> Self {
        self.with_property(name, SnapshotValue::Text(value.into()))
    }

    pub fn with_objects(self, name: impl Into<PropertyName>, values: Vec<NodeSnapshot>) -> Self {
        self.with_property(name, SnapshotValue::Objects(values))
    }

    fn with_property(mut self, name: impl Into<PropertyName>, value: SnapshotValue) -> Self {
        let property = PropertySnapshot {
            name: name.into(),
            value,
        };
        match &mut self {
            NodeSnapshot::Instance { properties, .. }
            | NodeSnapshot::Intrinsic { properties, .. } => properties.push(property),
            _ => panic!("{} cannot carry properties", self.label()),
        }
        self
    }

    pub fn fx_id(&self) -> Option<&str> {
        match self {
            NodeSnapshot::Instance { fx_id, .. }
            | NodeSnapshot::Collection { fx_id, .. }
            | NodeSnapshot::Intrinsic { fx_id, .. } => fx_id.as_deref(),
            _ => None,
        }
    }

    fn label(&self) -> &str {
        match self {
            NodeSnapshot::Instance { type_name, .. } | NodeSnapshot::Collection { type_name, .. } => {
                type_name
            }
            NodeSnapshot::Intrinsic { intrinsic, .. } => intrinsic.tag(),
            NodeSnapshot::Comment { .. } => "comment",
            NodeSnapshot::Define { .. } => "fx:define",
            NodeSnapshot::Script { .. } => "fx:script",
        }
    }

    /// Visits this node and its descendants in pre-order
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut NodeSnapshot)) {
        f(self);
        match self {
            NodeSnapshot::Instance { properties, .. }
            | NodeSnapshot::Intrinsic { properties, .. } => {
                for property in properties {
                    if let SnapshotValue::Objects(values) = &mut property.value {
                        for value in values {
                            value.for_each_mut(f);
                        }
                    }
                }
            }
            NodeSnapshot::Collection { items, .. } | NodeSnapshot::Define { items } => {
                for item in items {
                    item.for_each_mut(f);
                }
            }
            NodeSnapshot::Comment { .. } | NodeSnapshot::Script { .. } => {}
        }
    }
}

impl FxomDocument {
    /// Snapshot of the attached tree
    pub fn snapshot(&self) -> Option<NodeSnapshot> {
        self.root.map(|root| self.snapshot_object(root))
    }

    pub fn snapshot_object(&self, object: ObjectId) -> NodeSnapshot {
        let obj = &self[object];
        let fx_id = obj.fx_id.clone();
        match &obj.kind {
            ObjectKind::Instance(instance) => NodeSnapshot::Instance {
                type_name: instance.type_name.clone(),
                fx_id,
                fx_root: instance.fx_root,
                fx_controller: instance.fx_controller.clone(),
                properties: self.snapshot_properties(&instance.properties),
            },
            ObjectKind::Collection(collection) => NodeSnapshot::Collection {
                type_name: collection.type_name.clone(),
                fx_id,
                items: collection
                    .items
                    .iter()
                    .map(|item| self.snapshot_object(*item))
                    .collect(),
            },
            ObjectKind::Intrinsic(intrinsic) => NodeSnapshot::Intrinsic {
                intrinsic: intrinsic.kind,
                source: intrinsic.source.clone(),
                fx_id,
                properties: self.snapshot_properties(&intrinsic.properties),
            },
            ObjectKind::Comment(text) => NodeSnapshot::Comment { text: text.clone() },
            ObjectKind::Define(items) => NodeSnapshot::Define {
                items: items.iter().map(|item| self.snapshot_object(*item)).collect(),
            },
            ObjectKind::Script(script) => NodeSnapshot::Script {
                source: script.source.clone(),
                body: script.body.clone(),
            },
        }
    }

    fn snapshot_properties(&self, properties: &[crate::PropertyId]) -> Vec<PropertySnapshot> {
        properties
            .iter()
            .map(|p| {
                let property = &self[*p];
                let value = match &property.kind {
                    PropertyKind::Text(text) => SnapshotValue::Text(text.clone()),
                    PropertyKind::Collection(values) => SnapshotValue::Objects(
                        values.iter().map(|v| self.snapshot_object(*v)).collect(),
                    ),
                };
                PropertySnapshot {
                    name: property.name.clone(),
                    value,
                }
            })
            .collect()
    }

    /// Builds a detached subtree from `snapshot` and returns its top object.
    pub fn materialize(&mut self, snapshot: &NodeSnapshot) -> ObjectId {
        self.begin_update();
        let object = self.materialize_node(snapshot);
        self.end_update();
        object
    }

    fn materialize_node(&mut self, snapshot: &NodeSnapshot) -> ObjectId {
        let object = match snapshot {
            NodeSnapshot::Instance {
                type_name,
                fx_root,
                fx_controller,
                properties,
                ..
            } => {
                let object = self.create_instance(type_name.clone());
                if *fx_root {
                    self.set_fx_root(object, true);
                }
                if fx_controller.is_some() {
                    self.set_fx_controller(object, fx_controller.clone());
                }
                self.materialize_properties(object, properties);
                object
            }
            NodeSnapshot::Collection { type_name, items, .. } => {
                let object = self.create_collection(type_name.clone());
                for item in items {
                    let item = self.materialize_node(item);
                    self.add_item(object, item, None);
                }
                object
            }
            NodeSnapshot::Intrinsic {
                intrinsic,
                source,
                properties,
                ..
            } => {
                let object = self.create_intrinsic(*intrinsic, source.clone());
                self.materialize_properties(object, properties);
                object
            }
            NodeSnapshot::Comment { text } => self.create_comment(text.clone()),
            NodeSnapshot::Define { items } => {
                let object = self.create_define();
                for item in items {
                    let item = self.materialize_node(item);
                    self.add_item(object, item, None);
                }
                object
            }
            NodeSnapshot::Script { source, body } => self.create_script(source.clone(), body.clone()),
        };
        if let Some(fx_id) = snapshot.fx_id() {
            self.set_fx_id(object, Some(fx_id.to_string()));
        }
        object
    }

    fn materialize_properties(&mut self, object: ObjectId, properties: &[PropertySnapshot]) {
        for snapshot in properties {
            let property = match &snapshot.value {
                SnapshotValue::Text(text) => {
                    self.create_text_property(snapshot.name.clone(), text.clone())
                }
                SnapshotValue::Objects(values) => {
                    let property = self.create_collection_property(snapshot.name.clone());
                    for value in values {
                        let value = self.materialize_node(value);
                        self.add_value(property, value, None);
                    }
                    property
                }
            };
            self.add_property(object, property, None);
        }
    }

    /// Document whose tree is built from `root`. Stands in for the markup
    /// loader in tests and embedding code.
    pub fn from_snapshot(root: Option<&NodeSnapshot>) -> Self {
        let mut document = FxomDocument::new();
        if let Some(root) = root {
            let object = document.materialize(root);
            document.set_root(Some(object));
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NodeSnapshot {
        NodeSnapshot::instance("VBox").with_objects(
            "children",
            vec![
                NodeSnapshot::instance("Button")
                    .with_fx_id("ok")
                    .with_text("text", "OK")
                    .with_text("GridPane.rowIndex", "1"),
                NodeSnapshot::intrinsic(IntrinsicKind::Reference, "ok"),
                NodeSnapshot::Define {
                    items: vec![NodeSnapshot::Comment {
                        text: "spare".to_string(),
                    }],
                },
            ],
        )
    }

    #[test]
    fn test_snapshot_round_trips_through_document() {
        let doc = FxomDocument::from_snapshot(Some(&form()));
        assert_eq!(doc.snapshot(), Some(form()));
        assert_eq!(doc.document_order().len(), 5);
    }

    #[test]
    fn test_materialize_is_detached() {
        let mut doc = FxomDocument::new();
        let object = doc.materialize(&form());
        assert_eq!(doc.root(), None);
        assert!(!doc.is_attached(object));
        assert_eq!(doc.snapshot_object(object), form());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(NodeSnapshot::instance("Button").with_fx_id("ok")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "instance", "typeName": "Button", "fxId": "ok", "properties": [] })
        );

        let parsed: NodeSnapshot = serde_json::from_value(serde_json::json!({
            "kind": "instance",
            "typeName": "Label",
            "properties": [{ "name": "GridPane.columnIndex", "value": "2" }]
        }))
        .unwrap();
        assert_eq!(
            parsed,
            NodeSnapshot::instance("Label").with_text(PropertyName::attached("GridPane", "columnIndex"), "2")
        );
    }
}
