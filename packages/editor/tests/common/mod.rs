//! Shared fixtures for the editor integration suites

#![allow(dead_code)]

use fxom_editor::{EditSession, EditorConfig};
use fxom_model::{FxomDocument, InMemoryCatalog, NodeSnapshot, ObjectId, PropertyMetadata};
use std::sync::Arc;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

/// Login form with one of each reference kind:
///
/// ```text
/// VBox#form
///   children: GridPane#grid
///               children: TextField#nameField
///                         Label#nameLabel (labelFor=$nameField)
///             fx:copy(nameLabel)
///             HBox#buttons
///               children: Button#ok, fx:reference(ok)
/// ```
pub const FORM: &str = r#"
{
  "kind": "instance",
  "typeName": "VBox",
  "fxId": "form",
  "properties": [
    { "name": "children", "value": [
      { "kind": "instance", "typeName": "GridPane", "fxId": "grid",
        "properties": [
          { "name": "children", "value": [
            { "kind": "instance", "typeName": "TextField", "fxId": "nameField",
              "properties": [
                { "name": "GridPane.columnIndex", "value": "1" },
                { "name": "GridPane.rowSpan", "value": "2" }
              ] },
            { "kind": "instance", "typeName": "Label", "fxId": "nameLabel",
              "properties": [
                { "name": "text", "value": "Name" },
                { "name": "labelFor", "value": "$nameField" }
              ] }
          ] }
        ] },
      { "kind": "intrinsic", "intrinsic": "copy", "source": "nameLabel" },
      { "kind": "instance", "typeName": "HBox", "fxId": "buttons",
        "properties": [
          { "name": "children", "value": [
            { "kind": "instance", "typeName": "Button", "fxId": "ok",
              "properties": [ { "name": "text", "value": "OK" } ] },
            { "kind": "intrinsic", "intrinsic": "reference", "source": "ok" }
          ] }
        ] }
    ] }
  ]
}
"#;

pub fn form() -> anyhow::Result<FxomDocument> {
    let root: NodeSnapshot = serde_json::from_str(FORM)?;
    Ok(FxomDocument::from_snapshot(Some(&root)))
}

pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_default_property("VBox", "children")
        .with_default_property("HBox", "children")
        .with_default_property("GridPane", "children")
        .with_property("GridPane", PropertyMetadata::new("GridPane.rowSpan").with_default("1"))
        .with_property("Button", PropertyMetadata::new("text").with_default(""))
}

pub fn session(document: FxomDocument) -> EditSession {
    init_tracing();
    let mut session =
        EditSession::new(FxomDocument::new(), Arc::new(catalog()), EditorConfig::default());
    session.load_document(document);
    session
}

pub fn id(session: &EditSession, fx_id: &str) -> ObjectId {
    session
        .document()
        .search_with_fx_id(fx_id)
        .unwrap_or_else(|| panic!("no object with fx:id {}", fx_id))
}
