//! Integration tests for the library scan and configuration
//!
//! This tests:
//! - Scan options loaded from the config file
//! - Background scans joined or cancelled from the edit thread
//! - Inserting a scanned item into an open document

mod common;

use common::{init_tracing, FORM};
use fxom_editor::{
    CancellationFlag, EditSession, EditorConfig, EditorError, LibraryScanner, ScanOutcome,
    DEFAULT_CONFIG_NAME,
};
use fxom_model::{FxomDocument, NodeSnapshot};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn write_library(root: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(root.join("containers/layout"))?;
    fs::write(root.join("Form.fxml"), FORM)?;
    fs::write(root.join("containers/Box.FXML"), "{}")?;
    fs::write(root.join("containers/layout/Grid.fxml"), "{}")?;
    fs::write(root.join("containers/layout/Grid.xml"), "{}")?;
    fs::write(root.join("notes.txt"), "not markup")?;
    Ok(())
}

#[test]
fn test_config_drives_scan() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_library(dir.path())?;
    fs::write(
        dir.path().join(DEFAULT_CONFIG_NAME),
        r#"{ "maxUndoLevels": 5, "library": { "extensions": ["fxml", "xml"], "maxDepth": 2 } }"#,
    )?;

    let config = EditorConfig::load(dir.path())?;
    assert_eq!(config.max_undo_levels, 5);

    let outcome = LibraryScanner::new(dir.path(), config.library).scan(&CancellationFlag::new())?;
    let catalog = outcome.catalog().expect("scan was not cancelled");
    let names: Vec<&str> = catalog.items().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Form", "Box"]);
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ maxUndoLevels: }")?;
    assert!(matches!(EditorConfig::load(dir.path()), Err(EditorError::Config(_))));
    Ok(())
}

#[test]
fn test_background_scan_finishes_or_cancels() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_library(dir.path())?;
    for i in 0..64 {
        fs::write(dir.path().join(format!("Item{:02}.fxml", i)), "{}")?;
    }

    let handle = LibraryScanner::new(dir.path(), EditorConfig::default().library).spawn();
    handle.cancel();
    // The worker may have finished before seeing the flag
    match handle.join()? {
        ScanOutcome::Cancelled => {}
        ScanOutcome::Completed(catalog) => assert_eq!(catalog.len(), 67),
    }
    Ok(())
}

#[test]
fn test_insert_scanned_item() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    write_library(dir.path())?;

    let handle = LibraryScanner::new(dir.path(), EditorConfig::default().library).spawn();
    let catalog = handle.join()?.catalog().expect("scan was not cancelled");
    let item = catalog.find("", "Form").expect("Form.fxml is in the library");

    let snapshot: NodeSnapshot = serde_json::from_str(&fs::read_to_string(&item.path)?)?;
    let mut parsed = FxomDocument::from_snapshot(Some(&snapshot));
    parsed.set_location(Some(item.path.clone()));

    let mut session =
        EditSession::new(FxomDocument::new(), Arc::new(common::catalog()), EditorConfig::default());
    assert!(session.insert_document(&parsed, None, None));
    assert_eq!(session.document().collect_fx_ids().len(), parsed.collect_fx_ids().len());
    session.verify()?;
    Ok(())
}
