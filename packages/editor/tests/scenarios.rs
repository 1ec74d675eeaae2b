//! End-to-end editing scenarios driven through an edit session
//!
//! This tests:
//! - Setting the root of an empty document
//! - Changing one property on two siblings as a single undo unit
//! - Deleting the target of a reference
//! - Repairs and leftovers of the reference updater

mod common;

use common::{catalog, form, id, session};
use fxom_editor::{
    commands, BatchJob, DeleteObjectJob, EditorState, GridFeature, Job, JobManager, JobOp,
    ModifyObjectJob, RelocateTarget, SetFxomRootJob,
};
use fxom_model::{
    check_invariants, FxomDocument, IntrinsicKind, ObjectId, PropertyName, Realized, Realizer,
    SceneObject,
};
use std::any::Any;
use std::sync::Arc;

#[test]
fn test_set_root_on_empty_document() {
    common::init_tracing();
    let mut state = EditorState::default();
    let mut jobs = JobManager::new();
    let revision = state.document.scene_graph_revision();

    let root = state.document.create_instance("VBox");
    let job = SetFxomRootJob::new(Some(root));
    assert!(job.is_executable(&state));
    jobs.push(job.into(), &mut state);

    assert_eq!(state.document.root(), Some(root));
    assert_eq!(state.document.scene_graph_revision(), revision + 1);
    assert_eq!(jobs.undo_levels(), 1);

    assert!(jobs.undo(&mut state));
    assert_eq!(state.document.root(), None);
    assert_eq!(jobs.redo_description().as_deref(), Some("Set Root"));
}

#[test]
fn test_row_span_on_two_siblings_is_one_undo_unit() -> anyhow::Result<()> {
    let mut session = session(form()?);
    let before = session.document().snapshot();
    let field = id(&session, "nameField");
    let label = id(&session, "nameLabel");
    let row_span = PropertyName::attached("GridPane", "rowSpan");
    session.selection_mut().select_all([field, label]);

    // Each sibling grows by one from its current span
    let catalog = catalog();
    let jobs: Vec<Job> = session
        .selection()
        .group()
        .items()
        .into_iter()
        .map(|item| {
            let document = session.document();
            let metadata =
                commands::property_metadata(&catalog, document, item, &row_span).unwrap();
            let current = document
                .text_of(item, &row_span)
                .or(metadata.default_value.as_deref())
                .and_then(|text| text.parse::<usize>().ok())
                .unwrap_or(1);
            ModifyObjectJob::new(item, metadata, Some((current + 1).to_string())).into()
        })
        .collect();
    let batch = BatchJob::new("Modify", jobs, session.state()).with_description("Increase Row Span");
    assert!(session.perform(batch.into()));

    assert_eq!(session.jobs().undo_levels(), 1);
    assert_eq!(session.document().text_of(field, &row_span), Some("3"));
    assert_eq!(session.document().text_of(label, &row_span), Some("2"));

    assert!(session.undo());
    assert_eq!(session.document().text_of(field, &row_span), Some("2"));
    assert_eq!(session.document().text_of(label, &row_span), None);
    assert_eq!(session.document().snapshot(), before);

    assert!(session.redo());
    assert_eq!(session.document().text_of(label, &row_span), Some("2"));
    Ok(())
}

#[test]
fn test_delete_reference_target_hands_it_to_the_reference() -> anyhow::Result<()> {
    let mut session = session(form()?);
    let before = session.document().snapshot();
    let ok = id(&session, "ok");
    let buttons = id(&session, "buttons");
    session.selection_mut().select(ok, None);

    let job = commands::delete_selection(session.metadata(), session.state());
    assert_eq!(job.description(), "Delete Button");
    assert!(session.perform(job));

    // The placeholder slot now holds the button itself
    assert_eq!(session.document().child_objects(buttons), vec![ok]);
    assert!(session.document().is_attached(ok));
    assert!(session.document().unresolved_references().is_empty());
    assert!(session.selection().is_empty());
    session.verify()?;

    assert_eq!(session.jobs().undo_levels(), 1);
    assert!(session.undo());
    assert_eq!(session.document().snapshot(), before);
    assert!(session.selection().is_selected(ok));
    Ok(())
}

#[test]
fn test_delete_target_together_with_its_reference() -> anyhow::Result<()> {
    let mut session = session(form()?);
    let before = session.document().snapshot();
    let ok = id(&session, "ok");
    let buttons = id(&session, "buttons");
    let placeholder = session.document().child_objects(buttons)[1];
    session.selection_mut().select_all([ok, placeholder]);

    let job = commands::delete_selection(session.metadata(), session.state());
    assert_eq!(job.description(), "Delete 2 objects");
    assert!(session.perform(job));

    assert!(!session.document().is_attached(ok));
    assert!(!session.document().is_attached(placeholder));
    assert!(session.document().child_objects(buttons).is_empty());
    session.verify()?;

    assert_eq!(session.jobs().undo_levels(), 1);
    assert!(session.undo());
    assert_eq!(session.document().snapshot(), before);
    assert!(session.redo());
    assert!(session.document().child_objects(buttons).is_empty());
    Ok(())
}

#[test]
fn test_batch_skips_objects_detached_by_earlier_deletes() -> anyhow::Result<()> {
    let mut session = session(form()?);
    let before = session.document().snapshot();
    let ok = id(&session, "ok");
    let buttons = id(&session, "buttons");
    let placeholder = session.document().child_objects(buttons)[1];

    // Deleting the target first hands it over to the placeholder, which
    // leaves the second delete nothing to do
    let jobs: Vec<Job> = vec![
        DeleteObjectJob::new(ok).into(),
        DeleteObjectJob::new(placeholder).into(),
    ];
    let batch = BatchJob::new("Delete", jobs, session.state());
    assert!(session.perform(batch.into()));

    assert_eq!(session.document().child_objects(buttons), vec![ok]);
    assert!(!session.document().is_attached(placeholder));
    session.verify()?;

    assert!(session.undo());
    assert_eq!(session.document().snapshot(), before);
    Ok(())
}

#[test]
fn test_delete_subtree_leaves_dangling_copy_unresolved() -> anyhow::Result<()> {
    let mut session = session(form()?);
    let before = session.document().snapshot();
    let grid = id(&session, "grid");
    session.selection_mut().select(grid, None);

    let job = commands::delete_selection(session.metadata(), session.state());
    assert!(session.perform(job));

    assert!(!session.document().is_attached(grid));
    let unresolved = session.document().unresolved_references();
    assert_eq!(unresolved.len(), 1);
    assert!(unresolved[0].is_copy(session.document()));
    session.verify()?;

    assert!(session.undo());
    assert_eq!(session.document().snapshot(), before);
    assert!(session.document().unresolved_references().is_empty());
    Ok(())
}

#[test]
fn test_relocating_reference_before_its_target_expands_it() -> anyhow::Result<()> {
    let mut session = session(form()?);
    let before = session.document().snapshot();
    let ok = id(&session, "ok");
    let buttons = id(&session, "buttons");
    let placeholder = session.document().child_objects(buttons)[1];

    let target = RelocateTarget::Property {
        parent: buttons,
        name: PropertyName::new("children"),
    };
    let mut job = commands::relocate_object(placeholder, target, Some(0));
    assert!(job.is_executable(session.state()));
    job.execute(session.state_mut());

    let Job::UpdateReferences(update) = &job else {
        panic!("relocation is wrapped in a reference update");
    };
    assert_eq!(update.fixes().len(), 1);
    assert!(update.unresolved().is_empty());

    // The button moved up into the placeholder slot and a new reference
    // follows it
    let children = session.document().child_objects(buttons);
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], ok);
    let trailing = session.document().object(children[1]).unwrap();
    assert_eq!(trailing.as_intrinsic().map(|i| i.kind), Some(IntrinsicKind::Reference));
    check_invariants(session.document())?;

    job.undo(session.state_mut());
    assert_eq!(session.document().snapshot(), before);
    Ok(())
}

#[test]
fn test_delete_grid_column() -> anyhow::Result<()> {
    let mut session = session(form()?);
    let before = session.document().snapshot();
    let grid = id(&session, "grid");
    session.selection_mut().select_grid(grid, GridFeature::Column, 1);

    let job = commands::delete_selection(session.metadata(), session.state());
    assert_eq!(job.description(), "Delete Columns");
    assert!(session.perform(job));

    // The text field sat in column 1 and was the target of `labelFor`
    let children = session.document().child_objects(grid);
    assert_eq!(children.len(), 1);
    let label = id(&session, "nameLabel");
    assert_eq!(session.document().parent_object(id(&session, "nameField")), Some(label));
    session.verify()?;

    assert!(session.undo());
    assert_eq!(session.document().snapshot(), before);
    Ok(())
}

#[test]
fn test_empty_session_insert_then_undo_everything() -> anyhow::Result<()> {
    let mut session = session(FxomDocument::new());
    assert!(session.insert_document(&form()?, None, None));
    assert!(session.insert_document(&form()?, None, None));

    let root = session.document().root().unwrap();
    let copy = *session.document().child_objects(root).last().unwrap();
    assert_eq!(session.document()[copy].fx_id(), Some("form1"));
    assert!(session.document().unresolved_references().is_empty());
    session.verify()?;

    while session.undo() {}
    assert!(session.document().root().is_none());
    Ok(())
}

/// Live node remembering the container it was built under
#[derive(Debug)]
struct Placed(String);

impl SceneObject for Placed {
    fn type_name(&self) -> &str {
        &self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct PlacedRealizer;

impl Realizer for PlacedRealizer {
    fn realize(&self, document: &FxomDocument, object: ObjectId) -> Option<Realized> {
        let parent = document
            .parent_object(object)
            .map(|parent| document[parent].label())
            .unwrap_or_default();
        Some(Box::new(Placed(format!("{}/{}", parent, document[object].label()))))
    }
}

fn placement(session: &fxom_editor::EditSession, object: ObjectId) -> Option<String> {
    session.document()[object]
        .realized()
        .map(|realized| realized.type_name().to_string())
}

#[test]
fn test_relocation_rebuilds_realized_objects() -> anyhow::Result<()> {
    let mut session = session(form()?);
    session
        .state_mut()
        .document
        .set_realizer(Some(Arc::new(PlacedRealizer)));
    let ok = id(&session, "ok");
    let grid = id(&session, "grid");
    assert_eq!(placement(&session, ok).as_deref(), Some("HBox/Button"));

    let target = RelocateTarget::Property {
        parent: grid,
        name: PropertyName::new("children"),
    };
    assert!(session.perform(commands::relocate_object(ok, target, None)));
    assert_eq!(placement(&session, ok).as_deref(), Some("GridPane/Button"));

    assert!(session.undo());
    assert_eq!(placement(&session, ok).as_deref(), Some("HBox/Button"));
    Ok(())
}
