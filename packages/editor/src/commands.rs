//! # Editing Commands
//!
//! Builders turning a user gesture into one job, ready to be pushed.
//!
//! Commands read the current selection and metadata, create whatever
//! detached nodes the job needs and return it without executing anything.
//! A command that does not apply returns a job whose `is_executable` is
//! false.

use crate::job::{
    AddCollectionItemJob, AddPropertyJob, AddPropertyValueJob, BatchJob, DeleteObjectJob,
    DuplicateSelectionJob, Job, ModifyObjectJob, RelocateObjectJob, RelocateTarget,
    UpdateReferencesJob, UpdateSelectionJob,
};
use crate::selection::{GridFeature, GridSelectionGroup, SelectionGroup};
use crate::state::EditorState;
use fxom_model::{FxomDocument, MetadataCatalog, ObjectId, PropertyMetadata, PropertyName};

/// Metadata for `name` on `object`, trying each class candidate the
/// document imports allow
pub fn property_metadata(
    catalog: &dyn MetadataCatalog,
    document: &FxomDocument,
    object: ObjectId,
    name: &PropertyName,
) -> Option<PropertyMetadata> {
    let type_name = document.object(object)?.type_name()?;
    document
        .class_context()
        .resolve(type_name)
        .iter()
        .find_map(|candidate| catalog.property(candidate, name))
}

fn default_property(
    catalog: &dyn MetadataCatalog,
    document: &FxomDocument,
    object: ObjectId,
) -> Option<PropertyName> {
    let type_name = document.object(object)?.type_name()?;
    document
        .class_context()
        .resolve(type_name)
        .iter()
        .find_map(|candidate| catalog.default_property(candidate))
}

fn label(document: &FxomDocument, object: ObjectId) -> String {
    document
        .object(object)
        .map(|o| o.label())
        .unwrap_or_default()
}

/// Inserts a detached `object` under `parent` and selects it.
///
/// Instances receive it in `property`, or in their default property when
/// `None`; the property is created when missing. Collections and
/// `fx:define` take it as an item.
pub fn insert_as_sub_component(
    object: ObjectId,
    parent: ObjectId,
    property: Option<PropertyName>,
    index: Option<usize>,
    catalog: &dyn MetadataCatalog,
    state: &mut EditorState,
) -> Job {
    let document = &mut state.document;
    let description = format!("Insert {}", label(document, object));
    let mut jobs: Vec<Job> = Vec::new();

    if document.object(parent).is_some_and(|p| p.is_container()) {
        jobs.push(AddCollectionItemJob::new(object, parent, index).into());
    } else if let Some(name) = property.or_else(|| default_property(catalog, document, parent)) {
        match document.find_property(parent, &name) {
            Some(existing) => {
                jobs.push(AddPropertyValueJob::new(object, existing, index).into());
            }
            None => {
                let created = document.create_collection_property(name);
                jobs.push(AddPropertyValueJob::new(object, created, None).into());
                jobs.push(AddPropertyJob::new(created, parent, None).into());
            }
        }
    }
    if !jobs.is_empty() {
        jobs.push(UpdateSelectionJob::new(SelectionGroup::objects([object])).into());
    }

    BatchJob::new("Insert", jobs, state)
        .with_description(description)
        .into()
}

/// Sets property `name` on every selected instance, as one undo unit
pub fn modify_selection(
    name: &PropertyName,
    value: Option<String>,
    catalog: &dyn MetadataCatalog,
    state: &EditorState,
) -> Job {
    let document = &state.document;
    let jobs: Vec<Job> = state
        .selection
        .group()
        .items()
        .into_iter()
        .filter(|item| document.object(*item).is_some_and(|o| o.is_instance()))
        .map(|item| {
            let metadata = property_metadata(catalog, document, item, name)
                .unwrap_or_else(|| PropertyMetadata::new(name.clone()));
            ModifyObjectJob::new(item, metadata, value.clone()).into()
        })
        .collect();

    BatchJob::new("Modify", jobs, state)
        .with_description(format!("Set {}", name))
        .into()
}

/// Deletes what is selected and clears the selection, repairing references
/// afterwards.
pub fn delete_selection(catalog: &dyn MetadataCatalog, state: &EditorState) -> Job {
    let batch = match state.selection.group() {
        SelectionGroup::Objects(_) => delete_objects(state),
        SelectionGroup::Grid(group) => delete_grid_lines(group, catalog, state),
    };
    UpdateReferencesJob::new(batch).into()
}

fn delete_objects(state: &EditorState) -> BatchJob {
    let document = &state.document;
    let items = state.selection.group().top_most_items(document);
    let description = match items.as_slice() {
        [single] => format!("Delete {}", label(document, *single)),
        items => format!("Delete {} objects", items.len()),
    };

    // Placeholders go first so a deleted target is not handed over to a
    // reference that is about to disappear too
    let (placeholders, objects): (Vec<ObjectId>, Vec<ObjectId>) =
        items.iter().copied().partition(|item| is_reference_placeholder(document, *item));
    let mut jobs: Vec<Job> = placeholders
        .into_iter()
        .chain(objects)
        .map(|item| DeleteObjectJob::new(item).into())
        .collect();
    if !jobs.is_empty() {
        jobs.push(UpdateSelectionJob::new(SelectionGroup::empty()).into());
    }
    BatchJob::new("Delete", jobs, state).with_description(description)
}

fn is_reference_placeholder(document: &FxomDocument, object: ObjectId) -> bool {
    document
        .object(object)
        .and_then(|o| o.as_intrinsic())
        .is_some_and(|intrinsic| intrinsic.kind.targets_fx_id())
}

/// Removes the children sitting on the selected rows or columns and shifts
/// the later ones back.
fn delete_grid_lines(
    group: &GridSelectionGroup,
    catalog: &dyn MetadataCatalog,
    state: &EditorState,
) -> BatchJob {
    let document = &state.document;
    let grid = group.grid();
    let grid_type = document
        .object(grid)
        .and_then(|o| o.type_name())
        .unwrap_or("GridPane");
    let name = group.feature().index_property(grid_type);

    let mut jobs: Vec<Job> = Vec::new();
    if document.object(grid).is_some() {
        for child in document.child_objects(grid) {
            let index = document
                .text_of(child, &name)
                .and_then(|text| text.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if group.indexes().contains(&index) {
                jobs.push(DeleteObjectJob::new(child).into());
                continue;
            }
            let shift = group.indexes().range(..index).count();
            if shift > 0 {
                let metadata = property_metadata(catalog, document, child, &name)
                    .unwrap_or_else(|| PropertyMetadata::new(name.clone()).with_default("0"));
                let value = (index - shift).to_string();
                jobs.push(ModifyObjectJob::new(child, metadata, Some(value)).into());
            }
        }
    }
    jobs.push(UpdateSelectionJob::new(SelectionGroup::empty()).into());

    let description = match group.feature() {
        GridFeature::Row => "Delete Rows",
        GridFeature::Column => "Delete Columns",
    };
    BatchJob::new("Delete", jobs, state).with_description(description)
}

/// Moves `object` under `target`, repairing references afterwards
pub fn relocate_object(object: ObjectId, target: RelocateTarget, index: Option<usize>) -> Job {
    UpdateReferencesJob::new(RelocateObjectJob::new(object, target, index)).into()
}

/// Clones the selected objects next to their originals and selects the
/// clones
pub fn duplicate_selection(state: &EditorState) -> Job {
    DuplicateSelectionJob::new(state).into()
}
