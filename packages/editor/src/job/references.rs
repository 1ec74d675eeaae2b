//! Moving objects between their declaration and the places that name them.
//!
//! Expanding a reference puts the target where the reference was and leaves
//! an `fx:reference` behind at the target's old slot. Combining is the
//! inverse. Both keep every id declared before it is used.

use super::{
    AddPropertyValueJob, Job, JobOp, RemoveObjectJob, RemovePropertyValueJob, ReplaceObjectJob,
    ReplacePropertyJob, SubJobs,
};
use crate::state::EditorState;
use fxom_model::{
    walk_document, walk_object, walk_property, FxomCloner, FxomDocument, IntrinsicKind, ObjectId,
    PropertyId, ReferenceSite, Visitor,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument, warn};

fn intrinsic_kind(document: &FxomDocument, object: ObjectId) -> Option<IntrinsicKind> {
    Some(document.object(object)?.as_intrinsic()?.kind)
}

/// Target object of a site, provided it can be moved
fn movable_target(document: &FxomDocument, site: ReferenceSite) -> Option<ObjectId> {
    let target = document.resolve_reference(site)?;
    document.parent_link(target).is_some().then_some(target)
}

/// First `fx:reference` to `fx_id` that sits outside the subtree of `object`
fn first_reference_outside(
    document: &FxomDocument,
    fx_id: &str,
    object: ObjectId,
) -> Option<ObjectId> {
    document
        .collect_references(Some(fx_id))
        .into_iter()
        .find_map(|site| match site {
            ReferenceSite::Intrinsic(placeholder)
                if intrinsic_kind(document, placeholder) == Some(IntrinsicKind::Reference)
                    && !document.is_ancestor_or_self(object, placeholder) =>
            {
                Some(placeholder)
            }
            _ => None,
        })
}

/// Whether an fx:id declared in the subtree of `object` is named from
/// outside that subtree
fn referenced_from_outside(document: &FxomDocument, object: ObjectId) -> bool {
    document.fx_ids_in(object).iter().any(|fx_id| {
        document
            .collect_references(Some(fx_id.as_str()))
            .iter()
            .filter_map(|site| site.holder(document))
            .any(|holder| !document.is_ancestor_or_self(object, holder))
    })
}

/// Replaces an `fx:reference` or `fx:copy` placeholder with its target.
///
/// A copy gets a fresh clone. A reference takes the target itself, and a new
/// `fx:reference` is left where the target was.
#[derive(Debug)]
pub struct ExpandIntrinsicReferenceJob {
    placeholder: ObjectId,
    sub_jobs: SubJobs,
}

impl ExpandIntrinsicReferenceJob {
    pub fn new(placeholder: ObjectId) -> Self {
        Self {
            placeholder,
            sub_jobs: SubJobs::new(),
        }
    }
}

impl JobOp for ExpandIntrinsicReferenceJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        if document.parent_link(self.placeholder).is_none() {
            return false;
        }
        let site = ReferenceSite::Intrinsic(self.placeholder);
        let target = match intrinsic_kind(document, self.placeholder) {
            Some(IntrinsicKind::Copy) => document.resolve_reference(site),
            Some(IntrinsicKind::Reference) => movable_target(document, site),
            _ => None,
        };
        target.is_some_and(|target| !document.is_ancestor_or_self(target, self.placeholder))
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.sub_jobs.clear();
        let site = ReferenceSite::Intrinsic(self.placeholder);
        let document = &mut state.document;
        let fx_id = site
            .target(document)
            .map(str::to_string)
            .unwrap_or_else(|| panic!("{:?} does not name an fx:id", self.placeholder));
        let target = document
            .search_with_fx_id(&fx_id)
            .unwrap_or_else(|| panic!("`{}` is not declared", fx_id));

        if intrinsic_kind(document, self.placeholder) == Some(IntrinsicKind::Copy) {
            let clone = FxomCloner::new(document).clone_object(document, target);
            self.sub_jobs
                .run(ReplaceObjectJob::new(self.placeholder, clone), state);
        } else {
            let stub = document.create_intrinsic(IntrinsicKind::Reference, fx_id);
            self.sub_jobs.run(ReplaceObjectJob::new(target, stub), state);
            self.sub_jobs
                .run(ReplaceObjectJob::new(self.placeholder, target), state);
        }
    }

    fn undo(&mut self, state: &mut EditorState) {
        self.sub_jobs.undo_all(state);
    }

    fn redo(&mut self, state: &mut EditorState) {
        self.sub_jobs.redo_all(state);
    }

    fn description(&self) -> String {
        "Expand Reference".to_string()
    }
}

/// Turns a `$id` text property into a collection property holding the
/// target, leaving an `fx:reference` at the target's old slot.
#[derive(Debug)]
pub struct ExpandExpressionReferenceJob {
    property: PropertyId,
    sub_jobs: SubJobs,
}

impl ExpandExpressionReferenceJob {
    pub fn new(property: PropertyId) -> Self {
        Self {
            property,
            sub_jobs: SubJobs::new(),
        }
    }
}

impl JobOp for ExpandExpressionReferenceJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        let Some(owner) = document.property(self.property).and_then(|p| p.owner()) else {
            return false;
        };
        movable_target(document, ReferenceSite::Expression(self.property))
            .is_some_and(|target| !document.is_ancestor_or_self(target, owner))
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.sub_jobs.clear();
        let site = ReferenceSite::Expression(self.property);
        let document = &mut state.document;
        let fx_id = site
            .target(document)
            .map(str::to_string)
            .unwrap_or_else(|| panic!("{:?} is not an expression reference", self.property));
        let target = document
            .search_with_fx_id(&fx_id)
            .unwrap_or_else(|| panic!("`{}` is not declared", fx_id));
        let name = document[self.property].name().clone();

        let stub = document.create_intrinsic(IntrinsicKind::Reference, fx_id);
        let collection = document.create_collection_property(name);
        self.sub_jobs.run(ReplaceObjectJob::new(target, stub), state);
        self.sub_jobs
            .run(ReplacePropertyJob::new(self.property, collection), state);
        self.sub_jobs
            .run(AddPropertyValueJob::new(target, collection, None), state);
    }

    fn undo(&mut self, state: &mut EditorState) {
        self.sub_jobs.undo_all(state);
    }

    fn redo(&mut self, state: &mut EditorState) {
        self.sub_jobs.redo_all(state);
    }

    fn description(&self) -> String {
        "Expand Reference".to_string()
    }
}

/// Expansion job matching the kind of `site`
pub fn expand_reference(site: ReferenceSite) -> Job {
    match site {
        ReferenceSite::Intrinsic(placeholder) => ExpandIntrinsicReferenceJob::new(placeholder).into(),
        ReferenceSite::Expression(property) => ExpandExpressionReferenceJob::new(property).into(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CombineMode {
    /// Move the object into the first `fx:reference` to its id
    Reference,
    /// Replace the object with an `fx:copy` of `target`
    Copy { target: String },
}

/// How an object can be folded back into a reference, when it can
pub fn combine_mode(document: &FxomDocument, object: ObjectId) -> Option<CombineMode> {
    let fx_id = document.object(object)?.fx_id()?;
    first_reference_outside(document, fx_id, object).map(|_| CombineMode::Reference)
}

/// Folds an object back into a placeholder
#[derive(Debug)]
pub struct CombineIntrinsicReferenceJob {
    object: ObjectId,
    mode: CombineMode,
    sub_jobs: SubJobs,
}

impl CombineIntrinsicReferenceJob {
    pub fn new(object: ObjectId, mode: CombineMode) -> Self {
        Self {
            object,
            mode,
            sub_jobs: SubJobs::new(),
        }
    }
}

impl JobOp for CombineIntrinsicReferenceJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        if document.parent_link(self.object).is_none() {
            return false;
        }
        match &self.mode {
            CombineMode::Reference => document[self.object]
                .fx_id()
                .and_then(|fx_id| first_reference_outside(document, fx_id, self.object))
                .is_some(),
            // The replaced subtree must not take referenced ids with it
            CombineMode::Copy { target } => {
                document
                    .search_with_fx_id(target)
                    .is_some_and(|target| !document.is_ancestor_or_self(self.object, target))
                    && !referenced_from_outside(document, self.object)
            }
        }
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.sub_jobs.clear();
        let document = &mut state.document;
        match &self.mode {
            CombineMode::Reference => {
                let fx_id = document[self.object]
                    .fx_id()
                    .map(str::to_string)
                    .unwrap_or_else(|| panic!("{:?} has no fx:id", self.object));
                let placeholder = first_reference_outside(document, &fx_id, self.object)
                    .unwrap_or_else(|| panic!("`{}` is not referenced", fx_id));
                let stub = document.create_intrinsic(IntrinsicKind::Reference, fx_id);
                self.sub_jobs
                    .run(ReplaceObjectJob::new(self.object, stub), state);
                self.sub_jobs
                    .run(ReplaceObjectJob::new(placeholder, self.object), state);
            }
            CombineMode::Copy { target } => {
                let copy = document.create_intrinsic(IntrinsicKind::Copy, target.clone());
                self.sub_jobs
                    .run(ReplaceObjectJob::new(self.object, copy), state);
            }
        }
    }

    fn undo(&mut self, state: &mut EditorState) {
        self.sub_jobs.undo_all(state);
    }

    fn redo(&mut self, state: &mut EditorState) {
        self.sub_jobs.redo_all(state);
    }

    fn description(&self) -> String {
        "Combine Reference".to_string()
    }
}

/// Inverse of [`ExpandExpressionReferenceJob`]: the single value of a
/// collection property moves to the first `fx:reference` to its id and the
/// property becomes `$id` again.
#[derive(Debug)]
pub struct CombineExpressionReferenceJob {
    value: ObjectId,
    sub_jobs: SubJobs,
}

impl CombineExpressionReferenceJob {
    pub fn new(value: ObjectId) -> Self {
        Self {
            value,
            sub_jobs: SubJobs::new(),
        }
    }
}

impl JobOp for CombineExpressionReferenceJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        let Some(fx_id) = document.object(self.value).and_then(|o| o.fx_id()) else {
            return false;
        };
        let Some(property) = document.parent_property(self.value).and_then(|p| document.property(p))
        else {
            return false;
        };
        property.owner().is_some()
            && property.values() == [self.value]
            && first_reference_outside(document, fx_id, self.value).is_some()
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.sub_jobs.clear();
        let document = &mut state.document;
        let fx_id = document[self.value]
            .fx_id()
            .map(str::to_string)
            .unwrap_or_else(|| panic!("{:?} has no fx:id", self.value));
        let collection = document
            .parent_property(self.value)
            .unwrap_or_else(|| panic!("{:?} is not a property value", self.value));
        let placeholder = first_reference_outside(document, &fx_id, self.value)
            .unwrap_or_else(|| panic!("`{}` is not referenced", fx_id));
        let name = document[collection].name().clone();
        let text = document.create_text_property(name, format!("${}", fx_id));

        self.sub_jobs
            .run(RemovePropertyValueJob::new(self.value), state);
        self.sub_jobs
            .run(ReplacePropertyJob::new(collection, text), state);
        self.sub_jobs
            .run(ReplaceObjectJob::new(placeholder, self.value), state);
    }

    fn undo(&mut self, state: &mut EditorState) {
        self.sub_jobs.undo_all(state);
    }

    fn redo(&mut self, state: &mut EditorState) {
        self.sub_jobs.redo_all(state);
    }

    fn description(&self) -> String {
        "Combine Reference".to_string()
    }
}

/// Removes an object whose fx:id is still referenced from elsewhere.
///
/// Copies of the object are expanded first. The object then moves into its
/// first remaining reference: an `fx:reference` slot or a `$id` property.
/// Without one it is simply removed.
#[derive(Debug)]
pub struct DeleteRefereeObjectJob {
    object: ObjectId,
    sub_jobs: SubJobs,
}

impl DeleteRefereeObjectJob {
    pub fn new(object: ObjectId) -> Self {
        Self {
            object,
            sub_jobs: SubJobs::new(),
        }
    }

    fn outside_sites(&self, document: &FxomDocument, fx_id: &str) -> Vec<ReferenceSite> {
        document
            .collect_references(Some(fx_id))
            .into_iter()
            .filter(|site| {
                site.holder(document)
                    .is_some_and(|holder| !document.is_ancestor_or_self(self.object, holder))
            })
            .collect()
    }
}

impl JobOp for DeleteRefereeObjectJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        document.parent_link(self.object).is_some()
            && document.object(self.object).is_some_and(|o| o.fx_id().is_some())
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.sub_jobs.clear();
        let fx_id = state.document[self.object]
            .fx_id()
            .map(str::to_string)
            .unwrap_or_else(|| panic!("{:?} has no fx:id", self.object));

        let copies: Vec<ReferenceSite> = self
            .outside_sites(&state.document, &fx_id)
            .into_iter()
            .filter(|site| site.is_copy(&state.document))
            .collect();
        for site in copies {
            self.sub_jobs.run(expand_reference(site), state);
        }

        let strong = self.outside_sites(&state.document, &fx_id).into_iter().next();
        self.sub_jobs.run(RemoveObjectJob::new(self.object), state);
        match strong {
            None => {}
            Some(ReferenceSite::Intrinsic(placeholder)) => {
                self.sub_jobs
                    .run(ReplaceObjectJob::new(placeholder, self.object), state);
            }
            Some(ReferenceSite::Expression(property)) => {
                let name = state.document[property].name().clone();
                let collection = state.document.create_collection_property(name);
                self.sub_jobs
                    .run(ReplacePropertyJob::new(property, collection), state);
                self.sub_jobs
                    .run(AddPropertyValueJob::new(self.object, collection, None), state);
            }
        }
    }

    fn undo(&mut self, state: &mut EditorState) {
        self.sub_jobs.undo_all(state);
    }

    fn redo(&mut self, state: &mut EditorState) {
        self.sub_jobs.redo_all(state);
    }

    fn description(&self) -> String {
        "Delete".to_string()
    }
}

/// Sorts reference sites into forward and dangling ones in a single
/// document-order pass.
struct ReferenceScan {
    all_ids: BTreeMap<String, ObjectId>,
    declared: HashSet<String>,
    forward: Vec<ReferenceSite>,
    dangling: Vec<ReferenceSite>,
}

impl ReferenceScan {
    fn run(document: &FxomDocument) -> Self {
        let mut scan = Self {
            all_ids: document.collect_fx_ids(),
            declared: HashSet::new(),
            forward: Vec::new(),
            dangling: Vec::new(),
        };
        walk_document(&mut scan, document);
        scan
    }

    fn classify(&mut self, document: &FxomDocument, site: ReferenceSite) {
        let Some(target) = site.target(document) else {
            return;
        };
        if self.declared.contains(target) {
            return;
        }
        if self.all_ids.contains_key(target) {
            self.forward.push(site);
        } else {
            self.dangling.push(site);
        }
    }
}

impl Visitor for ReferenceScan {
    fn visit_object(&mut self, document: &FxomDocument, object: ObjectId) {
        let node = &document[object];
        if let Some(fx_id) = node.fx_id() {
            self.declared.insert(fx_id.to_string());
        }
        if node.as_intrinsic().is_some() {
            self.classify(document, ReferenceSite::Intrinsic(object));
        }
        walk_object(self, document, object);
    }

    fn visit_property(&mut self, document: &FxomDocument, property: PropertyId) {
        if document[property].is_text() {
            self.classify(document, ReferenceSite::Expression(property));
        }
        walk_property(self, document, property);
    }
}

/// Repairs references after an edit.
///
/// A reference used before its declaration is expanded so the declaration
/// moves up to it. References to ids that no longer exist anywhere are left
/// in place and reported.
pub struct ReferencesUpdater<'a> {
    fixes: &'a mut SubJobs,
}

impl<'a> ReferencesUpdater<'a> {
    pub fn new(fixes: &'a mut SubJobs) -> Self {
        Self { fixes }
    }

    /// Runs the repairs, recording them, and returns the sites left
    /// unresolved.
    #[instrument(skip_all)]
    pub fn update(&mut self, state: &mut EditorState) -> Vec<ReferenceSite> {
        let limit = state.document.collect_references(None).len() + 1;
        let mut stuck: Vec<ReferenceSite> = Vec::new();

        for _ in 0..limit {
            let scan = ReferenceScan::run(&state.document);
            let Some(site) = scan.forward.into_iter().find(|site| !stuck.contains(site)) else {
                for site in &scan.dangling {
                    warn!(
                        target_id = site.target(&state.document).unwrap_or_default(),
                        "dangling reference"
                    );
                }
                let mut unresolved = scan.dangling;
                unresolved.extend(stuck);
                return unresolved;
            };

            let job = expand_reference(site);
            if job.is_executable(state) {
                debug!(
                    target_id = site.target(&state.document).unwrap_or_default(),
                    "expanding forward reference"
                );
                self.fixes.run(job, state);
            } else {
                warn!(?site, "forward reference cannot be expanded");
                stuck.push(site);
            }
        }

        warn!(limit, "reference repair did not settle");
        state.document.unresolved_references()
    }
}

/// Runs a job and then repairs the references it broke
#[derive(Debug)]
pub struct UpdateReferencesJob {
    job: Box<Job>,
    fixes: SubJobs,
    unresolved: Vec<ReferenceSite>,
}

impl UpdateReferencesJob {
    pub fn new(job: impl Into<Job>) -> Self {
        Self {
            job: Box::new(job.into()),
            fixes: SubJobs::new(),
            unresolved: Vec::new(),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Repairs recorded by the last execution
    pub fn fixes(&self) -> &[Job] {
        self.fixes.jobs()
    }

    /// Sites the last execution could not resolve
    pub fn unresolved(&self) -> &[ReferenceSite] {
        &self.unresolved
    }
}

impl JobOp for UpdateReferencesJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        self.job.is_executable(state)
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.fixes.clear();
        self.job.execute(state);
        self.unresolved = ReferencesUpdater::new(&mut self.fixes).update(state);
    }

    fn undo(&mut self, state: &mut EditorState) {
        self.fixes.undo_all(state);
        self.job.undo(state);
    }

    fn redo(&mut self, state: &mut EditorState) {
        self.job.redo(state);
        self.fixes.redo_all(state);
    }

    fn description(&self) -> String {
        self.job.description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::ReIndexObjectJob;
    use fxom_model::{check_invariants, NodeSnapshot, PropertyName};

    /// VBox
    ///   children: Button#ok, Label(labelFor=$ok), fx:reference(ok)
    fn state() -> EditorState {
        let root = NodeSnapshot::instance("VBox").with_objects(
            "children",
            vec![
                NodeSnapshot::instance("Button").with_fx_id("ok"),
                NodeSnapshot::instance("Label").with_text("labelFor", "$ok"),
                NodeSnapshot::intrinsic(IntrinsicKind::Reference, "ok"),
            ],
        );
        EditorState::new(FxomDocument::from_snapshot(Some(&root)))
    }

    fn children(state: &EditorState) -> Vec<ObjectId> {
        let root = state.document.root().unwrap();
        state.document.child_objects(root)
    }

    fn label_for(state: &EditorState) -> PropertyId {
        let label = children(state)[1];
        state
            .document
            .find_property(label, &PropertyName::new("labelFor"))
            .unwrap()
    }

    #[test]
    fn test_expand_then_combine_intrinsic_reference() {
        let mut state = state();
        let before = state.document.snapshot();
        let ok = state.document.search_with_fx_id("ok").unwrap();
        let placeholder = children(&state)[2];

        let mut expand = ExpandIntrinsicReferenceJob::new(placeholder);
        assert!(expand.is_executable(&state));
        expand.execute(&mut state);
        assert_eq!(children(&state)[2], ok);
        assert_eq!(
            intrinsic_kind(&state.document, children(&state)[0]),
            Some(IntrinsicKind::Reference)
        );
        check_invariants(&state.document).unwrap();

        assert_eq!(combine_mode(&state.document, ok), Some(CombineMode::Reference));
        let mut combine = CombineIntrinsicReferenceJob::new(ok, CombineMode::Reference);
        assert!(combine.is_executable(&state));
        combine.execute(&mut state);
        assert_eq!(state.document.snapshot(), before);

        combine.undo(&mut state);
        expand.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);
    }

    #[test]
    fn test_expand_copy_clones_with_fresh_id() {
        let root = NodeSnapshot::instance("VBox").with_objects(
            "children",
            vec![
                NodeSnapshot::instance("Button").with_fx_id("ok"),
                NodeSnapshot::intrinsic(IntrinsicKind::Copy, "ok"),
            ],
        );
        let mut state = EditorState::new(FxomDocument::from_snapshot(Some(&root)));
        let before = state.document.snapshot();
        let copy = children(&state)[1];

        let mut job = ExpandIntrinsicReferenceJob::new(copy);
        assert!(job.is_executable(&state));
        job.execute(&mut state);
        let clone = children(&state)[1];
        assert_eq!(state.document[clone].type_name(), Some("Button"));
        assert_eq!(state.document[clone].fx_id(), Some("ok1"));

        job.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);
        job.redo(&mut state);
        assert_eq!(children(&state)[1], clone);
    }

    #[test]
    fn test_expand_then_combine_expression_reference() {
        let mut state = state();
        let before = state.document.snapshot();
        let ok = state.document.search_with_fx_id("ok").unwrap();
        let property = label_for(&state);

        let job = expand_reference(ReferenceSite::Expression(property));
        let Job::ExpandExpressionReference(mut expand) = job else {
            panic!("expected an expression expansion");
        };
        assert!(expand.is_executable(&state));
        expand.execute(&mut state);
        let label = children(&state)[1];
        assert_eq!(state.document.parent_object(ok), Some(label));
        check_invariants(&state.document).unwrap();

        let mut combine = CombineExpressionReferenceJob::new(ok);
        assert!(combine.is_executable(&state));
        combine.execute(&mut state);
        assert_eq!(state.document.snapshot(), before);
    }

    #[test]
    fn test_combine_then_expand_intrinsic_reference() {
        let mut state = state();
        let before = state.document.snapshot();
        let ok = state.document.search_with_fx_id("ok").unwrap();

        let mut combine = CombineIntrinsicReferenceJob::new(ok, CombineMode::Reference);
        assert!(combine.is_executable(&state));
        combine.execute(&mut state);
        assert_eq!(children(&state)[2], ok);
        let stub = children(&state)[0];
        assert_eq!(intrinsic_kind(&state.document, stub), Some(IntrinsicKind::Reference));

        let mut expand = ExpandIntrinsicReferenceJob::new(stub);
        assert!(expand.is_executable(&state));
        expand.execute(&mut state);
        assert_eq!(children(&state)[0], ok);
        assert_eq!(state.document.snapshot(), before);

        expand.undo(&mut state);
        combine.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);
    }

    fn without_fx_ids(mut snapshot: NodeSnapshot) -> NodeSnapshot {
        snapshot.for_each_mut(&mut |node| {
            if let NodeSnapshot::Instance { fx_id, .. }
            | NodeSnapshot::Collection { fx_id, .. }
            | NodeSnapshot::Intrinsic { fx_id, .. } = node
            {
                *fx_id = None;
            }
        });
        snapshot
    }

    #[test]
    fn test_combine_then_expand_copy() {
        let root = NodeSnapshot::instance("VBox").with_objects(
            "children",
            vec![
                NodeSnapshot::instance("Label").with_fx_id("title").with_text("text", "Hi"),
                NodeSnapshot::instance("Label").with_text("text", "Hi"),
            ],
        );
        let mut state = EditorState::new(FxomDocument::from_snapshot(Some(&root)));
        let before = state.document.snapshot();
        let duplicate = children(&state)[1];
        let original = state.document.snapshot_object(duplicate);

        let mode = CombineMode::Copy {
            target: "title".to_string(),
        };
        let mut combine = CombineIntrinsicReferenceJob::new(duplicate, mode);
        assert!(combine.is_executable(&state));
        combine.execute(&mut state);
        let copy = children(&state)[1];
        assert_eq!(intrinsic_kind(&state.document, copy), Some(IntrinsicKind::Copy));
        assert!(!state.document.is_attached(duplicate));

        let mut expand = ExpandIntrinsicReferenceJob::new(copy);
        assert!(expand.is_executable(&state));
        expand.execute(&mut state);
        let clone = children(&state)[1];
        assert_ne!(state.document[clone].fx_id(), Some("title"));
        assert_eq!(
            without_fx_ids(state.document.snapshot_object(clone)),
            without_fx_ids(original)
        );
        check_invariants(&state.document).unwrap();

        expand.undo(&mut state);
        combine.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);
        assert_eq!(children(&state)[1], duplicate);
    }

    #[test]
    fn test_copy_combine_refuses_referenced_subtree() {
        // `ok` is named by labelFor, so replacing it with a copy would
        // leave that reference dangling
        let root = NodeSnapshot::instance("VBox").with_objects(
            "children",
            vec![
                NodeSnapshot::instance("Button").with_fx_id("cancel"),
                NodeSnapshot::instance("Button").with_fx_id("ok"),
                NodeSnapshot::instance("Label").with_text("labelFor", "$ok"),
            ],
        );
        let state = EditorState::new(FxomDocument::from_snapshot(Some(&root)));
        let ok = state.document.search_with_fx_id("ok").unwrap();
        let cancel = state.document.search_with_fx_id("cancel").unwrap();
        let mode = CombineMode::Copy {
            target: "cancel".to_string(),
        };

        assert!(!CombineIntrinsicReferenceJob::new(ok, mode).is_executable(&state));
        let mode = CombineMode::Copy {
            target: "ok".to_string(),
        };
        assert!(CombineIntrinsicReferenceJob::new(cancel, mode).is_executable(&state));
    }

    #[test]
    fn test_combine_then_expand_expression_reference() {
        let root = NodeSnapshot::instance("VBox").with_objects(
            "children",
            vec![
                NodeSnapshot::instance("Label").with_objects(
                    "labelFor",
                    vec![NodeSnapshot::instance("Button").with_fx_id("ok")],
                ),
                NodeSnapshot::intrinsic(IntrinsicKind::Reference, "ok"),
            ],
        );
        let mut state = EditorState::new(FxomDocument::from_snapshot(Some(&root)));
        let before = state.document.snapshot();
        let ok = state.document.search_with_fx_id("ok").unwrap();
        let label = children(&state)[0];
        let name = PropertyName::new("labelFor");

        let mut combine = CombineExpressionReferenceJob::new(ok);
        assert!(combine.is_executable(&state));
        combine.execute(&mut state);
        assert_eq!(children(&state)[1], ok);
        assert_eq!(state.document.text_of(label, &name), Some("$ok"));

        let property = state.document.find_property(label, &name).unwrap();
        let mut expand = ExpandExpressionReferenceJob::new(property);
        assert!(expand.is_executable(&state));
        expand.execute(&mut state);
        assert_eq!(state.document.parent_object(ok), Some(label));
        assert_eq!(state.document.snapshot(), before);

        expand.undo(&mut state);
        combine.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);
    }

    #[test]
    fn test_reference_inside_target_cannot_expand() {
        let root = NodeSnapshot::instance("VBox").with_fx_id("box").with_objects(
            "children",
            vec![NodeSnapshot::intrinsic(IntrinsicKind::Reference, "box")],
        );
        let state = EditorState::new(FxomDocument::from_snapshot(Some(&root)));
        let placeholder = children(&state)[0];
        assert!(!ExpandIntrinsicReferenceJob::new(placeholder).is_executable(&state));
    }

    #[test]
    fn test_delete_referee_moves_into_first_reference() {
        let mut state = state();
        let before = state.document.snapshot();
        let ok = state.document.search_with_fx_id("ok").unwrap();

        let mut job = DeleteRefereeObjectJob::new(ok);
        assert!(job.is_executable(&state));
        job.execute(&mut state);

        // The expression came first, so the button now lives in labelFor
        let label = children(&state)[0];
        assert_eq!(state.document.parent_object(ok), Some(label));
        assert_eq!(children(&state).len(), 2);
        assert!(state.document.unresolved_references().is_empty());
        check_invariants(&state.document).unwrap();

        job.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);
    }

    #[test]
    fn test_update_references_repairs_forward_reference() {
        let root = NodeSnapshot::instance("VBox").with_objects(
            "children",
            vec![
                NodeSnapshot::instance("Button").with_fx_id("ok"),
                NodeSnapshot::intrinsic(IntrinsicKind::Reference, "ok"),
            ],
        );
        let mut state = EditorState::new(FxomDocument::from_snapshot(Some(&root)));
        let before = state.document.snapshot();
        let ok = state.document.search_with_fx_id("ok").unwrap();
        let placeholder = children(&state)[1];

        let mut job = UpdateReferencesJob::new(ReIndexObjectJob::new(ok, None));
        assert!(job.is_executable(&state));
        job.execute(&mut state);

        assert_eq!(job.fixes().len(), 1);
        assert!(job.unresolved().is_empty());
        assert_eq!(children(&state)[0], ok);
        assert_eq!(state.document.snapshot(), before);

        job.undo(&mut state);
        assert_eq!(children(&state), vec![ok, placeholder]);
    }

    #[test]
    fn test_update_references_reports_dangling() {
        let mut state = state();
        let ok = state.document.search_with_fx_id("ok").unwrap();

        let mut job = UpdateReferencesJob::new(RemoveObjectJob::new(ok));
        job.execute(&mut state);

        assert!(job.fixes().is_empty());
        assert_eq!(job.unresolved().len(), 2);
        assert_eq!(job.description(), "Remove");
    }
}
