//! # Edit Session Management
//!
//! One open document together with its selection, history and metadata.
//!
//! The session is the entry point for callers: commands are built against
//! [`EditSession::state`] and handed back to [`EditSession::perform`], which
//! checks them and records them for undo.

use crate::commands;
use crate::config::EditorConfig;
use crate::errors::EditorResult;
use crate::job::{Job, JobOp, SetFxomRootJob};
use crate::job_manager::JobManager;
use crate::selection::Selection;
use crate::state::EditorState;
use fxom_model::{
    check_invariants, FxomCloner, FxomDocument, MetadataCatalog, ObjectId, PropertyName,
};
use std::sync::Arc;
use tracing::{debug, info};

pub struct EditSession {
    state: EditorState,
    jobs: JobManager,
    metadata: Arc<dyn MetadataCatalog>,
    config: EditorConfig,
}

impl EditSession {
    pub fn new(
        document: FxomDocument,
        metadata: Arc<dyn MetadataCatalog>,
        config: EditorConfig,
    ) -> Self {
        Self {
            state: EditorState::new(document),
            jobs: JobManager::with_max_levels(config.max_undo_levels),
            metadata,
            config,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Direct access for building commands that create detached nodes.
    /// Edits made here bypass the history.
    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn document(&self) -> &FxomDocument {
        &self.state.document
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    /// Selection changes made here are not recorded for undo
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.state.selection
    }

    pub fn jobs(&self) -> &JobManager {
        &self.jobs
    }

    pub fn metadata(&self) -> &dyn MetadataCatalog {
        self.metadata.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Executes `job` and records it, without checking it first
    pub fn push(&mut self, job: Job) {
        self.jobs.push(job, &mut self.state);
    }

    /// Executes `job` when it applies. Returns whether it ran.
    pub fn perform(&mut self, job: Job) -> bool {
        if !job.is_executable(&self.state) {
            debug!(job = %job.description(), "not executable");
            return false;
        }
        self.push(job);
        true
    }

    pub fn undo(&mut self) -> bool {
        self.jobs.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> bool {
        self.jobs.redo(&mut self.state)
    }

    /// Replaces the document wholesale. History and selection are reset.
    pub fn load_document(&mut self, document: FxomDocument) {
        info!(objects = document.object_count(), "loading document");
        self.state = EditorState::new(document);
        self.jobs.clear();
    }

    /// Copies the root of `source` into this document, under `parent` in
    /// `property` (the default property when `None`). On an empty document
    /// the copy becomes the root. Returns whether anything was inserted.
    pub fn insert_document(
        &mut self,
        source: &FxomDocument,
        parent: Option<ObjectId>,
        property: Option<PropertyName>,
    ) -> bool {
        let Some(source_root) = source.root() else {
            return false;
        };
        let document = &mut self.state.document;
        let copy = FxomCloner::new(document).import(document, source, source_root);

        let job = match (document.root(), parent) {
            (None, _) => SetFxomRootJob::new(Some(copy)).into(),
            (Some(root), parent) => commands::insert_as_sub_component(
                copy,
                parent.unwrap_or(root),
                property,
                None,
                self.metadata.as_ref(),
                &mut self.state,
            ),
        };
        self.perform(job)
    }

    /// Checks the tree invariants of the current document
    pub fn verify(&self) -> EditorResult<()> {
        check_invariants(&self.state.document)?;
        Ok(())
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("state", &self.state)
            .field("jobs", &self.jobs)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxom_model::{InMemoryCatalog, NodeSnapshot};

    fn session() -> EditSession {
        let catalog = InMemoryCatalog::new().with_default_property("VBox", "children");
        EditSession::new(FxomDocument::new(), Arc::new(catalog), EditorConfig::default())
    }

    fn vbox() -> FxomDocument {
        let root = NodeSnapshot::instance("VBox")
            .with_fx_id("box")
            .with_objects("children", vec![NodeSnapshot::instance("Button").with_fx_id("ok")]);
        FxomDocument::from_snapshot(Some(&root))
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert!(session.document().root().is_none());
        assert!(session.selection().is_empty());
        assert_eq!(session.jobs().max_levels(), 100);
    }

    #[test]
    fn test_insert_document_into_empty_sets_root() {
        let mut session = session();
        assert!(session.insert_document(&vbox(), None, None));
        let root = session.document().root().unwrap();
        assert_eq!(session.document()[root].fx_id(), Some("box"));
        session.verify().unwrap();

        assert!(session.undo());
        assert!(session.document().root().is_none());
    }

    #[test]
    fn test_insert_document_regenerates_ids() {
        let mut session = session();
        session.load_document(vbox());
        assert!(session.insert_document(&vbox(), None, None));

        let root = session.document().root().unwrap();
        let children = session.document().child_objects(root);
        assert_eq!(children.len(), 2);
        assert_eq!(session.document()[children[1]].fx_id(), Some("box1"));
        assert!(session.selection().is_selected(children[1]));
        session.verify().unwrap();
    }

    #[test]
    fn test_perform_refuses_inexecutable_jobs() {
        let mut session = session();
        let job: Job = SetFxomRootJob::new(None).into();
        assert!(!session.perform(job));
        assert!(!session.jobs().can_undo());
    }

    #[test]
    fn test_load_document_resets_history() {
        let mut session = session();
        session.insert_document(&vbox(), None, None);
        assert!(session.jobs().can_undo());

        session.load_document(vbox());
        assert!(!session.jobs().can_undo());
        assert!(session.document().search_with_fx_id("ok").is_some());
    }
}
