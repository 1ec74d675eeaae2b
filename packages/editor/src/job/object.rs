use super::{JobOp, RemoveCollectionItemJob, RemovePropertyJob, RemovePropertyValueJob, SubJobs};
use crate::state::EditorState;
use fxom_model::{FxomDocument, ObjectId, ParentLink};

/// Moves an object among its siblings, before `before` or to the end
#[derive(Debug)]
pub struct ReIndexObjectJob {
    object: ObjectId,
    before: Option<ObjectId>,
    old_index: Option<usize>,
}

impl ReIndexObjectJob {
    pub fn new(object: ObjectId, before: Option<ObjectId>) -> Self {
        Self {
            object,
            before,
            old_index: None,
        }
    }

    /// Destination index once the object has left the list
    fn target_index(&self, document: &FxomDocument) -> Option<usize> {
        let siblings: Vec<ObjectId> = document
            .siblings(self.object)
            .iter()
            .copied()
            .filter(|id| *id != self.object)
            .collect();
        match self.before {
            Some(before) => siblings.iter().position(|id| *id == before),
            None => Some(siblings.len()),
        }
    }
}

impl JobOp for ReIndexObjectJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        let Some(current) = document.index_in_parent(self.object) else {
            return false;
        };
        if self.before == Some(self.object) {
            return false;
        }
        self.target_index(document)
            .is_some_and(|target| target != current)
    }

    fn execute(&mut self, state: &mut EditorState) {
        let target = self
            .target_index(&state.document)
            .unwrap_or_else(|| panic!("{:?} is not a sibling of {:?}", self.before, self.object));
        self.old_index = Some(state.document.move_within_parent(self.object, target));
    }

    fn undo(&mut self, state: &mut EditorState) {
        let old_index = self.old_index.expect("undo before execute");
        state.document.move_within_parent(self.object, old_index);
    }

    fn description(&self) -> String {
        "Reorder".to_string()
    }
}

/// Position an object occupied before being replaced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Root,
    Child(ParentLink, usize),
}

/// Puts `replacement` where `original` is; `original` ends up detached
#[derive(Debug)]
pub struct ReplaceObjectJob {
    original: ObjectId,
    replacement: ObjectId,
    slot: Option<Slot>,
}

impl ReplaceObjectJob {
    pub fn new(original: ObjectId, replacement: ObjectId) -> Self {
        Self {
            original,
            replacement,
            slot: None,
        }
    }
}

impl JobOp for ReplaceObjectJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        let (Some(original), Some(replacement)) = (
            document.object(self.original),
            document.object(self.replacement),
        ) else {
            return false;
        };
        if self.original == self.replacement
            || replacement.parent().is_some()
            || document.root() == Some(self.replacement)
        {
            return false;
        }
        if document.root() == Some(self.original) {
            return true;
        }
        if original.parent().is_none() {
            return false;
        }
        // The replacement must not end up inside itself
        document
            .parent_object(self.original)
            .map_or(true, |parent| !document.is_ancestor_or_self(self.replacement, parent))
    }

    fn execute(&mut self, state: &mut EditorState) {
        let document = &mut state.document;
        if document.root() == Some(self.original) {
            document.set_root(Some(self.replacement));
            self.slot = Some(Slot::Root);
        } else {
            let (link, index) = document.remove_from_parent(self.original);
            document.insert_into(link, self.replacement, index);
            self.slot = Some(Slot::Child(link, index));
        }
    }

    fn undo(&mut self, state: &mut EditorState) {
        let document = &mut state.document;
        match self.slot.expect("undo before execute") {
            Slot::Root => {
                document.set_root(Some(self.original));
            }
            Slot::Child(link, index) => {
                document.remove_from_parent(self.replacement);
                document.insert_into(link, self.original, index);
            }
        }
    }

    fn description(&self) -> String {
        "Replace".to_string()
    }
}

#[derive(Debug)]
pub struct SetFxomRootJob {
    root: Option<ObjectId>,
    previous: Option<Option<ObjectId>>,
}

impl SetFxomRootJob {
    pub fn new(root: Option<ObjectId>) -> Self {
        Self {
            root,
            previous: None,
        }
    }
}

impl JobOp for SetFxomRootJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        if document.root() == self.root {
            return false;
        }
        match self.root {
            Some(root) => document
                .object(root)
                .is_some_and(|o| o.parent().is_none() && o.owner() == document.id()),
            None => true,
        }
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.previous = Some(state.document.set_root(self.root));
    }

    fn undo(&mut self, state: &mut EditorState) {
        let previous = self.previous.expect("undo before execute");
        state.document.set_root(previous);
    }

    fn description(&self) -> String {
        match self.root {
            Some(_) => "Set Root".to_string(),
            None => "Clear Document".to_string(),
        }
    }
}

/// Flips `fx:root` on the root instance
#[derive(Debug)]
pub struct ToggleFxRootJob {
    object: ObjectId,
}

impl ToggleFxRootJob {
    pub fn new(object: ObjectId) -> Self {
        Self { object }
    }
}

impl JobOp for ToggleFxRootJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        document.root() == Some(self.object)
            && document.object(self.object).is_some_and(|o| o.is_instance())
    }

    fn execute(&mut self, state: &mut EditorState) {
        let current = state.document[self.object]
            .as_instance()
            .map(|instance| instance.fx_root)
            .unwrap_or(false);
        state.document.set_fx_root(self.object, !current);
    }

    fn undo(&mut self, state: &mut EditorState) {
        self.execute(state);
    }

    fn description(&self) -> String {
        "Toggle fx:root".to_string()
    }
}

/// Detaches an object from wherever it hangs.
///
/// A property value leaves its property (and the property goes when it
/// empties), a collection item leaves its container, the root is cleared.
#[derive(Debug)]
pub struct RemoveObjectJob {
    object: ObjectId,
    sub_jobs: SubJobs,
}

impl RemoveObjectJob {
    pub fn new(object: ObjectId) -> Self {
        Self {
            object,
            sub_jobs: SubJobs::new(),
        }
    }
}

impl JobOp for RemoveObjectJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        document.object(self.object).is_some()
            && (document.parent_link(self.object).is_some()
                || document.root() == Some(self.object))
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.sub_jobs.clear();
        match state.document.parent_link(self.object) {
            Some(ParentLink::Property(property)) => {
                self.sub_jobs
                    .run(RemovePropertyValueJob::new(self.object), state);
                let emptied = state.document[property].values().is_empty()
                    && state.document[property].owner().is_some();
                if emptied {
                    self.sub_jobs.run(RemovePropertyJob::new(property), state);
                }
            }
            Some(ParentLink::Container(_)) => {
                self.sub_jobs
                    .run(RemoveCollectionItemJob::new(self.object), state);
            }
            None => {
                self.sub_jobs.run(SetFxomRootJob::new(None), state);
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
        "Remove".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxom_model::{NodeSnapshot, PropertyName};

    fn state() -> EditorState {
        let root = NodeSnapshot::instance("VBox")
            .with_fx_id("box")
            .with_objects(
                "children",
                vec![
                    NodeSnapshot::instance("Button").with_fx_id("a"),
                    NodeSnapshot::instance("Button").with_fx_id("b"),
                    NodeSnapshot::instance("Button").with_fx_id("c"),
                ],
            )
            .with_objects("top", vec![NodeSnapshot::instance("Label").with_fx_id("title")]);
        EditorState::new(FxomDocument::from_snapshot(Some(&root)))
    }

    fn id(state: &EditorState, fx_id: &str) -> ObjectId {
        state.document.search_with_fx_id(fx_id).unwrap()
    }

    #[test]
    fn test_reindex_before_sibling_and_to_end() {
        let mut state = state();
        let before = state.document.snapshot();
        let (a, b, c) = (id(&state, "a"), id(&state, "b"), id(&state, "c"));
        let root = state.document.root().unwrap();

        let mut to_end = ReIndexObjectJob::new(a, None);
        assert!(to_end.is_executable(&state));
        to_end.execute(&mut state);
        assert_eq!(state.document.child_objects(root)[..3], [b, c, a]);

        let mut back = ReIndexObjectJob::new(a, Some(b));
        back.execute(&mut state);
        assert_eq!(state.document.snapshot(), before);

        back.undo(&mut state);
        to_end.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);
    }

    #[test]
    fn test_reindex_noop_is_not_executable() {
        let state = state();
        let (a, b, c) = (id(&state, "a"), id(&state, "b"), id(&state, "c"));
        assert!(!ReIndexObjectJob::new(a, Some(b)).is_executable(&state));
        assert!(!ReIndexObjectJob::new(c, None).is_executable(&state));
        assert!(!ReIndexObjectJob::new(a, Some(a)).is_executable(&state));
        assert!(!ReIndexObjectJob::new(a, Some(id(&state, "title"))).is_executable(&state));
    }

    #[test]
    fn test_replace_child_and_root() {
        let mut state = state();
        let before = state.document.snapshot();
        let b = id(&state, "b");
        let root = state.document.root().unwrap();
        let label = state.document.create_instance("Label");

        let mut job = ReplaceObjectJob::new(b, label);
        assert!(job.is_executable(&state));
        job.execute(&mut state);
        assert_eq!(state.document.index_in_parent(label), Some(1));
        assert!(!state.document.is_attached(b));
        job.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);

        let pane = state.document.create_instance("StackPane");
        let mut job = ReplaceObjectJob::new(root, pane);
        job.execute(&mut state);
        assert_eq!(state.document.root(), Some(pane));
        job.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);
    }

    #[test]
    fn test_replace_refuses_cycles() {
        let mut state = state();
        let a = id(&state, "a");
        let wrapper = state.document.create_instance("HBox");
        let b = id(&state, "b");
        state.document.remove_from_parent(a);
        state.document.append_value(wrapper, "children", a);
        assert!(ReplaceObjectJob::new(b, wrapper).is_executable(&state));

        // An object cannot take the place of its own descendant
        let inner = state.document.create_instance("Button");
        state.document.append_value(a, "graphic", inner);
        assert!(!ReplaceObjectJob::new(inner, wrapper).is_executable(&state));
    }

    #[test]
    fn test_set_root_on_empty_document() {
        let mut state = EditorState::default();
        let root = state.document.create_instance("AnchorPane");

        let mut job = SetFxomRootJob::new(Some(root));
        assert!(job.is_executable(&state));
        job.execute(&mut state);
        assert_eq!(state.document.root(), Some(root));
        assert!(!job.is_executable(&state));

        job.undo(&mut state);
        assert_eq!(state.document.root(), None);
    }

    #[test]
    fn test_toggle_fx_root() {
        let mut state = state();
        let root = state.document.root().unwrap();
        let mut job = ToggleFxRootJob::new(root);
        assert!(job.is_executable(&state));
        assert!(!ToggleFxRootJob::new(id(&state, "a")).is_executable(&state));

        job.execute(&mut state);
        assert!(state.document[root].as_instance().unwrap().fx_root);
        job.undo(&mut state);
        assert!(!state.document[root].as_instance().unwrap().fx_root);
    }

    #[test]
    fn test_remove_last_value_removes_property() {
        let mut state = state();
        let before = state.document.snapshot();
        let root = state.document.root().unwrap();
        let title = id(&state, "title");

        let mut job = RemoveObjectJob::new(title);
        job.execute(&mut state);
        assert_eq!(state.document.find_property(root, &PropertyName::new("top")), None);

        job.undo(&mut state);
        assert_eq!(state.document.snapshot(), before);
        job.redo(&mut state);
        assert_eq!(state.document.find_property(root, &PropertyName::new("top")), None);
    }

    #[test]
    fn test_remove_root_clears_document() {
        let mut state = state();
        let root = state.document.root().unwrap();
        let mut job = RemoveObjectJob::new(root);
        assert!(job.is_executable(&state));
        job.execute(&mut state);
        assert_eq!(state.document.root(), None);
        job.undo(&mut state);
        assert_eq!(state.document.root(), Some(root));
    }
}
