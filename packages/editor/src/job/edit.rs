use super::{
    AddCollectionItemJob, AddPropertyJob, AddPropertyValueJob, DeleteRefereeObjectJob, JobOp,
    ReIndexObjectJob, RemoveObjectJob, SubJobs, UpdateSelectionJob,
};
use crate::selection::SelectionGroup;
use crate::state::EditorState;
use fxom_model::{FxomCloner, FxomDocument, ObjectId, ParentLink, PropertyName};
use tracing::debug;

/// Removes an object for good.
///
/// When its fx:id is still referenced from outside its subtree the object
/// is handed over to one of those references instead of disappearing.
#[derive(Debug)]
pub struct DeleteObjectJob {
    object: ObjectId,
    sub_jobs: SubJobs,
}

impl DeleteObjectJob {
    pub fn new(object: ObjectId) -> Self {
        Self {
            object,
            sub_jobs: SubJobs::new(),
        }
    }

    fn is_referenced_from_outside(&self, document: &FxomDocument) -> bool {
        if document.root() == Some(self.object) {
            return false;
        }
        let Some(fx_id) = document.object(self.object).and_then(|o| o.fx_id()) else {
            return false;
        };
        document
            .collect_references(Some(fx_id))
            .iter()
            .filter_map(|site| site.holder(document))
            .any(|holder| !document.is_ancestor_or_self(self.object, holder))
    }
}

impl JobOp for DeleteObjectJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        RemoveObjectJob::new(self.object).is_executable(state)
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.sub_jobs.clear();
        // An earlier job of the same batch may already have taken it out
        if !state.document.is_attached(self.object) {
            debug!(object = ?self.object, "already detached");
            return;
        }
        if self.is_referenced_from_outside(&state.document) {
            self.sub_jobs
                .run(DeleteRefereeObjectJob::new(self.object), state);
        } else {
            self.sub_jobs.run(RemoveObjectJob::new(self.object), state);
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

/// Where a relocated object lands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelocateTarget {
    /// Collection property `name` of `parent`, created when missing
    Property { parent: ObjectId, name: PropertyName },
    /// Item list of a `Collection` or `Define`
    Container(ObjectId),
}

impl RelocateTarget {
    fn object(&self) -> ObjectId {
        match self {
            RelocateTarget::Property { parent, .. } => *parent,
            RelocateTarget::Container(container) => *container,
        }
    }

    /// Existing list the object would join
    fn link(&self, document: &FxomDocument) -> Option<ParentLink> {
        match self {
            RelocateTarget::Property { parent, name } => {
                document.find_property(*parent, name).map(ParentLink::Property)
            }
            RelocateTarget::Container(container) => Some(ParentLink::Container(*container)),
        }
    }
}

fn link_members(document: &FxomDocument, link: ParentLink) -> &[ObjectId] {
    match link {
        ParentLink::Property(property) => document[property].values(),
        ParentLink::Container(container) => document[container].items(),
    }
}

/// Moves an object to another parent, or to another position among its
/// siblings. `index` counts positions in the destination list once the
/// object has left it; `None` appends.
#[derive(Debug)]
pub struct RelocateObjectJob {
    object: ObjectId,
    target: RelocateTarget,
    index: Option<usize>,
    sub_jobs: SubJobs,
}

impl RelocateObjectJob {
    pub fn new(object: ObjectId, target: RelocateTarget, index: Option<usize>) -> Self {
        Self {
            object,
            target,
            index,
            sub_jobs: SubJobs::new(),
        }
    }

    /// Destination list without the relocated object
    fn remaining(&self, document: &FxomDocument, link: ParentLink) -> Vec<ObjectId> {
        link_members(document, link)
            .iter()
            .copied()
            .filter(|id| *id != self.object)
            .collect()
    }
}

impl JobOp for RelocateObjectJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        let destination = self.target.object();
        let (Some(current), Some(parent)) = (
            document.parent_link(self.object),
            document.object(destination),
        ) else {
            return false;
        };
        if document.is_ancestor_or_self(self.object, destination) {
            return false;
        }
        let link = match &self.target {
            RelocateTarget::Property { parent: owner, name } => {
                if !parent.has_properties() {
                    return false;
                }
                match document.find_property(*owner, name) {
                    Some(property) if document[property].is_text() => return false,
                    Some(property) => Some(ParentLink::Property(property)),
                    None => None,
                }
            }
            RelocateTarget::Container(container) => {
                if !parent.is_container() {
                    return false;
                }
                Some(ParentLink::Container(*container))
            }
        };

        let Some(link) = link else {
            return self.index.map_or(true, |index| index == 0);
        };
        let remaining = self.remaining(document, link).len();
        if self.index.is_some_and(|index| index > remaining) {
            return false;
        }
        if link == current {
            let target = self.index.unwrap_or(remaining);
            return document.index_in_parent(self.object) != Some(target);
        }
        true
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.sub_jobs.clear();
        let current = state.document.parent_link(self.object);

        if let Some(link) = self.target.link(&state.document).filter(|l| Some(*l) == current) {
            let remaining = self.remaining(&state.document, link);
            let before = self.index.and_then(|index| remaining.get(index).copied());
            self.sub_jobs
                .run(ReIndexObjectJob::new(self.object, before), state);
            return;
        }

        self.sub_jobs.run(RemoveObjectJob::new(self.object), state);
        match (&self.target, self.target.link(&state.document)) {
            (_, Some(ParentLink::Property(property))) => {
                self.sub_jobs
                    .run(AddPropertyValueJob::new(self.object, property, self.index), state);
            }
            (_, Some(ParentLink::Container(container))) => {
                self.sub_jobs
                    .run(AddCollectionItemJob::new(self.object, container, self.index), state);
            }
            (RelocateTarget::Property { parent, name }, None) => {
                let property = state.document.create_collection_property(name.clone());
                self.sub_jobs
                    .run(AddPropertyValueJob::new(self.object, property, None), state);
                self.sub_jobs
                    .run(AddPropertyJob::new(property, *parent, None), state);
            }
            (RelocateTarget::Container(container), None) => {
                panic!("{:?} is not a container", container)
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
        "Move".to_string()
    }
}

/// Clones the selected objects, puts each clone right after its original
/// and selects the clones.
#[derive(Debug)]
pub struct DuplicateSelectionJob {
    items: Vec<ObjectId>,
    sub_jobs: SubJobs,
}

impl DuplicateSelectionJob {
    pub fn new(state: &EditorState) -> Self {
        let items = match state.selection.group() {
            SelectionGroup::Objects(_) => state.selection.group().top_most_items(&state.document),
            SelectionGroup::Grid(_) => Vec::new(),
        };
        Self {
            items,
            sub_jobs: SubJobs::new(),
        }
    }
}

impl JobOp for DuplicateSelectionJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        let document = &state.document;
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|item| document.parent_link(*item).is_some() && document.is_attached(*item))
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.sub_jobs.clear();
        let mut cloner = FxomCloner::new(&state.document);
        let mut clones = Vec::with_capacity(self.items.len());

        for &item in &self.items {
            let clone = cloner.clone_object(&mut state.document, item);
            let (link, index) = match (
                state.document.parent_link(item),
                state.document.index_in_parent(item),
            ) {
                (Some(link), Some(index)) => (link, index + 1),
                _ => panic!("{:?} has no parent", item),
            };
            match link {
                ParentLink::Property(property) => self
                    .sub_jobs
                    .run(AddPropertyValueJob::new(clone, property, Some(index)), state),
                ParentLink::Container(container) => self
                    .sub_jobs
                    .run(AddCollectionItemJob::new(clone, container, Some(index)), state),
            }
            clones.push(clone);
        }

        self.sub_jobs
            .run(UpdateSelectionJob::new(SelectionGroup::objects(clones)), state);
    }

    fn undo(&mut self, state: &mut EditorState) {
        self.sub_jobs.undo_all(state);
    }

    fn redo(&mut self, state: &mut EditorState) {
        self.sub_jobs.redo_all(state);
    }

    fn description(&self) -> String {
        match self.items.len() {
            1 => "Duplicate".to_string(),
            n => format!("Duplicate {} objects", n),
        }
    }
}
