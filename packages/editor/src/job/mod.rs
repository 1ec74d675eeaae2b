//! # Jobs
//!
//! Reversible edits of an [`EditorState`].
//!
//! ## Protocol
//!
//! - `is_executable` is a side-effect free check made before pushing
//! - `execute` assumes the check passed and panics when it did not hold
//! - `undo` restores the exact state seen by `execute`
//! - `redo` re-applies with the same observable effect as `execute`
//!
//! Positional data (indexes, previous values, removed slots) is recorded by
//! `execute` before it mutates anything. Object handles are fixed at
//! construction.
//!
//! ## Composition
//!
//! - [`BatchJob`]: sub-jobs built and checked up front, one undo unit
//! - Inline jobs: sub-jobs that depend on earlier ones are built while
//!   executing and recorded in [`SubJobs`]

mod batch;
mod edit;
mod modify;
mod object;
mod property;
mod references;
mod selection;
mod value;

pub use batch::{BatchJob, SubJobs};
pub use edit::{DeleteObjectJob, DuplicateSelectionJob, RelocateObjectJob, RelocateTarget};
pub use modify::{ModifyFxControllerJob, ModifyFxIdJob, ModifyObjectJob};
pub use object::{
    ReIndexObjectJob, RemoveObjectJob, ReplaceObjectJob, SetFxomRootJob, ToggleFxRootJob,
};
pub use property::{AddPropertyJob, RemovePropertyJob, ReplacePropertyJob};
pub use references::{
    combine_mode, expand_reference, CombineExpressionReferenceJob, CombineIntrinsicReferenceJob,
    CombineMode, DeleteRefereeObjectJob, ExpandExpressionReferenceJob,
    ExpandIntrinsicReferenceJob, ReferencesUpdater, UpdateReferencesJob,
};
pub use selection::UpdateSelectionJob;
pub use value::{
    AddCollectionItemJob, AddPropertyValueJob, RemoveCollectionItemJob, RemovePropertyValueJob,
};

use crate::state::EditorState;

/// Contract shared by every job
pub trait JobOp {
    /// Whether `execute` may run against `state`
    fn is_executable(&self, state: &EditorState) -> bool;

    fn execute(&mut self, state: &mut EditorState);

    fn undo(&mut self, state: &mut EditorState);

    fn redo(&mut self, state: &mut EditorState) {
        self.execute(state);
    }

    /// Human-readable label for menus and history
    fn description(&self) -> String;
}

macro_rules! jobs {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Every edit the engine knows about
        #[derive(Debug)]
        pub enum Job {
            $($variant($ty),)*
        }

        impl Job {
            fn op(&self) -> &dyn JobOp {
                match self {
                    $(Job::$variant(job) => job,)*
                }
            }

            fn op_mut(&mut self) -> &mut dyn JobOp {
                match self {
                    $(Job::$variant(job) => job,)*
                }
            }
        }

        $(
            impl From<$ty> for Job {
                fn from(job: $ty) -> Self {
                    Job::$variant(job)
                }
            }
        )*
    };
}

jobs! {
    AddProperty(AddPropertyJob),
    RemoveProperty(RemovePropertyJob),
    ReplaceProperty(ReplacePropertyJob),
    AddPropertyValue(AddPropertyValueJob),
    RemovePropertyValue(RemovePropertyValueJob),
    AddCollectionItem(AddCollectionItemJob),
    RemoveCollectionItem(RemoveCollectionItemJob),
    ModifyObject(ModifyObjectJob),
    ModifyFxId(ModifyFxIdJob),
    ModifyFxController(ModifyFxControllerJob),
    ReIndexObject(ReIndexObjectJob),
    ReplaceObject(ReplaceObjectJob),
    SetFxomRoot(SetFxomRootJob),
    ToggleFxRoot(ToggleFxRootJob),
    UpdateSelection(UpdateSelectionJob),
    RemoveObject(RemoveObjectJob),
    DeleteObject(DeleteObjectJob),
    RelocateObject(RelocateObjectJob),
    DuplicateSelection(DuplicateSelectionJob),
    ExpandIntrinsicReference(ExpandIntrinsicReferenceJob),
    ExpandExpressionReference(ExpandExpressionReferenceJob),
    CombineIntrinsicReference(CombineIntrinsicReferenceJob),
    CombineExpressionReference(CombineExpressionReferenceJob),
    DeleteRefereeObject(DeleteRefereeObjectJob),
    UpdateReferences(UpdateReferencesJob),
    Batch(BatchJob),
}

impl JobOp for Job {
    fn is_executable(&self, state: &EditorState) -> bool {
        self.op().is_executable(state)
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.op_mut().execute(state);
    }

    fn undo(&mut self, state: &mut EditorState) {
        self.op_mut().undo(state);
    }

    fn redo(&mut self, state: &mut EditorState) {
        self.op_mut().redo(state);
    }

    fn description(&self) -> String {
        self.op().description()
    }
}
