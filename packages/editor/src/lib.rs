//! # FXOM Editor
//!
//! Reversible editing of an FXOM document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: FxomDocument arena                   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: jobs over EditorState               │
//! │  - Atomic and composite jobs                │
//! │  - Undo/redo history (JobManager)           │
//! │  - Reference expansion and repair           │
//! │  - Selection                                │
//! └─────────────────────────────────────────────┘
//!                     ↑
//! ┌─────────────────────────────────────────────┐
//! │ library scan (worker thread) → catalog      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Jobs are the only way to edit**: every change that should be undone
//!    goes through a job pushed on the [`JobManager`]
//! 2. **Check, then execute**: `is_executable` is side-effect free; `execute`
//!    panics when its preconditions do not hold
//! 3. **Handles survive undo**: detached nodes stay in the arena so redo sees
//!    the same objects
//! 4. **Single-threaded edits**: only the library scan runs off the edit
//!    thread, and it never touches a document
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fxom_editor::{commands, EditSession, EditorConfig};
//! use fxom_model::{FxomDocument, InMemoryCatalog};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(InMemoryCatalog::new().with_default_property("VBox", "children"));
//! let mut session = EditSession::new(FxomDocument::new(), catalog, EditorConfig::default());
//!
//! session.insert_document(&parsed, None, None);
//! let job = commands::delete_selection(session.metadata(), session.state());
//! session.perform(job);
//! session.undo();
//! ```

pub mod commands;
mod config;
mod errors;
pub mod job;
mod job_manager;
mod library;
mod selection;
mod session;
mod state;

pub use config::{EditorConfig, LibraryConfig, DEFAULT_CONFIG_NAME};
pub use errors::{EditorError, EditorResult};
pub use job::{
    combine_mode, expand_reference, AddCollectionItemJob, AddPropertyJob, AddPropertyValueJob,
    BatchJob, CombineExpressionReferenceJob, CombineIntrinsicReferenceJob, CombineMode,
    DeleteObjectJob, DeleteRefereeObjectJob, DuplicateSelectionJob, ExpandExpressionReferenceJob,
    ExpandIntrinsicReferenceJob, Job, JobOp, ModifyFxControllerJob, ModifyFxIdJob,
    ModifyObjectJob, ReIndexObjectJob, ReferencesUpdater, RelocateObjectJob, RelocateTarget,
    RemoveCollectionItemJob, RemoveObjectJob, RemovePropertyJob, RemovePropertyValueJob,
    ReplaceObjectJob, ReplacePropertyJob, SetFxomRootJob, SubJobs, ToggleFxRootJob,
    UpdateReferencesJob, UpdateSelectionJob,
};
pub use job_manager::JobManager;
pub use library::{
    CancellationFlag, LibraryCatalog, LibraryItem, LibraryScanner, ScanHandle, ScanOutcome,
};
pub use selection::{
    GridFeature, GridSelectionGroup, HitNode, ObjectSelectionGroup, Selection, SelectionGroup,
};
pub use session::EditSession;
pub use state::EditorState;
