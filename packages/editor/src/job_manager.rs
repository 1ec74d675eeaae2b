//! # Job Manager
//!
//! Undo/redo history of executed jobs.
//!
//! ## Design
//!
//! - `push` executes a job and records it; the redo stack is cleared
//! - Undo reverts the most recent job and moves it to the redo stack
//! - Redo re-applies it and moves it back
//! - Every push, undo and redo runs inside one document update, so the
//!   scene-graph revision moves at most once per call
//! - The oldest entries are dropped past `max_levels` (0 = unlimited)
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut jobs = JobManager::new();
//! let mut state = EditorState::new(FxomDocument::new());
//!
//! let root = state.document.create_instance("VBox");
//! jobs.push(SetFxomRootJob::new(Some(root)).into(), &mut state);
//!
//! jobs.undo(&mut state);
//! jobs.redo(&mut state);
//! ```

use crate::job::{Job, JobOp};
use crate::state::EditorState;
use std::collections::VecDeque;
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct JobManager {
    /// Executed jobs, most recent last
    undo_stack: VecDeque<Job>,

    /// Undone jobs, most recent last
    redo_stack: Vec<Job>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Bumped by every push, undo and redo
    revision: u64,
}

impl JobManager {
    /// Job manager keeping 100 undo levels
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels,
            revision: 0,
        }
    }

    /// Executes `job` and records it for undo.
    ///
    /// Executability is the caller's business; pushing a job whose
    /// preconditions do not hold panics inside `execute`.
    #[instrument(skip_all, fields(job = %job.description()))]
    pub fn push(&mut self, mut job: Job, state: &mut EditorState) {
        state.document.begin_update();
        job.execute(state);
        state.document.end_update();

        self.undo_stack.push_back(job);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
        self.revision += 1;
        debug!(levels = self.undo_stack.len(), "pushed");
    }

    /// Reverts the most recent job. Returns `false` when there is none.
    #[instrument(skip_all)]
    pub fn undo(&mut self, state: &mut EditorState) -> bool {
        let Some(mut job) = self.undo_stack.pop_back() else {
            return false;
        };
        debug!(job = %job.description(), "undo");
        state.document.begin_update();
        job.undo(state);
        state.document.end_update();

        self.redo_stack.push(job);
        self.revision += 1;
        true
    }

    /// Re-applies the most recently undone job. Returns `false` when there
    /// is none.
    #[instrument(skip_all)]
    pub fn redo(&mut self, state: &mut EditorState) -> bool {
        let Some(mut job) = self.redo_stack.pop() else {
            return false;
        };
        debug!(job = %job.description(), "redo");
        state.document.begin_update();
        job.redo(state);
        state.document.end_update();

        self.undo_stack.push_back(job);
        self.revision += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Description of the job `undo` would revert
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|job| job.description())
    }

    /// Description of the job `redo` would re-apply
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|job| job.description())
    }

    /// Forgets all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.revision += 1;
    }
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}
