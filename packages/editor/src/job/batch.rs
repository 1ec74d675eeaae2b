use super::{Job, JobOp};
use crate::state::EditorState;
use tracing::warn;

/// Several jobs pushed as one undo unit.
///
/// Sub-jobs are checked against the state seen at construction: the batch is
/// executable only when it is non-empty and every sub-job is. An inexecutable
/// batch never touches the document.
#[derive(Debug)]
pub struct BatchJob {
    jobs: Vec<Job>,
    executable: bool,
    action: String,
    description: Option<String>,
}

impl BatchJob {
    /// `action` names the gesture in the synthesized description
    /// ("Delete" gives "Delete 3 objects").
    pub fn new(action: impl Into<String>, jobs: Vec<Job>, state: &EditorState) -> Self {
        let executable = !jobs.is_empty() && jobs.iter().all(|job| job.is_executable(state));
        Self {
            jobs,
            executable,
            action: action.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl JobOp for BatchJob {
    fn is_executable(&self, _state: &EditorState) -> bool {
        self.executable
    }

    fn execute(&mut self, state: &mut EditorState) {
        if !self.executable {
            warn!(batch = %self.description(), "skipping inexecutable batch");
            return;
        }
        for job in &mut self.jobs {
            job.execute(state);
        }
    }

    fn undo(&mut self, state: &mut EditorState) {
        if !self.executable {
            return;
        }
        for job in self.jobs.iter_mut().rev() {
            job.undo(state);
        }
    }

    fn redo(&mut self, state: &mut EditorState) {
        if !self.executable {
            return;
        }
        for job in &mut self.jobs {
            job.redo(state);
        }
    }

    fn description(&self) -> String {
        if let Some(description) = &self.description {
            return description.clone();
        }
        match self.jobs.as_slice() {
            [single] => single.description(),
            jobs => format!("{} {} objects", self.action, jobs.len()),
        }
    }
}

/// Sub-jobs recorded by an inline job while it executes.
///
/// Each one is checked right before it runs, against the state left by the
/// ones before it.
#[derive(Debug, Default)]
pub struct SubJobs(Vec<Job>);

impl SubJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, job: impl Into<Job>, state: &mut EditorState) {
        let mut job = job.into();
        assert!(
            job.is_executable(state),
            "sub-job `{}` is not executable",
            job.description()
        );
        job.execute(state);
        self.0.push(job);
    }

    pub fn undo_all(&mut self, state: &mut EditorState) {
        for job in self.0.iter_mut().rev() {
            job.undo(state);
        }
    }

    pub fn redo_all(&mut self, state: &mut EditorState) {
        for job in &mut self.0 {
            job.redo(state);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn jobs(&self) -> &[Job] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
