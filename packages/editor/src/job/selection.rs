use super::JobOp;
use crate::selection::SelectionGroup;
use crate::state::EditorState;

/// Swaps the selection, so that undo brings back what was picked before an
/// edit.
#[derive(Debug)]
pub struct UpdateSelectionJob {
    new_group: SelectionGroup,
    old_group: Option<SelectionGroup>,
}

impl UpdateSelectionJob {
    pub fn new(group: SelectionGroup) -> Self {
        Self {
            new_group: group,
            old_group: None,
        }
    }
}

impl JobOp for UpdateSelectionJob {
    fn is_executable(&self, state: &EditorState) -> bool {
        self.new_group
            .items()
            .iter()
            .all(|item| state.document.object(*item).is_some())
    }

    fn execute(&mut self, state: &mut EditorState) {
        self.old_group = Some(state.selection.replace(self.new_group.clone()));
    }

    fn undo(&mut self, state: &mut EditorState) {
        let old = self.old_group.clone().expect("undo before execute");
        state.selection.replace(old);
    }

    fn description(&self) -> String {
        "Update Selection".to_string()
    }
}
