use crate::selection::Selection;
use fxom_model::FxomDocument;

/// Everything a job may read or mutate
#[derive(Debug, Default)]
pub struct EditorState {
    pub document: FxomDocument,
    pub selection: Selection,
}

impl EditorState {
    pub fn new(document: FxomDocument) -> Self {
        Self {
            document,
            selection: Selection::new(),
        }
    }
}
