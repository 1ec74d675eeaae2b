//! Error types for the editor

use fxom_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Library scan error: {0}")]
    Scan(#[from] walkdir::Error),

    #[error("Library scan worker panicked")]
    ScanPanicked,

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type EditorResult<T> = Result<T, EditorError>;
