//! IR-building and (de)serialization errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IrError {
    #[error("no active function while building the IR (a statement appeared outside any function)")]
    NoActiveFunction,

    #[error("IR file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IR JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IrError>;
