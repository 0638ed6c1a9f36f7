use thiserror::Error;

use crate::worksheet::{ColumnId, RowId, WorksheetId};

/// Errors that can occur during worksheet store operations.
///
/// Precondition failures (no identity, no active worksheet, unknown ids)
/// leave the store untouched; callers that want the original silent-no-op
/// behavior can simply discard the error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No user is signed in")]
    NoIdentity,

    #[error("No worksheet is active")]
    NoActiveWorksheet,

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(WorksheetId),

    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnId),

    #[error("Row not found: {0}")]
    RowNotFound(RowId),

    #[error("CSV input is empty")]
    EmptyImport,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
