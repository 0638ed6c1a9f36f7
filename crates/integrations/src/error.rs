use thiserror::Error;

use gridbook_http::HttpError;
use gridbook_worksheet::StoreError;

use crate::model::IntegrationId;

/// Errors from registry lookups or integration runs.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("Integration not found: {0}")]
    NotFound(IntegrationId),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] HttpError),

    #[error("Worksheet error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, IntegrationError>;
