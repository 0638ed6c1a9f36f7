use chrono::Utc;
use gridbook_auth::User;
use gridbook_http::RowFetcher;
use gridbook_worksheet::{CellValue, WorksheetId, WorksheetStore};
use tracing::{info, warn};

use crate::error::{IntegrationError, Result};
use crate::model::IntegrationId;
use crate::registry::IntegrationRegistry;

/// Result of one integration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub rows_added: usize,
}

/// Run an integration against a worksheet.
///
/// The target worksheet id is fixed here, at call time: switching the
/// active worksheet while the fetch is in flight does not redirect the
/// rows. For each fetched record, in response order, a row is appended
/// and every `(api_field, column)` pair of the response mapping whose
/// field is present in the record is written through the store, so each
/// write is attributed and recorded in the cell history like any manual
/// edit. `last_run` is stamped only after the whole run succeeds.
pub async fn run_integration<F>(
    store: &mut WorksheetStore,
    registry: &mut IntegrationRegistry,
    fetcher: &F,
    worksheet: WorksheetId,
    integration: IntegrationId,
    actor: Option<&User>,
) -> Result<RunOutcome>
where
    F: RowFetcher + ?Sized,
{
    let config = registry
        .get(worksheet, integration)
        .ok_or(IntegrationError::NotFound(integration))?
        .clone();

    let records = match fetcher.fetch_rows(&config.request()).await {
        Ok(records) => records,
        Err(error) => {
            warn!(integration = %integration, %error, "integration fetch failed");
            return Err(error.into());
        }
    };

    let mut rows_added = 0usize;
    for record in records {
        let row = store.add_row_in(worksheet, actor)?;
        for (api_field, column) in &config.response_mapping {
            if let Some(value) = record.get(api_field) {
                store.update_cell_in(
                    worksheet,
                    row,
                    *column,
                    CellValue::from_json(value.clone()),
                    actor,
                )?;
            }
        }
        rows_added += 1;
    }

    registry.mark_ran(worksheet, integration, Utc::now())?;
    info!(integration = %integration, rows_added, "integration run finished");
    Ok(RunOutcome { rows_added })
}
