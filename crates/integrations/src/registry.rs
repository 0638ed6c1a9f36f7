use chrono::{DateTime, Utc};
use gridbook_worksheet::WorksheetId;
use std::collections::HashMap;
use tracing::info;

use crate::error::{IntegrationError, Result};
use crate::model::{ApiIntegration, IntegrationDraft, IntegrationId, IntegrationUpdate, Schedule};

/// Integrations grouped by the worksheet they feed.
///
/// Stored apart from the worksheets themselves: deleting rows or columns
/// never touches this collection, and a worksheet id with no entry simply
/// has no integrations.
#[derive(Debug, Clone, Default)]
pub struct IntegrationRegistry {
    integrations: HashMap<WorksheetId, Vec<ApiIntegration>>,
}

impl IntegrationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an integration for a worksheet and return its id.
    pub fn create(&mut self, worksheet: WorksheetId, draft: IntegrationDraft) -> IntegrationId {
        let integration = draft.into_integration();
        let id = integration.id;
        let name = integration.name.clone();

        self.integrations
            .entry(worksheet)
            .or_default()
            .push(integration);

        info!(integration = %id, name, "integration created");
        id
    }

    /// Merge a partial update into an integration.
    pub fn update(
        &mut self,
        worksheet: WorksheetId,
        id: IntegrationId,
        update: IntegrationUpdate,
    ) -> Result<()> {
        let integration = self
            .get_mut(worksheet, id)
            .ok_or(IntegrationError::NotFound(id))?;
        integration.apply(update);
        Ok(())
    }

    /// Remove an integration.
    pub fn delete(&mut self, worksheet: WorksheetId, id: IntegrationId) -> Result<()> {
        let list = self
            .integrations
            .get_mut(&worksheet)
            .ok_or(IntegrationError::NotFound(id))?;
        let before = list.len();
        list.retain(|integration| integration.id != id);
        if list.len() == before {
            return Err(IntegrationError::NotFound(id));
        }

        info!(integration = %id, "integration deleted");
        Ok(())
    }

    /// All integrations configured for a worksheet, in creation order.
    #[must_use]
    pub fn for_worksheet(&self, worksheet: WorksheetId) -> &[ApiIntegration] {
        self.integrations
            .get(&worksheet)
            .map_or(&[], Vec::as_slice)
    }

    /// Look up one integration.
    #[must_use]
    pub fn get(&self, worksheet: WorksheetId, id: IntegrationId) -> Option<&ApiIntegration> {
        self.for_worksheet(worksheet)
            .iter()
            .find(|integration| integration.id == id)
    }

    fn get_mut(
        &mut self,
        worksheet: WorksheetId,
        id: IntegrationId,
    ) -> Option<&mut ApiIntegration> {
        self.integrations
            .get_mut(&worksheet)?
            .iter_mut()
            .find(|integration| integration.id == id)
    }

    /// Stamp a successful run, creating a manual schedule when the
    /// integration has none.
    pub(crate) fn mark_ran(
        &mut self,
        worksheet: WorksheetId,
        id: IntegrationId,
        when: DateTime<Utc>,
    ) -> Result<()> {
        let integration = self
            .get_mut(worksheet, id)
            .ok_or(IntegrationError::NotFound(id))?;
        integration
            .schedule
            .get_or_insert_with(Schedule::default)
            .last_run = Some(when);
        Ok(())
    }
}
