use chrono::Utc;
use gridbook_auth::User;
use tracing::info;

use crate::cell::{CellData, CellValue};
use crate::column::{CellType, ColumnDefinition, ColumnUpdate};
use crate::error::{Result, StoreError};
use crate::ledger::{CellChange, CellKey};
use crate::worksheet::{ColumnId, RowId, Worksheet, WorksheetId, WorksheetRow};

/// Owns the worksheet collection and the active-worksheet snapshot.
///
/// The active worksheet is held by value, not by id: readers always
/// observe a complete snapshot, never a partially applied mutation.
/// Every mutation runs against a clone of the target worksheet and is
/// committed to the collection (and the active snapshot, when the ids
/// match) only on success, so a failed precondition leaves all state
/// untouched.
///
/// Operations that need actor attribution take the current user as an
/// explicit parameter rather than reading ambient session state.
#[derive(Debug, Clone, Default)]
pub struct WorksheetStore {
    worksheets: Vec<Worksheet>,
    active: Option<Worksheet>,
}

impl WorksheetStore {
    /// Create an empty store with no active worksheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing worksheets. Nothing is
    /// active until `set_active_worksheet` is called.
    #[must_use]
    pub fn with_worksheets(worksheets: Vec<Worksheet>) -> Self {
        WorksheetStore {
            worksheets,
            active: None,
        }
    }

    // ===== Read surface =====

    /// All worksheets in creation order.
    #[must_use]
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    /// The active worksheet snapshot, if any.
    #[must_use]
    pub fn active_worksheet(&self) -> Option<&Worksheet> {
        self.active.as_ref()
    }

    /// Look up a worksheet by id.
    #[must_use]
    pub fn get(&self, id: WorksheetId) -> Option<&Worksheet> {
        self.worksheets.iter().find(|worksheet| worksheet.id == id)
    }

    /// Check collection membership.
    #[must_use]
    pub fn contains(&self, id: WorksheetId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.worksheets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// History for one cell of the active worksheet, oldest first.
    /// Empty when no worksheet is active or nothing was recorded, and
    /// still served for rows or columns deleted after the fact.
    #[must_use]
    pub fn changes_for_cell(&self, row: RowId, column: ColumnId) -> &[CellChange] {
        self.active
            .as_ref()
            .map_or(&[], |worksheet| worksheet.changes_for_cell(row, column))
    }

    // ===== Worksheet lifecycle =====

    /// Create a worksheet owned by the acting user, append it to the
    /// collection and make it active. It starts with one default text
    /// column and no rows.
    pub fn create_worksheet(&mut self, name: &str, actor: Option<&User>) -> Result<WorksheetId> {
        let user = actor.ok_or(StoreError::NoIdentity)?;

        let worksheet = Worksheet::new(name, &user.id);
        let id = worksheet.id;
        self.worksheets.push(worksheet.clone());
        self.active = Some(worksheet);

        info!(worksheet = %id, name, "worksheet created");
        Ok(id)
    }

    /// Make the worksheet with the given id active. An unknown id leaves
    /// the current active snapshot unchanged.
    pub fn set_active_worksheet(&mut self, id: WorksheetId) -> Result<()> {
        let worksheet = self
            .get(id)
            .ok_or(StoreError::WorksheetNotFound(id))?
            .clone();
        self.active = Some(worksheet);
        Ok(())
    }

    // ===== Column operations =====

    /// Append a new column to the active worksheet. Existing rows are
    /// not touched; reads of the new column on them yield null until
    /// written.
    pub fn add_column(&mut self, name: &str, kind: CellType) -> Result<ColumnId> {
        let column = ColumnDefinition::new(name, kind);
        let id = column.id;
        self.mutate_active(|worksheet| {
            worksheet.columns.push(column);
            Ok(())
        })?;

        info!(column = %id, name, "column added");
        Ok(id)
    }

    /// Merge a partial update into a column of the active worksheet.
    /// Changing the type does not coerce already-stored cell values.
    pub fn update_column(&mut self, id: ColumnId, update: ColumnUpdate) -> Result<()> {
        self.mutate_active(|worksheet| {
            let column = worksheet
                .column_mut(id)
                .ok_or(StoreError::ColumnNotFound(id))?;
            column.apply(update);
            Ok(())
        })
    }

    /// Remove a column from the active worksheet and prune its entry
    /// from every row's cell map. Recorded history for the column is
    /// kept.
    pub fn delete_column(&mut self, id: ColumnId) -> Result<()> {
        self.mutate_active(|worksheet| {
            if worksheet.column(id).is_none() {
                return Err(StoreError::ColumnNotFound(id));
            }
            worksheet.columns.retain(|column| column.id != id);
            for row in &mut worksheet.rows {
                row.cells.shift_remove(&id);
            }
            Ok(())
        })?;

        info!(column = %id, "column deleted");
        Ok(())
    }

    // ===== Row operations =====

    /// Append a row to the active worksheet, with one null cell per
    /// current column, and return its id.
    pub fn add_row(&mut self, actor: Option<&User>) -> Result<RowId> {
        let target = self.active_id()?;
        self.add_row_in(target, actor)
    }

    /// Append a row to the worksheet with the given id. Callers that
    /// resumed from a suspend point use this to hit the worksheet they
    /// started with, regardless of the current active snapshot.
    pub fn add_row_in(&mut self, worksheet: WorksheetId, actor: Option<&User>) -> Result<RowId> {
        actor.ok_or(StoreError::NoIdentity)?;
        self.mutate(worksheet, |sheet| {
            let row = WorksheetRow::with_columns(&sheet.columns);
            let id = row.id;
            sheet.rows.push(row);
            Ok(id)
        })
    }

    /// Remove a row from the active worksheet. Recorded history for the
    /// row is kept.
    pub fn delete_row(&mut self, id: RowId) -> Result<()> {
        self.mutate_active(|worksheet| {
            if worksheet.row(id).is_none() {
                return Err(StoreError::RowNotFound(id));
            }
            worksheet.rows.retain(|row| row.id != id);
            Ok(())
        })?;

        info!(row = %id, "row deleted");
        Ok(())
    }

    // ===== Cell operations =====

    /// Write a cell of the active worksheet, recording the transition
    /// in the change ledger.
    pub fn update_cell(
        &mut self,
        row: RowId,
        column: ColumnId,
        value: CellValue,
        actor: Option<&User>,
    ) -> Result<()> {
        let target = self.active_id()?;
        self.update_cell_in(target, row, column, value, actor)
    }

    /// Write a cell of the worksheet with the given id.
    ///
    /// The previous value (null when the cell was never written) and the
    /// new value are appended to the cell's history, then the cell is
    /// replaced with an edited cell holding the new value, dropping any
    /// stored formula. Cell write and history append commit together or
    /// not at all.
    pub fn update_cell_in(
        &mut self,
        worksheet: WorksheetId,
        row: RowId,
        column: ColumnId,
        value: CellValue,
        actor: Option<&User>,
    ) -> Result<()> {
        let user = actor.ok_or(StoreError::NoIdentity)?;
        self.mutate(worksheet, |sheet| {
            if sheet.column(column).is_none() {
                return Err(StoreError::ColumnNotFound(column));
            }
            let target_row = sheet.row_mut(row).ok_or(StoreError::RowNotFound(row))?;
            let previous = target_row
                .cells
                .get(&column)
                .map_or(CellValue::Null, |cell| cell.value.clone());
            target_row.cells.insert(column, CellData::edited(value.clone()));

            sheet.changes.append(
                CellKey::new(row, column),
                CellChange {
                    timestamp: Utc::now(),
                    user_id: user.id.clone(),
                    user_name: user.name.clone(),
                    previous_value: previous,
                    new_value: value,
                },
            );
            Ok(())
        })
    }

    // ===== Internals =====

    pub(crate) fn active_id(&self) -> Result<WorksheetId> {
        self.active
            .as_ref()
            .map(|worksheet| worksheet.id)
            .ok_or(StoreError::NoActiveWorksheet)
    }

    /// Apply a mutation to a clone of the target worksheet and, only on
    /// success, commit it to the collection and refresh the active
    /// snapshot when the ids match. Bumps `updated_at`.
    fn mutate<T>(
        &mut self,
        id: WorksheetId,
        op: impl FnOnce(&mut Worksheet) -> Result<T>,
    ) -> Result<T> {
        let index = self
            .worksheets
            .iter()
            .position(|worksheet| worksheet.id == id)
            .ok_or(StoreError::WorksheetNotFound(id))?;

        let mut draft = self.worksheets[index].clone();
        let out = op(&mut draft)?;
        draft.updated_at = Utc::now();

        if self.active.as_ref().is_some_and(|active| active.id == id) {
            self.active = Some(draft.clone());
        }
        self.worksheets[index] = draft;
        Ok(out)
    }

    fn mutate_active<T>(&mut self, op: impl FnOnce(&mut Worksheet) -> Result<T>) -> Result<T> {
        let target = self.active_id()?;
        self.mutate(target, op)
    }
}
