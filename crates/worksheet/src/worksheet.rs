use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cell::{CellData, CellValue};
use crate::column::{CellType, ColumnDefinition};
use crate::ledger::{CellChange, CellKey, ChangeLedger};

/// Unique worksheet identifier.
pub type WorksheetId = Uuid;
/// Column identifier, unique within a worksheet.
pub type ColumnId = Uuid;
/// Row identifier, unique within a worksheet.
pub type RowId = Uuid;

const NULL_CELL: &CellValue = &CellValue::Null;

/// One row of a worksheet.
///
/// `cells` is sparse: keys are a subset of the worksheet's current
/// column ids, and a missing entry reads as `CellValue::Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorksheetRow {
    pub id: RowId,
    pub cells: IndexMap<ColumnId, CellData>,
}

impl WorksheetRow {
    /// A fresh row with one null cell per given column.
    #[must_use]
    pub fn with_columns(columns: &[ColumnDefinition]) -> Self {
        WorksheetRow {
            id: Uuid::new_v4(),
            cells: columns
                .iter()
                .map(|column| (column.id, CellData::default()))
                .collect(),
        }
    }

    /// Read a cell value with sparse-default semantics.
    #[must_use]
    pub fn value(&self, column: ColumnId) -> &CellValue {
        self.cells
            .get(&column)
            .map_or(NULL_CELL, |cell| &cell.value)
    }
}

/// A named table of typed columns and rows with an audit history.
///
/// Conceptually immutable: the store applies every mutation to a clone
/// and swaps the result in, so a `&Worksheet` is always a complete,
/// self-consistent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worksheet {
    pub id: WorksheetId,
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<WorksheetRow>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub changes: ChangeLedger,
}

impl Worksheet {
    /// Create a worksheet with one default text column and no rows.
    #[must_use]
    pub fn new(name: &str, created_by: &str) -> Self {
        let now = Utc::now();
        Worksheet {
            id: Uuid::new_v4(),
            name: name.to_string(),
            columns: vec![ColumnDefinition::new("Column 1", CellType::Text)],
            rows: Vec::new(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            changes: ChangeLedger::new(),
        }
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Look up a column by id.
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub(crate) fn column_mut(&mut self, id: ColumnId) -> Option<&mut ColumnDefinition> {
        self.columns.iter_mut().find(|column| column.id == id)
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Look up a row by id.
    #[must_use]
    pub fn row(&self, id: RowId) -> Option<&WorksheetRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub(crate) fn row_mut(&mut self, id: RowId) -> Option<&mut WorksheetRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    /// The stored cell at a (row, column) intersection, if any.
    #[must_use]
    pub fn cell(&self, row: RowId, column: ColumnId) -> Option<&CellData> {
        self.row(row).and_then(|row| row.cells.get(&column))
    }

    /// Read a cell value with sparse-default semantics; an unknown row
    /// also reads as null.
    #[must_use]
    pub fn value_at(&self, row: RowId, column: ColumnId) -> &CellValue {
        self.row(row).map_or(NULL_CELL, |row| row.value(column))
    }

    /// History for one cell, oldest first. Served even for rows or
    /// columns that were deleted after the history was recorded.
    #[must_use]
    pub fn changes_for_cell(&self, row: RowId, column: ColumnId) -> &[CellChange] {
        self.changes.for_cell(&CellKey::new(row, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_worksheet_has_default_column() {
        let worksheet = Worksheet::new("W", "1");

        assert_eq!(worksheet.column_count(), 1);
        assert_eq!(worksheet.columns[0].name, "Column 1");
        assert_eq!(worksheet.columns[0].kind, CellType::Text);
        assert_eq!(worksheet.row_count(), 0);
        assert!(worksheet.changes.is_empty());
        assert_eq!(worksheet.created_at, worksheet.updated_at);
    }

    #[test]
    fn test_row_value_is_sparse() {
        let columns = vec![ColumnDefinition::new("A", CellType::Text)];
        let row = WorksheetRow::with_columns(&columns);
        let unknown_column = Uuid::new_v4();

        assert_eq!(row.value(columns[0].id), &CellValue::Null);
        assert_eq!(row.value(unknown_column), &CellValue::Null);
    }

    #[test]
    fn test_value_at_unknown_row_is_null() {
        let worksheet = Worksheet::new("W", "1");

        assert_eq!(
            worksheet.value_at(Uuid::new_v4(), worksheet.columns[0].id),
            &CellValue::Null
        );
    }
}
