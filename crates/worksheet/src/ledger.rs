use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::cell::CellValue;
use crate::worksheet::{ColumnId, RowId};

/// Composite key addressing one cell, rendered as `"rowId:columnId"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub row: RowId,
    pub column: ColumnId,
}

impl CellKey {
    #[must_use]
    pub fn new(row: RowId, column: ColumnId) -> Self {
        CellKey { row, column }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// Error parsing a `"rowId:columnId"` cell key.
#[derive(Debug, Error)]
#[error("Invalid cell key: {0}")]
pub struct InvalidCellKey(String);

impl FromStr for CellKey {
    type Err = InvalidCellKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, column) = s.split_once(':').ok_or_else(|| InvalidCellKey(s.to_string()))?;
        Ok(CellKey {
            row: row.parse().map_err(|_| InvalidCellKey(s.to_string()))?,
            column: column.parse().map_err(|_| InvalidCellKey(s.to_string()))?,
        })
    }
}

impl Serialize for CellKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// One recorded prior-value to new-value transition for a cell,
/// attributed to an actor and timestamp. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellChange {
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub previous_value: CellValue,
    pub new_value: CellValue,
}

/// Append-only per-cell history log.
///
/// Entries are retained for the lifetime of the worksheet: there is no
/// compaction or eviction, and deleting a row or column leaves its
/// recorded history in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLedger {
    entries: IndexMap<CellKey, Vec<CellChange>>,
}

impl ChangeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change to a cell's history, creating the list on the
    /// first write.
    pub(crate) fn append(&mut self, key: CellKey, change: CellChange) {
        self.entries.entry(key).or_default().push(change);
    }

    /// History for one cell, oldest first. Empty when nothing was
    /// recorded.
    #[must_use]
    pub fn for_cell(&self, key: &CellKey) -> &[CellChange] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    /// Number of cells with at least one recorded change.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over recorded histories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &[CellChange])> {
        self.entries.iter().map(|(key, list)| (key, list.as_slice()))
    }
}
