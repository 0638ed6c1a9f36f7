use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::worksheet::ColumnId;

/// The declared type of a column.
///
/// `Formula` is carried as data only; nothing evaluates it. A column's
/// type never cascades into already-stored cell values, so readers must
/// tolerate a mismatch between the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    #[default]
    Text,
    Number,
    Date,
    Dropdown,
    Checkbox,
    Formula,
}

/// Definition of one worksheet column. The id is assigned at creation
/// and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub id: ColumnId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CellType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Choice set for `Dropdown` columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Unevaluated expression for `Formula` columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl ColumnDefinition {
    /// Create a column with a fresh unique id.
    #[must_use]
    pub fn new(name: &str, kind: CellType) -> Self {
        ColumnDefinition {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind,
            width: None,
            options: None,
            formula: None,
        }
    }

    /// Merge the set fields of a partial update; the id is untouched.
    pub(crate) fn apply(&mut self, update: ColumnUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(width) = update.width {
            self.width = Some(width);
        }
        if let Some(options) = update.options {
            self.options = Some(options);
        }
        if let Some(formula) = update.formula {
            self.formula = Some(formula);
        }
    }
}

/// Partial update for `WorksheetStore::update_column`.
/// `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ColumnUpdate {
    pub name: Option<String>,
    pub kind: Option<CellType>,
    pub width: Option<f64>,
    pub options: Option<Vec<String>>,
    pub formula: Option<String>,
}

impl ColumnUpdate {
    /// Rename the column.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Change the column type.
    #[must_use]
    pub fn with_kind(mut self, kind: CellType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the display width.
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the dropdown choice set.
    #[must_use]
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the formula expression.
    #[must_use]
    pub fn with_formula(mut self, formula: &str) -> Self {
        self.formula = Some(formula.to_string());
        self
    }
}
