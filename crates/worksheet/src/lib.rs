//! # gridbook-worksheet
//!
//! The worksheet state model: named tables of typed columns and rows,
//! per-cell values with an append-only edit history, and the store that
//! keeps a collection of worksheets consistent with a single active
//! snapshot.
//!
//! # Examples
//!
//! ## Creating a worksheet and editing cells
//!
//! ```
//! use gridbook_auth::{User, UserRole};
//! use gridbook_worksheet::{CellType, CellValue, WorksheetStore};
//!
//! let user = User {
//!     id: "1".to_string(),
//!     email: "alice@example.com".to_string(),
//!     name: "alice".to_string(),
//!     role: UserRole::Editor,
//! };
//!
//! let mut store = WorksheetStore::new();
//! store.create_worksheet("Inventory", Some(&user)).unwrap();
//!
//! let qty = store.add_column("Qty", CellType::Number).unwrap();
//! let row = store.add_row(Some(&user)).unwrap();
//! store.update_cell(row, qty, CellValue::Number(5.0), Some(&user)).unwrap();
//!
//! let history = store.changes_for_cell(row, qty);
//! assert_eq!(history.len(), 1);
//! assert_eq!(history[0].previous_value, CellValue::Null);
//! ```
//!
//! ## Importing CSV data
//!
//! ```
//! # use gridbook_auth::{User, UserRole};
//! # use gridbook_worksheet::{ImportOptions, WorksheetStore};
//! # let user = User {
//! #     id: "1".to_string(),
//! #     email: "alice@example.com".to_string(),
//! #     name: "alice".to_string(),
//! #     role: UserRole::Editor,
//! # };
//! let mut store = WorksheetStore::new();
//! store.create_worksheet("Imported", Some(&user)).unwrap();
//!
//! let summary = store
//!     .import_csv_str("Name,Age\nAlice,30\nBob,25", ImportOptions::default(), Some(&user))
//!     .unwrap();
//! assert_eq!(summary.rows_added, 2);
//! ```

mod cell;
mod column;
mod csv;
mod error;
mod ledger;
mod store;
mod worksheet;

/// Re-export cell value and cell storage types.
pub use cell::{CellData, CellValue};
/// Re-export column types.
pub use column::{CellType, ColumnDefinition, ColumnUpdate};
/// Re-export CSV import options and summary.
pub use csv::{ImportOptions, ImportSummary};
/// Re-export store error types.
pub use error::{Result, StoreError};
/// Re-export the change ledger types.
pub use ledger::{CellChange, CellKey, ChangeLedger, InvalidCellKey};
/// Re-export the worksheet store.
pub use store::WorksheetStore;
/// Re-export worksheet entities and id types.
pub use worksheet::{ColumnId, RowId, Worksheet, WorksheetId, WorksheetRow};
