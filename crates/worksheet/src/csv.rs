use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use gridbook_auth::User;
use tracing::info;

use crate::cell::CellValue;
use crate::column::CellType;
use crate::error::{Result, StoreError};
use crate::store::WorksheetStore;
use crate::worksheet::{ColumnId, WorksheetId};

/// CSV import options.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Field delimiter (default: ',').
    pub delimiter: u8,
    /// Infer value types instead of importing everything as text.
    pub infer_types: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            delimiter: b',',
            infer_types: false,
        }
    }
}

impl ImportOptions {
    /// Options for TSV (tab-separated values).
    #[must_use]
    pub fn tsv() -> Self {
        ImportOptions {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Set the delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to infer value types.
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub worksheet: WorksheetId,
    pub rows_added: usize,
    pub columns_added: usize,
}

impl WorksheetStore {
    /// Import CSV text into the active worksheet.
    pub fn import_csv_str(
        &mut self,
        content: &str,
        options: ImportOptions,
        actor: Option<&User>,
    ) -> Result<ImportSummary> {
        self.import_csv_reader(content.as_bytes(), options, actor)
    }

    /// Import a CSV file into the active worksheet.
    pub fn import_csv_path<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: ImportOptions,
        actor: Option<&User>,
    ) -> Result<ImportSummary> {
        let file = File::open(path.as_ref())?;
        self.import_csv_reader(BufReader::new(file), options, actor)
    }

    /// Import CSV data from a reader into the active worksheet.
    ///
    /// The first record is the header row; input without one is an
    /// error. A header that matches an existing column name reuses that
    /// column, any other non-blank header becomes a new text column.
    /// Every data record adds one row, writing each value to its aligned
    /// column and skipping blank values so those cells stay absent.
    /// Rows committed before a malformed record are kept.
    pub fn import_csv_reader<R: Read>(
        &mut self,
        reader: R,
        options: ImportOptions,
        actor: Option<&User>,
    ) -> Result<ImportSummary> {
        let target = self.active_id()?;
        actor.ok_or(StoreError::NoIdentity)?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.into_records();
        let header = match records.next() {
            Some(record) => record?,
            None => return Err(StoreError::EmptyImport),
        };

        // Map header positions onto column ids, creating text columns
        // for headers the worksheet does not have yet.
        let mut mapping: Vec<Option<ColumnId>> = Vec::with_capacity(header.len());
        let mut columns_added = 0usize;
        for field in header.iter() {
            let name = field.trim();
            if name.is_empty() {
                mapping.push(None);
                continue;
            }
            let existing = self
                .get(target)
                .and_then(|worksheet| worksheet.column_by_name(name))
                .map(|column| column.id);
            let column = match existing {
                Some(id) => id,
                None => {
                    columns_added += 1;
                    self.add_column(name, CellType::Text)?
                }
            };
            mapping.push(Some(column));
        }

        let mut rows_added = 0usize;
        for record in records {
            let record = record?;
            let row = self.add_row_in(target, actor)?;
            for (index, field) in record.iter().enumerate() {
                let column = match mapping.get(index) {
                    Some(Some(id)) => *id,
                    _ => continue,
                };
                let field = field.trim();
                if field.is_empty() {
                    continue;
                }
                let value = if options.infer_types {
                    CellValue::parse(field)
                } else {
                    CellValue::Text(field.to_string())
                };
                self.update_cell_in(target, row, column, value, actor)?;
            }
            rows_added += 1;
        }

        info!(worksheet = %target, rows_added, columns_added, "csv import finished");
        Ok(ImportSummary {
            worksheet: target,
            rows_added,
            columns_added,
        })
    }
}
