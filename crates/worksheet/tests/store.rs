use gridbook_auth::{User, UserRole};
use gridbook_worksheet::{
    CellData, CellType, CellValue, ColumnUpdate, StoreError, Worksheet, WorksheetStore,
};
use std::collections::HashSet;

fn editor() -> User {
    User {
        id: "1".to_string(),
        email: "alice@example.com".to_string(),
        name: "alice".to_string(),
        role: UserRole::Editor,
    }
}

fn viewer() -> User {
    User {
        id: "2".to_string(),
        email: "bob@example.com".to_string(),
        name: "bob".to_string(),
        role: UserRole::Viewer,
    }
}

// ===== Id Uniqueness =====

#[test]
fn test_column_and_row_ids_are_unique() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();

    let mut ids = HashSet::new();
    for i in 0..8 {
        let column = store
            .add_column(&format!("C{i}"), CellType::Text)
            .unwrap();
        assert!(ids.insert(column));
    }
    for _ in 0..8 {
        let row = store.add_row(Some(&user)).unwrap();
        assert!(ids.insert(row));
    }

    // The default column is distinct from everything added above.
    let default_column = store.active_worksheet().unwrap().columns[0].id;
    assert!(ids.insert(default_column));
}

#[test]
fn test_worksheet_ids_are_unique() {
    let user = editor();
    let mut store = WorksheetStore::new();

    let first = store.create_worksheet("A", Some(&user)).unwrap();
    let second = store.create_worksheet("B", Some(&user)).unwrap();

    assert_ne!(first, second);
    assert_eq!(store.len(), 2);
}

// ===== Cell Edits and History =====

#[test]
fn test_basic_edit_scenario() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    let qty = store.add_column("Qty", CellType::Number).unwrap();
    let row = store.add_row(Some(&user)).unwrap();

    store
        .update_cell(row, qty, CellValue::Number(5.0), Some(&user))
        .unwrap();

    let worksheet = store.active_worksheet().unwrap();
    let cell = worksheet.cell(row, qty).unwrap();
    assert_eq!(cell.value, CellValue::Number(5.0));
    assert!(cell.edited);

    let history = store.changes_for_cell(row, qty);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].previous_value, CellValue::Null);
    assert_eq!(history[0].new_value, CellValue::Number(5.0));
    assert_eq!(history[0].user_id, user.id);
    assert_eq!(history[0].user_name, user.name);
}

#[test]
fn test_history_links_previous_to_prior_value() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    let qty = store.add_column("Qty", CellType::Number).unwrap();
    let row = store.add_row(Some(&user)).unwrap();

    store
        .update_cell(row, qty, CellValue::Number(1.0), Some(&user))
        .unwrap();
    store
        .update_cell(row, qty, CellValue::Number(2.0), Some(&user))
        .unwrap();

    let history = store.changes_for_cell(row, qty);
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].previous_value, CellValue::Number(1.0));
    assert_eq!(history[1].new_value, CellValue::Number(2.0));
}

#[test]
fn test_history_is_append_only_and_order_preserving() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    let qty = store.add_column("Qty", CellType::Number).unwrap();
    let row = store.add_row(Some(&user)).unwrap();

    store
        .update_cell(row, qty, CellValue::Number(0.0), Some(&user))
        .unwrap();
    let first_entry = store.changes_for_cell(row, qty)[0].clone();

    for i in 1..5 {
        store
            .update_cell(row, qty, CellValue::Number(f64::from(i)), Some(&user))
            .unwrap();
    }

    let history = store.changes_for_cell(row, qty);
    assert_eq!(history.len(), 5);
    for (i, change) in history.iter().enumerate() {
        assert_eq!(change.new_value, CellValue::Number(i as f64));
    }
    // The earliest entry was not rewritten by later edits.
    assert_eq!(history[0], first_entry);
}

#[test]
fn test_history_attributes_each_writer() {
    let alice = editor();
    let bob = viewer();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&alice)).unwrap();
    let qty = store.add_column("Qty", CellType::Number).unwrap();
    let row = store.add_row(Some(&alice)).unwrap();

    store
        .update_cell(row, qty, CellValue::Number(1.0), Some(&alice))
        .unwrap();
    store
        .update_cell(row, qty, CellValue::Number(2.0), Some(&bob))
        .unwrap();

    let history = store.changes_for_cell(row, qty);
    assert_eq!(history[0].user_name, "alice");
    assert_eq!(history[1].user_name, "bob");
}

#[test]
fn test_update_cell_requires_identity_and_known_ids() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    let qty = store.add_column("Qty", CellType::Number).unwrap();
    let row = store.add_row(Some(&user)).unwrap();
    let missing = uuid::Uuid::new_v4();

    assert!(matches!(
        store.update_cell(row, qty, CellValue::Number(1.0), None),
        Err(StoreError::NoIdentity)
    ));
    assert!(matches!(
        store.update_cell(missing, qty, CellValue::Number(1.0), Some(&user)),
        Err(StoreError::RowNotFound(_))
    ));
    assert!(matches!(
        store.update_cell(row, missing, CellValue::Number(1.0), Some(&user)),
        Err(StoreError::ColumnNotFound(_))
    ));

    // Nothing was written or recorded.
    assert!(store.changes_for_cell(row, qty).is_empty());
    assert_eq!(
        store.active_worksheet().unwrap().value_at(row, qty),
        &CellValue::Null
    );
}

// ===== Column Operations =====

#[test]
fn test_delete_column_prunes_cells_but_preserves_history() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    let qty = store.add_column("Qty", CellType::Number).unwrap();
    let row = store.add_row(Some(&user)).unwrap();
    store
        .update_cell(row, qty, CellValue::Number(5.0), Some(&user))
        .unwrap();

    store.delete_column(qty).unwrap();

    let worksheet = store.active_worksheet().unwrap();
    assert!(worksheet.column(qty).is_none());
    assert!(!worksheet.rows[0].cells.contains_key(&qty));

    let history = store.changes_for_cell(row, qty);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].new_value, CellValue::Number(5.0));
}

#[test]
fn test_delete_row_preserves_history() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    let qty = store.add_column("Qty", CellType::Number).unwrap();
    let row = store.add_row(Some(&user)).unwrap();
    store
        .update_cell(row, qty, CellValue::Number(5.0), Some(&user))
        .unwrap();

    store.delete_row(row).unwrap();

    assert_eq!(store.active_worksheet().unwrap().row_count(), 0);
    assert_eq!(store.changes_for_cell(row, qty).len(), 1);
}

#[test]
fn test_sparse_default_for_rows_created_before_column() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    let row = store.add_row(Some(&user)).unwrap();

    let late_column = store.add_column("Late", CellType::Text).unwrap();

    let worksheet = store.active_worksheet().unwrap();
    assert!(worksheet.cell(row, late_column).is_none());
    assert_eq!(worksheet.value_at(row, late_column), &CellValue::Null);

    store
        .update_cell(row, late_column, CellValue::from("now set"), Some(&user))
        .unwrap();
    assert_eq!(
        store.active_worksheet().unwrap().value_at(row, late_column),
        &CellValue::Text("now set".to_string())
    );
}

#[test]
fn test_new_rows_get_one_cell_per_column() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    store.add_column("A", CellType::Text).unwrap();
    store.add_column("B", CellType::Number).unwrap();

    let row = store.add_row(Some(&user)).unwrap();

    let worksheet = store.active_worksheet().unwrap();
    let row = worksheet.row(row).unwrap();
    assert_eq!(row.cells.len(), 3);
    assert!(row.cells.values().all(|cell| cell == &CellData::default()));
}

#[test]
fn test_update_column_does_not_coerce_stored_values() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    let column = store.add_column("Count", CellType::Number).unwrap();
    let row = store.add_row(Some(&user)).unwrap();
    store
        .update_cell(row, column, CellValue::Number(7.0), Some(&user))
        .unwrap();

    store
        .update_column(column, ColumnUpdate::default().with_kind(CellType::Text))
        .unwrap();

    let worksheet = store.active_worksheet().unwrap();
    assert_eq!(worksheet.column(column).unwrap().kind, CellType::Text);
    assert_eq!(worksheet.value_at(row, column), &CellValue::Number(7.0));
}

// ===== Active Worksheet =====

#[test]
fn test_set_active_worksheet_switches_target() {
    let user = editor();
    let mut store = WorksheetStore::new();
    let first = store.create_worksheet("First", Some(&user)).unwrap();
    store.create_worksheet("Second", Some(&user)).unwrap();

    store.set_active_worksheet(first).unwrap();
    store.add_column("Only here", CellType::Text).unwrap();

    assert_eq!(store.get(first).unwrap().column_count(), 2);
    assert_eq!(
        store
            .worksheets()
            .iter()
            .find(|worksheet| worksheet.name == "Second")
            .unwrap()
            .column_count(),
        1
    );
}

#[test]
fn test_set_active_worksheet_unknown_id_is_a_no_op() {
    let user = editor();
    let mut store = WorksheetStore::new();
    store.create_worksheet("W", Some(&user)).unwrap();
    let before = store.active_worksheet().unwrap().clone();

    let result = store.set_active_worksheet(uuid::Uuid::new_v4());

    assert!(matches!(result, Err(StoreError::WorksheetNotFound(_))));
    assert_eq!(store.active_worksheet().unwrap(), &before);
}

#[test]
fn test_operations_without_active_worksheet_fail_cleanly() {
    let user = editor();
    let mut store = WorksheetStore::new();

    assert!(matches!(
        store.add_column("C", CellType::Text),
        Err(StoreError::NoActiveWorksheet)
    ));
    assert!(matches!(
        store.add_row(Some(&user)),
        Err(StoreError::NoActiveWorksheet)
    ));
    assert!(store
        .changes_for_cell(uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
        .is_empty());
}

// ===== Seeded Stores =====

#[test]
fn test_with_worksheets_seeds_collection() {
    let seeded = Worksheet::new("Seeded", "1");
    let id = seeded.id;
    let mut store = WorksheetStore::with_worksheets(vec![seeded]);

    assert!(store.active_worksheet().is_none());
    assert!(store.contains(id));

    store.set_active_worksheet(id).unwrap();
    assert_eq!(store.active_worksheet().unwrap().name, "Seeded");
}

#[test]
fn test_update_cell_drops_stored_formula() {
    let user = editor();
    let mut seeded = Worksheet::new("Seeded", "1");
    let column = seeded.columns[0].id;
    let mut row = gridbook_worksheet::WorksheetRow::with_columns(&seeded.columns);
    row.cells.insert(
        column,
        CellData {
            value: CellValue::Number(3.0),
            display_value: None,
            edited: false,
            formula: Some("=A1+B1".to_string()),
        },
    );
    let row_id = row.id;
    seeded.rows.push(row);

    let id = seeded.id;
    let mut store = WorksheetStore::with_worksheets(vec![seeded]);
    store.set_active_worksheet(id).unwrap();

    store
        .update_cell(row_id, column, CellValue::Number(4.0), Some(&user))
        .unwrap();

    let cell = store.active_worksheet().unwrap().cell(row_id, column).unwrap();
    assert_eq!(cell.value, CellValue::Number(4.0));
    assert!(cell.edited);
    assert!(cell.formula.is_none());

    let history = store.changes_for_cell(row_id, column);
    assert_eq!(history[0].previous_value, CellValue::Number(3.0));
}
