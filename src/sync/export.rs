// ABOUTME: Converts a fetched table and its rows into the canonical local document
// ABOUTME: Projects columns through an allow-list and re-keys values by column name

use super::columns::ColumnResolver;
use crate::document::{ColumnDocument, RowDocument, TableDocument, TableSchema};
use crate::hubdb::{Column, Row, Table};

impl From<&Column> for ColumnDocument {
    fn from(column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            label: column.label.clone(),
            column_type: column.column_type.clone(),
            options: column.options.clone(),
            foreign_table_id: column.foreign_table_id.clone(),
            foreign_column_id: column.foreign_column_id.clone(),
        }
    }
}

/// Build the local document for `table` and `rows`.
///
/// Only live columns are kept. Column and row order follow the input, so
/// the same snapshot always produces the same document.
pub fn to_document(table: &Table, rows: &[Row]) -> TableDocument {
    let resolver = ColumnResolver::new(&table.columns);

    let columns = resolver.live_columns().map(ColumnDocument::from).collect();

    let rows = rows
        .iter()
        .map(|row| RowDocument {
            path: row.path.clone(),
            name: row.name.clone(),
            is_soft_editable: row.is_soft_editable,
            values: resolver.from_wire(row),
        })
        .collect();

    TableDocument {
        schema: TableSchema {
            name: table.name.clone(),
            use_for_pages: table.use_for_pages,
            label: table.label.clone(),
            allow_child_tables: table.allow_child_tables,
            allow_public_api_access: table.allow_public_api_access,
            dynamic_meta_tags: table.dynamic_meta_tags.clone(),
            enable_child_table_pages: table.enable_child_table_pages,
            columns,
        },
        rows,
    }
}
