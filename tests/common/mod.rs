// ABOUTME: In-memory HubDbApi fake shared by the integration tests
// ABOUTME: Stores one table, serves paged rows and counts every call

#![allow(dead_code)]

use async_trait::async_trait;
use hubdb_sync::document::TableSchema;
use hubdb_sync::hubdb::{
    BatchResponse, Column, ColumnId, HubDbApi, PageRequest, PublishResponse, Row, RowId,
    RowInput, RowPage, Table, TableHandle, TableId,
};
use hubdb_sync::{Error, Result};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Which pagination protocol the fake answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    Cursor,
    Offset,
}

#[derive(Debug, Default)]
pub struct State {
    pub table: Option<Table>,
    pub rows: Vec<Row>,
    pub next_row_id: u64,
    pub calls: HashMap<&'static str, usize>,
    pub failing: Vec<&'static str>,
    pub row_errors: HashMap<&'static str, Vec<Value>>,
    pub page_requests: Vec<PageRequest>,
    pub delete_limit: Option<usize>,
    pub stuck_cursor: bool,
    pub phantom_rows: u64,
}

pub struct FakeHubDb {
    pub state: Mutex<State>,
    pub page_size: usize,
    pub paging: Paging,
}

pub fn column(id: &str, name: &str) -> Column {
    serde_json::from_value(json!({"id": id, "name": name, "label": name, "type": "TEXT"}))
        .unwrap()
}

pub fn row(id: &str, path: &str, values: Value) -> Row {
    serde_json::from_value(json!({"id": id, "path": path, "name": path, "values": values}))
        .unwrap()
}

pub fn table(id: &str, columns: Vec<Column>) -> Table {
    let mut table: Table = serde_json::from_value(json!({
        "id": id,
        "name": "events",
        "label": "Events",
        "allowPublicApiAccess": true,
        "dynamicMetaTags": {"DESCRIPTION": 2}
    }))
    .unwrap();
    table.columns = columns;
    table
}

impl FakeHubDb {
    pub fn new(paging: Paging, page_size: usize) -> Self {
        Self {
            state: Mutex::new(State {
                next_row_id: 1000,
                ..State::default()
            }),
            page_size,
            paging,
        }
    }

    pub fn with_table(self, table: Table, rows: Vec<Row>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.table = Some(table);
            state.rows = rows;
        }
        self
    }

    pub fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.push(operation);
    }

    pub fn row_errors(&self, operation: &'static str, errors: Vec<Value>) {
        self.state
            .lock()
            .unwrap()
            .row_errors
            .insert(operation, errors);
    }

    /// Every cursor page points at the same `after` token
    pub fn stick_cursor(&self) {
        self.state.lock().unwrap().stuck_cursor = true;
    }

    /// Offset pages report `extra` more rows in `total` than are served
    pub fn inflate_total(&self, extra: u64) {
        self.state.lock().unwrap().phantom_rows = extra;
    }

    /// Only the first `limit` ids of each delete batch are removed
    pub fn limit_deletes(&self, limit: usize) {
        self.state.lock().unwrap().delete_limit = Some(limit);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn rows(&self) -> Vec<Row> {
        self.state.lock().unwrap().rows.clone()
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.state.lock().unwrap().page_requests.clone()
    }

    fn enter(&self, operation: &'static str) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_insert(0) += 1;
        if state.failing.contains(&operation) {
            return Err(Error::Http {
                operation,
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(state)
    }

    fn respond(state: &State, operation: &'static str, summary: Value) -> BatchResponse {
        let mut items = vec![summary];
        if let Some(errors) = state.row_errors.get(operation) {
            items.extend(errors.iter().cloned());
        }
        BatchResponse::Items(items)
    }
}

fn columns_from_schema(schema: &TableSchema) -> Vec<Column> {
    schema
        .columns
        .iter()
        .enumerate()
        .map(|(index, c)| column(&(index + 1).to_string(), &c.name))
        .collect()
}

fn to_row(id: RowId, input: &RowInput) -> Row {
    Row {
        id,
        path: input.path.clone(),
        name: input.name.clone(),
        child_table_id: None,
        is_soft_editable: input.is_soft_editable,
        values: input.values.clone(),
    }
}

#[async_trait]
impl HubDbApi for FakeHubDb {
    async fn create_table(&self, schema: &TableSchema) -> Result<TableHandle> {
        let mut state = self.enter("create_table")?;
        let columns = columns_from_schema(schema);
        let mut created = table("77", columns.clone());
        created.name = schema.name.clone();
        state.table = Some(created);
        Ok(TableHandle {
            id: Some(TableId::from("77")),
            columns,
        })
    }

    async fn update_table(&self, table_id: &TableId, schema: &TableSchema) -> Result<TableHandle> {
        let mut state = self.enter("update_table")?;
        let table = state
            .table
            .as_mut()
            .filter(|t| &t.id == table_id)
            .ok_or_else(|| Error::NotFound(format!("Table {}", table_id)))?;

        // Keep ids of columns that survive by name, assign new ones otherwise
        let mut columns = Vec::new();
        for (index, wanted) in schema.columns.iter().enumerate() {
            match table.columns.iter().find(|c| c.name == wanted.name) {
                Some(existing) => columns.push(existing.clone()),
                None => columns.push(column(&format!("{}", 100 + index), &wanted.name)),
            }
        }
        table.columns = columns.clone();
        Ok(TableHandle { id: None, columns })
    }

    async fn fetch_table(&self, table_id: &TableId) -> Result<Table> {
        let state = self.enter("fetch_table")?;
        state
            .table
            .clone()
            .filter(|t| &t.id == table_id)
            .ok_or_else(|| Error::NotFound(format!("Table {}", table_id)))
    }

    async fn fetch_rows(&self, _table_id: &TableId, page: &PageRequest) -> Result<RowPage> {
        let mut state = self.enter("fetch_rows")?;
        state.page_requests.push(page.clone());

        let start = match page {
            PageRequest::First => 0,
            PageRequest::After(after) => after.parse::<usize>().unwrap(),
            PageRequest::Offset(offset) => *offset as usize,
        };
        let end = (start + self.page_size).min(state.rows.len());
        let rows = state.rows[start.min(end)..end].to_vec();

        Ok(match self.paging {
            Paging::Cursor => {
                let after = if state.stuck_cursor {
                    Some(self.page_size.to_string())
                } else {
                    (end < state.rows.len()).then(|| end.to_string())
                };
                RowPage::cursor(rows, after.as_deref())
            }
            Paging::Offset => RowPage::Offset {
                objects: rows,
                total: state.rows.len() as u64 + state.phantom_rows,
            },
        })
    }

    async fn create_rows(&self, _table_id: &TableId, rows: &[RowInput]) -> Result<BatchResponse> {
        let mut state = self.enter("create_rows")?;
        let mut results = Vec::new();
        for input in rows {
            state.next_row_id += 1;
            let id = RowId::from(state.next_row_id);
            results.push(json!({"id": id.as_str()}));
            let created = to_row(id, input);
            state.rows.push(created);
        }
        Ok(Self::respond(
            &state,
            "create_rows",
            json!({"status": "COMPLETE", "results": results}),
        ))
    }

    async fn update_rows(&self, _table_id: &TableId, rows: &[RowInput]) -> Result<BatchResponse> {
        let mut state = self.enter("update_rows")?;
        let mut results = Vec::new();
        for input in rows {
            let id = input.id.clone().expect("update rows carry ids");
            if let Some(existing) = state.rows.iter_mut().find(|r| r.id == id) {
                *existing = to_row(id.clone(), input);
                results.push(json!({"id": id.as_str()}));
            }
        }
        Ok(Self::respond(
            &state,
            "update_rows",
            json!({"status": "COMPLETE", "results": results}),
        ))
    }

    async fn delete_rows(&self, _table_id: &TableId, row_ids: &[RowId]) -> Result<BatchResponse> {
        let mut state = self.enter("delete_rows")?;
        let limit = state.delete_limit.unwrap_or(row_ids.len()).min(row_ids.len());
        let deleted = &row_ids[..limit];
        state.rows.retain(|r| !deleted.contains(&r.id));
        let ids: Vec<Value> = deleted.iter().map(|id| json!(id.as_str())).collect();
        Ok(Self::respond(&state, "delete_rows", json!({"rowIds": ids})))
    }

    async fn publish_table(&self, _table_id: &TableId) -> Result<PublishResponse> {
        let state = self.enter("publish_table")?;
        Ok(PublishResponse {
            row_count: Some(state.rows.len() as u64),
        })
    }

    async fn delete_table(&self, table_id: &TableId) -> Result<()> {
        let mut state = self.enter("delete_table")?;
        if state.table.as_ref().map(|t| &t.id) != Some(table_id) {
            return Err(Error::NotFound(format!("Table {}", table_id)));
        }
        state.table = None;
        state.rows.clear();
        Ok(())
    }
}

/// Values map keyed by column id
pub fn wire_values(pairs: &[(&str, Value)]) -> BTreeMap<ColumnId, Value> {
    pairs
        .iter()
        .map(|(id, value)| (ColumnId::from(*id), value.clone()))
        .collect()
}
