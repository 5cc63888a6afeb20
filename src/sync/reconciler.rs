// ABOUTME: Row reconciliation - diffs desired rows against remote rows by path
// ABOUTME: Plans update/create/delete batches and applies them best-effort

use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::columns::ColumnResolver;
use super::pagination::fetch_all_rows;
use crate::document::RowDocument;
use crate::error::{Error, Result};
use crate::hubdb::{BatchResponse, Column, HubDbApi, Row, RowId, RowInput, TableId};

/// Normalize a row path for matching: lowercase, one trailing `/` removed.
pub fn normalize_path(path: &str) -> String {
    let lower = path.to_lowercase();
    match lower.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Fail if two desired rows resolve to the same normalized path.
pub fn ensure_unique_paths(rows: &[RowDocument]) -> Result<()> {
    let mut seen = HashSet::new();
    for path in rows.iter().filter_map(|row| row.path.as_deref()) {
        if !seen.insert(normalize_path(path)) {
            return Err(Error::DuplicatePath {
                path: path.to_string(),
            });
        }
    }
    Ok(())
}

/// Kind of batch mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Update,
    Create,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Update => write!(f, "update"),
            Operation::Create => write!(f, "create"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// One batched call. Plans only ever hold non-empty batches.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    Update(Vec<RowInput>),
    Create(Vec<RowInput>),
    Delete(Vec<RowId>),
}

impl Batch {
    pub fn operation(&self) -> Operation {
        match self {
            Batch::Update(_) => Operation::Update,
            Batch::Create(_) => Operation::Create,
            Batch::Delete(_) => Operation::Delete,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Batch::Update(rows) | Batch::Create(rows) => rows.len(),
            Batch::Delete(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The diff between desired and existing rows, computed from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationPlan {
    batches: Vec<Batch>,
    planned_updates: usize,
    planned_creations: usize,
    planned_deletions: usize,
}

impl ReconciliationPlan {
    fn new(to_update: Vec<RowInput>, to_create: Vec<RowInput>, to_delete: Vec<RowId>) -> Self {
        let planned_updates = to_update.len();
        let planned_creations = to_create.len();
        let planned_deletions = to_delete.len();

        let batches = [
            Batch::Update(to_update),
            Batch::Create(to_create),
            Batch::Delete(to_delete),
        ]
        .into_iter()
        .filter(|batch| !batch.is_empty())
        .collect();

        Self {
            batches,
            planned_updates,
            planned_creations,
            planned_deletions,
        }
    }

    /// Batches in the order they are applied: update, create, delete.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn planned_updates(&self) -> usize {
        self.planned_updates
    }

    pub fn planned_creations(&self) -> usize {
        self.planned_creations
    }

    pub fn planned_deletions(&self) -> usize {
        self.planned_deletions
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn to_update(&self) -> &[RowInput] {
        self.rows_for(Operation::Update)
    }

    pub fn to_create(&self) -> &[RowInput] {
        self.rows_for(Operation::Create)
    }

    pub fn to_delete(&self) -> &[RowId] {
        self.batches
            .iter()
            .find_map(|batch| match batch {
                Batch::Delete(ids) => Some(ids.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    fn rows_for(&self, operation: Operation) -> &[RowInput] {
        self.batches
            .iter()
            .find_map(|batch| match batch {
                Batch::Update(rows) if operation == Operation::Update => Some(rows.as_slice()),
                Batch::Create(rows) if operation == Operation::Create => Some(rows.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

/// Compute the plan for `desired` against a snapshot of `existing` rows.
///
/// Desired rows whose normalized path matches an existing row become
/// updates carrying that row's id; the rest become creations. Existing rows
/// that no desired row claimed are deleted.
pub fn plan(
    existing: &[Row],
    desired: &[RowDocument],
    resolver: &ColumnResolver<'_>,
) -> Result<ReconciliationPlan> {
    ensure_unique_paths(desired)?;

    let mut ids_by_path: HashMap<String, &RowId> = HashMap::new();
    for row in existing {
        if let Some(path) = row.path.as_deref() {
            if let Some(previous) = ids_by_path.insert(normalize_path(path), &row.id) {
                tracing::warn!(
                    "Rows {} and {} share the path \"{}\"; row {} will be deleted",
                    previous,
                    row.id,
                    path,
                    previous
                );
            }
        }
    }

    let mut to_update = Vec::new();
    let mut to_create = Vec::new();
    for row in desired {
        let id = row
            .path
            .as_deref()
            .and_then(|path| ids_by_path.get(&normalize_path(path)))
            .map(|id| (*id).clone());

        match id {
            Some(id) => to_update.push(resolver.to_wire(row, Some(id))),
            None => to_create.push(resolver.to_wire(row, None)),
        }
    }

    let matched: HashSet<&RowId> = to_update.iter().filter_map(|row| row.id.as_ref()).collect();
    let to_delete: Vec<RowId> = existing
        .iter()
        .filter(|row| !matched.contains(&row.id))
        .map(|row| row.id.clone())
        .collect();

    Ok(ReconciliationPlan::new(to_update, to_create, to_delete))
}

/// A failure reported while applying a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MutationError {
    /// Per-row error returned inside a batch response
    Row { operation: Operation, detail: Value },
    /// The whole batch call failed
    Batch {
        operation: Operation,
        message: String,
    },
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::Row { operation, detail } => {
                write!(f, "{} row error: {}", operation, detail)
            }
            MutationError::Batch { operation, message } => {
                write!(f, "{} batch failed: {}", operation, message)
            }
        }
    }
}

/// Outcome of a reconciliation run.
///
/// Planned counts always equal the plan's partition sizes; applied counts
/// come from the responses and stay 0 for skipped or failed batches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub table_id: TableId,
    pub planned_updates: usize,
    pub update_count: usize,
    pub planned_creations: usize,
    pub create_count: usize,
    pub planned_deletions: usize,
    pub delete_count: usize,
    pub errors: Vec<MutationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_row_count: Option<u64>,
}

impl ReconciliationReport {
    fn planned(table_id: &TableId, plan: &ReconciliationPlan) -> Self {
        Self {
            table_id: table_id.clone(),
            planned_updates: plan.planned_updates,
            update_count: 0,
            planned_creations: plan.planned_creations,
            create_count: 0,
            planned_deletions: plan.planned_deletions,
            delete_count: 0,
            errors: Vec::new(),
            published_row_count: None,
        }
    }

    fn record(&mut self, operation: Operation, response: &BatchResponse) {
        match operation {
            Operation::Update => self.update_count = response.written_count(),
            Operation::Create => self.create_count = response.written_count(),
            Operation::Delete => self.delete_count = response.deleted_count(),
        }

        self.errors.extend(row_errors(operation, response));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Turn collected mutation errors into `Error::PartialMutation`.
    pub fn ensure_clean(&self) -> Result<()> {
        ensure_clean(&self.errors)
    }
}

/// Row-level errors of a batch response, tagged with the batch operation.
pub fn row_errors(operation: Operation, response: &BatchResponse) -> Vec<MutationError> {
    response
        .row_errors()
        .into_iter()
        .map(|detail| MutationError::Row { operation, detail })
        .collect()
}

/// `Error::PartialMutation` when any mutation error was collected.
pub fn ensure_clean(errors: &[MutationError]) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(Error::PartialMutation {
        count: errors.len(),
    })
}

/// Applies reconciliation plans through a data-access implementation.
pub struct Reconciler<'a> {
    api: &'a dyn HubDbApi,
}

impl<'a> Reconciler<'a> {
    pub fn new(api: &'a dyn HubDbApi) -> Self {
        Self { api }
    }

    /// Make the remote rows of `table_id` match `desired`.
    ///
    /// Reads the full current row set, plans the diff and applies it. Fetch
    /// and planning failures are returned as errors; batch failures end up
    /// in the report.
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table whose draft rows are reconciled
    /// * `desired` - Rows from the local document, keyed by column name
    /// * `columns` - Column catalog used to resolve names to ids
    ///
    /// # Returns
    ///
    /// Planned and applied counts per operation plus every mutation error
    pub async fn reconcile(
        &self,
        table_id: &TableId,
        desired: &[RowDocument],
        columns: &[Column],
    ) -> Result<ReconciliationReport> {
        let existing = fetch_all_rows(self.api, table_id).await?;
        let resolver = ColumnResolver::new(columns);
        let plan = plan(&existing, desired, &resolver)?;

        tracing::info!(
            "Table {}: {} existing rows, {} to update, {} to create, {} to delete",
            table_id,
            existing.len(),
            plan.planned_updates,
            plan.planned_creations,
            plan.planned_deletions
        );

        Ok(self.apply(table_id, plan).await)
    }

    /// Issue each batch of the plan in order.
    ///
    /// Batches are independent: a failed call is recorded and the remaining
    /// batches are still sent.
    pub async fn apply(&self, table_id: &TableId, plan: ReconciliationPlan) -> ReconciliationReport {
        let mut report = ReconciliationReport::planned(table_id, &plan);

        for batch in plan.batches {
            let operation = batch.operation();
            tracing::debug!(
                "Sending {} batch of {} rows to table {}",
                operation,
                batch.len(),
                table_id
            );

            let outcome = match &batch {
                Batch::Update(rows) => self.api.update_rows(table_id, rows).await,
                Batch::Create(rows) => self.api.create_rows(table_id, rows).await,
                Batch::Delete(ids) => self.api.delete_rows(table_id, ids).await,
            };

            match outcome {
                Ok(response) => report.record(operation, &response),
                Err(e) => {
                    tracing::warn!("{} batch for table {} failed: {}", operation, table_id, e);
                    report.errors.push(MutationError::Batch {
                        operation,
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
