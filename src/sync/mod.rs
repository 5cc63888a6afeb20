// ABOUTME: Sync engine: pagination, column resolution, row reconciliation,
// ABOUTME: schema synchronization and export of remote tables

pub mod columns;
pub mod export;
pub mod pagination;
pub mod reconciler;
pub mod schema;

pub use columns::ColumnResolver;
pub use export::to_document;
pub use pagination::fetch_all_rows;
pub use reconciler::{
    ensure_clean, ensure_unique_paths, normalize_path, plan, row_errors, Batch, MutationError,
    Operation, ReconciliationPlan, ReconciliationReport, Reconciler,
};
pub use schema::{sync_schema, SyncedSchema};
