// ABOUTME: Remote HubDB tables API: wire models, data-access trait and HTTP client
// ABOUTME: Everything that knows the service's JSON shapes lives here

mod api;
mod client;
pub mod models;

pub use api::HubDbApi;
pub use client::{HubDbClient, DEFAULT_API_URL};
pub use models::{
    BatchResponse, BatchSummary, Column, ColumnId, PageRequest, PublishResponse, Row, RowId,
    RowInput, RowPage, Table, TableHandle, TableId,
};
