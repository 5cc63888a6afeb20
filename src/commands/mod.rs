// ABOUTME: Caller-facing table operations used by the CLI
// ABOUTME: Exports create, upload, fetch, clear, publish and delete

pub mod clear;
pub mod create;
pub mod delete;
pub mod fetch;
pub mod publish;
pub mod upload;

pub use clear::{clear_table_rows, ClearResult};
pub use create::{create_table, CreateTableResult};
pub use delete::delete_table;
pub use fetch::{download_table, DownloadResult};
pub use publish::{publish_table, PublishResult};
pub use upload::update_table;
