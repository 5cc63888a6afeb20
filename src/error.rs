// ABOUTME: Error taxonomy for table sync operations
// ABOUTME: Separates local validation, schema sync, mutation and transport failures

use std::path::PathBuf;

use thiserror::Error;

/// All errors surfaced by the library.
#[derive(Debug, Error)]
pub enum Error {
    // Validation errors, raised before any network call
    #[error("The HubDB table file must be a \".json\" file: {}", path.display())]
    InvalidExtension { path: PathBuf },

    #[error("The \"{}\" path is not a path to a file", path.display())]
    NotAFile { path: PathBuf },

    #[error("Failed to parse table document {}: {source}", path.display())]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Multiple rows resolve to the path \"{path}\"")]
    DuplicatePath { path: String },

    // Schema errors are fatal: rows cannot be resolved without a column catalog
    #[error("Failed to sync schema of table {table}: {source}")]
    SchemaSync {
        table: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{count} row mutation(s) reported errors")]
    PartialMutation { count: usize },

    // Transport errors
    #[error("Request to {operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed with status {status}: {body}")]
    Http {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error(
        "Authentication failed. The access token may be invalid or expired.\n\
         Check the account configuration or the HUBDB_ACCESS_TOKEN environment variable"
    )]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unexpected response from {operation}: {message}")]
    UnexpectedResponse {
        operation: &'static str,
        message: String,
    },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors raised from local input checks.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidExtension { .. }
                | Error::NotAFile { .. }
                | Error::InvalidDocument { .. }
                | Error::DuplicatePath { .. }
        )
    }

    pub(crate) fn unexpected(operation: &'static str, message: impl Into<String>) -> Self {
        Error::UnexpectedResponse {
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
