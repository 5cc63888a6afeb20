// ABOUTME: Library root for hubdb-sync
// ABOUTME: Keeps a remote HubDB table in sync with a local JSON document

pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod hubdb;
pub mod sync;

pub use error::{Error, Result};
