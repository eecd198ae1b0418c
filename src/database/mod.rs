//! Database - The storage collaborator rows persist themselves through.
//!
//! The collection never talks to a database directly. It only threads a
//! shared [`DatabaseHandle`] through to its rows, which call into it from
//! their own insert/update/save/remove implementations.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sql_collection::{DatabaseHandle, InMemoryDatabase, RowCollection};
//!
//! let database: DatabaseHandle = Arc::new(InMemoryDatabase::new());
//! let mut users = RowCollection::new();
//! users.set_database(database).set_table("users")?;
//! ```

mod in_memory;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::model::Fields;

/// Record-level storage operations a row needs to persist itself.
///
/// `primary` names the primary-key column of `table`; `key` is the value of
/// that column identifying a single record.
pub trait Database: Send + Sync {
    /// Insert a record and return its primary-key value.
    ///
    /// When `fields` has no (or a null) primary value the store assigns one.
    fn insert_row(&self, table: &str, primary: &str, fields: &Fields) -> Result<Value, DatabaseError>;

    /// Replace the stored record identified by `key`.
    fn update_row(
        &self,
        table: &str,
        primary: &str,
        key: &Value,
        fields: &Fields,
    ) -> Result<(), DatabaseError>;

    /// Delete a record. Returns true if it existed.
    fn remove_row(&self, table: &str, primary: &str, key: &Value) -> Result<bool, DatabaseError>;

    /// Fetch a record by key. Returns None if not found.
    fn get_row(&self, table: &str, primary: &str, key: &Value) -> Result<Option<Fields>, DatabaseError>;
}

/// Shared database handle. Every row in a collection holds a clone of the
/// same `Arc`.
pub type DatabaseHandle = Arc<dyn Database>;

/// Error type for database operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    /// Storage-level error.
    Storage(String),
    /// A record with this key already exists.
    DuplicateKey { table: String, key: String },
    /// No record with this key exists.
    NotFound { table: String, key: String },
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::Storage(msg) => write!(f, "database storage error: {}", msg),
            DatabaseError::DuplicateKey { table, key } => {
                write!(f, "duplicate key {} in table {}", key, table)
            }
            DatabaseError::NotFound { table, key } => {
                write!(f, "record not found: {}:{}", table, key)
            }
        }
    }
}

impl std::error::Error for DatabaseError {}

/// Render a key value the way it appears in storage keys and error messages.
pub(crate) fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub use in_memory::InMemoryDatabase;
