//! Models - Rows that map to a single database record.
//!
//! A collection holds rows as `Box<dyn Row>`. What a row can do is declared
//! through optional capability accessors: a row that returns `None` from
//! [`Row::as_persistable`] is simply skipped by bulk persistence, and the
//! same goes for configuration and time formatting.
//!
//! ## Example
//!
//! ```ignore
//! use sql_collection::{Fields, Model, Row};
//!
//! struct Tag { fields: Fields }
//!
//! impl Row for Tag {
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//!     fn fields(&self) -> Option<&Fields> { Some(&self.fields) }
//! }
//!
//! impl Model for Tag {
//!     fn from_fields(fields: Fields) -> Self { Tag { fields } }
//! }
//! ```

mod record;
mod registry;
mod time;

use std::any::Any;
use std::fmt;

use crate::database::{DatabaseError, DatabaseHandle};

/// Raw field data a row is built from.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A single entity held by a collection.
///
/// Every capability accessor defaults to `None`; implementors override the
/// ones they support.
pub trait Row: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Receives the collection's database and table defaults.
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }

    /// Takes part in bulk insert/update/save/remove.
    fn as_persistable(&mut self) -> Option<&mut dyn Persistable> {
        None
    }

    /// Takes part in bulk time formatting.
    fn as_time_formattable(&mut self) -> Option<&mut dyn TimeFormattable> {
        None
    }

    /// Field data, for rows that carry any.
    fn fields(&self) -> Option<&Fields> {
        None
    }

    fn fields_mut(&mut self) -> Option<&mut Fields> {
        None
    }

    /// Read a single field.
    fn field(&self, column: &str) -> Option<&serde_json::Value> {
        self.fields().and_then(|fields| fields.get(column))
    }
}

/// Rows that accept a database handle and table name.
pub trait Configurable {
    fn set_database(&mut self, database: DatabaseHandle);

    fn set_table(&mut self, table: &str);

    fn database(&self) -> Option<&DatabaseHandle>;

    fn table(&self) -> Option<&str>;
}

/// Rows that persist themselves.
///
/// `table` and `database` override the row's own settings for a single call.
pub trait Persistable {
    fn insert(&mut self, table: Option<&str>, database: Option<&DatabaseHandle>) -> Result<(), RowError>;

    fn update(&mut self, table: Option<&str>, database: Option<&DatabaseHandle>) -> Result<(), RowError>;

    /// Insert or update, at the row's discretion.
    fn save(&mut self, table: Option<&str>, database: Option<&DatabaseHandle>) -> Result<(), RowError>;

    fn remove(&mut self, table: Option<&str>, database: Option<&DatabaseHandle>) -> Result<(), RowError>;
}

/// Rows that can rewrite a time column into a display format.
pub trait TimeFormattable {
    /// `format` uses strftime syntax, e.g. [`DATETIME`].
    fn format_time(&mut self, column: &str, format: &str) -> Result<(), RowError>;
}

/// Rows a collection can build from raw field data.
///
/// Only `Model` types can be registered in a [`ModelRegistry`], which is
/// what makes a registry key a valid model.
pub trait Model: Row + Sized {
    fn from_fields(fields: Fields) -> Self;
}

/// Error type for row-level operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// Neither the call nor the row supplied a table.
    MissingTable,
    /// Neither the call nor the row supplied a database.
    MissingDatabase,
    /// The operation needs the primary-key value and the row has none.
    MissingPrimaryKey { column: String },
    /// A time column holds something that is not a timestamp or date.
    InvalidTime { column: String, value: String },
    /// The strftime format string could not be parsed.
    InvalidTimeFormat(String),
    /// Storage failure reported by the database.
    Database(DatabaseError),
    /// Failure raised by a custom row implementation.
    Other(String),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::MissingTable => write!(f, "no default table set or was passed"),
            RowError::MissingDatabase => write!(f, "no default database set or was passed"),
            RowError::MissingPrimaryKey { column } => {
                write!(f, "primary key column {} has no value", column)
            }
            RowError::InvalidTime { column, value } => {
                write!(f, "column {} does not hold a valid time: {}", column, value)
            }
            RowError::InvalidTimeFormat(format) => write!(f, "invalid time format: {}", format),
            RowError::Database(err) => write!(f, "{}", err),
            RowError::Other(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for RowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RowError::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DatabaseError> for RowError {
    fn from(err: DatabaseError) -> Self {
        RowError::Database(err)
    }
}

pub use record::RecordModel;
pub use registry::ModelRegistry;
pub use time::{format_time_value, DATETIME};
