mod collection;
mod database;
mod error;
mod model;

pub use collection::{CollectionDefaults, Position, RowCollection, RowInput};
pub use database::{Database, DatabaseError, DatabaseHandle, InMemoryDatabase};
pub use error::CollectionError;
pub use model::{
    format_time_value, Configurable, Fields, Model, ModelRegistry, Persistable, RecordModel, Row,
    RowError, TimeFormattable, DATETIME,
};

// Re-export serde_json so callers can build field data without a direct dependency
pub use serde_json;
