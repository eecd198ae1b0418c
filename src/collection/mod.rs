//! RowCollection - An ordered set of rows sharing database and table defaults.
//!
//! The collection owns no persistence logic of its own. Setters store a
//! default and push it into every row that accepts it; persistence calls are
//! forwarded to every row that supports them, in insertion order.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use serde_json::json;
//! use sql_collection::{DatabaseHandle, InMemoryDatabase, RowCollection};
//!
//! let database: DatabaseHandle = Arc::new(InMemoryDatabase::new());
//!
//! let mut users = RowCollection::new();
//! users
//!     .set_database(database)
//!     .set_table("users")?
//!     .add(json!({ "name": "ada" }))?
//!     .add(json!({ "name": "grace" }))?
//!     .insert(None, None)?;
//! ```

mod defaults;
mod input;

use std::any::Any;
use std::fmt;
use std::ops::Index;

use serde_json::Value;
use tracing::{debug, trace};

use crate::database::DatabaseHandle;
use crate::error::CollectionError;
use crate::model::{Fields, ModelRegistry, Persistable, RecordModel, Row, RowError, DATETIME};

pub use defaults::CollectionDefaults;
pub use input::{Position, RowInput};

use input::value_kind;

/// An ordered collection of rows with shared defaults.
///
/// Rows keep their insertion order and duplicates are allowed. A database or
/// table set on the collection is applied to every current row and, from
/// then on, to every added row.
pub struct RowCollection {
    rows: Vec<Box<dyn Row>>,
    registry: ModelRegistry,
    model: String,
    database: Option<DatabaseHandle>,
    table: Option<String>,
}

impl Default for RowCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl RowCollection {
    /// An empty collection building [`RecordModel`] rows.
    pub fn new() -> Self {
        Self::with_registry(ModelRegistry::default())
    }

    /// An empty collection using `registry` for [`set_model`](Self::set_model).
    ///
    /// [`RecordModel`] is registered if the registry does not know it, since
    /// it is the starting model.
    pub fn with_registry(mut registry: ModelRegistry) -> Self {
        if !registry.contains(RecordModel::NAME) {
            registry.register::<RecordModel>(RecordModel::NAME);
        }
        Self {
            rows: Vec::new(),
            registry,
            model: RecordModel::NAME.to_string(),
            database: None,
            table: None,
        }
    }

    /// A collection holding `rows` as given.
    pub fn from_rows(rows: impl IntoIterator<Item = Box<dyn Row>>) -> Self {
        let mut collection = Self::new();
        collection.rows.extend(rows);
        collection
    }

    /// An empty collection with `defaults` applied through the setters.
    pub fn from_defaults(
        registry: ModelRegistry,
        defaults: &CollectionDefaults,
    ) -> Result<Self, CollectionError> {
        let mut collection = Self::with_registry(registry);
        if let Some(model) = &defaults.model {
            collection.set_model(model)?;
        }
        if let Some(table) = &defaults.table {
            collection.set_table(table)?;
        }
        Ok(collection)
    }

    /// Sets the default database and applies it to every row.
    pub fn set_database(&mut self, database: DatabaseHandle) -> &mut Self {
        debug!(rows = self.rows.len(), "setting collection database");
        for row in self.rows.iter_mut() {
            if let Some(row) = row.as_configurable() {
                row.set_database(database.clone());
            }
        }
        self.database = Some(database);
        self
    }

    /// Sets the default table and applies it to every row.
    pub fn set_table(&mut self, table: &str) -> Result<&mut Self, CollectionError> {
        if table.is_empty() {
            return Err(CollectionError::Argument {
                index: 1,
                expected: "table name",
                found: "empty string".to_string(),
            });
        }

        debug!(rows = self.rows.len(), table, "setting collection table");
        for row in self.rows.iter_mut() {
            if let Some(row) = row.as_configurable() {
                row.set_table(table);
            }
        }
        self.table = Some(table.to_string());
        Ok(self)
    }

    /// Sets the model used to build rows from field data.
    ///
    /// Rows already in the collection keep their type.
    pub fn set_model(&mut self, model: &str) -> Result<&mut Self, CollectionError> {
        if model.is_empty() {
            return Err(CollectionError::Argument {
                index: 1,
                expected: "model name",
                found: "empty string".to_string(),
            });
        }
        if !self.registry.contains(model) {
            return Err(CollectionError::Configuration {
                model: model.to_string(),
            });
        }

        self.model = model.to_string();
        Ok(self)
    }

    /// Rewrites `column` with `format` (strftime syntax) on every row that
    /// supports it.
    pub fn format_time(&mut self, column: &str, format: &str) -> Result<&mut Self, CollectionError> {
        debug!(rows = self.rows.len(), column, format, "formatting collection time column");
        for row in self.rows.iter_mut() {
            if let Some(row) = row.as_time_formattable() {
                row.format_time(column, format)?;
            }
        }
        Ok(self)
    }

    /// [`format_time`](Self::format_time) with [`DATETIME`].
    pub fn format_time_default(&mut self, column: &str) -> Result<&mut Self, CollectionError> {
        self.format_time(column, DATETIME)
    }

    /// Appends a row.
    ///
    /// Field data is built into a row by the current model. The collection's
    /// database and table, when set, are then applied to the row even if it
    /// arrived already configured with its own.
    pub fn add(&mut self, item: impl Into<RowInput>) -> Result<&mut Self, CollectionError> {
        let mut row = match item.into() {
            RowInput::Fields(fields) | RowInput::Value(Value::Object(fields)) => self.build(fields)?,
            RowInput::Row(row) => row,
            RowInput::Value(other) => {
                return Err(CollectionError::Argument {
                    index: 1,
                    expected: "field mapping or row",
                    found: value_kind(&other),
                })
            }
        };

        if let Some(configurable) = row.as_configurable() {
            if let Some(database) = &self.database {
                configurable.set_database(database.clone());
            }
            if let Some(table) = &self.table {
                configurable.set_table(table);
            }
        }

        trace!(index = self.rows.len(), model = %self.model, "adding row");
        self.rows.push(row);
        Ok(self)
    }

    /// Appends an already constructed row.
    pub fn add_row(&mut self, row: impl Row) -> Result<&mut Self, CollectionError> {
        self.add(RowInput::Row(Box::new(row)))
    }

    /// Inserts every row. `table` and `database` override the rows' own.
    pub fn insert(
        &mut self,
        table: Option<&str>,
        database: Option<&DatabaseHandle>,
    ) -> Result<&mut Self, CollectionError> {
        self.persist("insert", table, database, |row| row.insert(table, database))
    }

    /// Updates every row.
    pub fn update(
        &mut self,
        table: Option<&str>,
        database: Option<&DatabaseHandle>,
    ) -> Result<&mut Self, CollectionError> {
        self.persist("update", table, database, |row| row.update(table, database))
    }

    /// Inserts or updates every row; each row decides which.
    pub fn save(
        &mut self,
        table: Option<&str>,
        database: Option<&DatabaseHandle>,
    ) -> Result<&mut Self, CollectionError> {
        self.persist("save", table, database, |row| row.save(table, database))
    }

    /// Removes every row from the database. The collection keeps them.
    pub fn remove(
        &mut self,
        table: Option<&str>,
        database: Option<&DatabaseHandle>,
    ) -> Result<&mut Self, CollectionError> {
        self.persist("remove", table, database, |row| row.remove(table, database))
    }

    /// Stops at the first failing row; rows after it are not visited.
    fn persist<F>(
        &mut self,
        operation: &'static str,
        table: Option<&str>,
        database: Option<&DatabaseHandle>,
        mut call: F,
    ) -> Result<&mut Self, CollectionError>
    where
        F: FnMut(&mut dyn Persistable) -> Result<(), RowError>,
    {
        debug!(
            operation,
            rows = self.rows.len(),
            table = ?table,
            database_override = database.is_some(),
            "persisting collection"
        );
        for row in self.rows.iter_mut() {
            if let Some(row) = row.as_persistable() {
                call(row)?;
            }
        }
        Ok(self)
    }

    fn build(&self, fields: Fields) -> Result<Box<dyn Row>, CollectionError> {
        self.registry
            .build(&self.model, fields)
            .ok_or_else(|| CollectionError::Configuration {
                model: self.model.clone(),
            })
    }

    /// Removes and returns the row at `position`.
    pub fn cut(&mut self, position: Position) -> Option<Box<dyn Row>> {
        let index = position.resolve(self.rows.len())?;
        Some(self.rows.remove(index))
    }

    /// Calls `f` with every row and its index, in order.
    pub fn each<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(usize, &mut dyn Row),
    {
        for (index, row) in self.rows.iter_mut().enumerate() {
            f(index, &mut **row);
        }
        self
    }

    /// Sets a field on every row that carries field data.
    pub fn set_field(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        for row in self.rows.iter_mut() {
            if let Some(fields) = row.fields_mut() {
                fields.insert(column.to_string(), value.clone());
            }
        }
        self
    }

    /// Field data of every row that carries any, in order.
    pub fn to_fields(&self) -> Vec<Fields> {
        self.rows
            .iter()
            .filter_map(|row| row.fields().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Row> {
        self.rows.get(index).map(|row| &**row)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut dyn Row> {
        self.rows.get_mut(index).map(|row| &mut **row as &mut dyn Row)
    }

    /// The row at `index`, if it is an `R`.
    pub fn get_as<R: Row>(&self, index: usize) -> Option<&R> {
        self.get(index)
            .and_then(|row| <dyn Any>::downcast_ref::<R>(row.as_any()))
    }

    /// The row at `index` as an `R`, mutably.
    pub fn get_as_mut<R: Row>(&mut self, index: usize) -> Option<&mut R> {
        self.rows
            .get_mut(index)
            .and_then(|row| <dyn Any>::downcast_mut::<R>(row.as_any_mut()))
    }

    pub fn first(&self) -> Option<&dyn Row> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&dyn Row> {
        self.rows.last().map(|row| &**row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Box<dyn Row>> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Box<dyn Row>> {
        self.rows.iter_mut()
    }

    pub fn database(&self) -> Option<&DatabaseHandle> {
        self.database.as_ref()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Name of the model used to build rows from field data.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Current table and model as loadable defaults.
    pub fn defaults(&self) -> CollectionDefaults {
        CollectionDefaults {
            table: self.table.clone(),
            model: Some(self.model.clone()),
        }
    }
}

impl Index<usize> for RowCollection {
    type Output = dyn Row;

    fn index(&self, index: usize) -> &Self::Output {
        &*self.rows[index]
    }
}

impl<'a> IntoIterator for &'a RowCollection {
    type Item = &'a Box<dyn Row>;
    type IntoIter = std::slice::Iter<'a, Box<dyn Row>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Debug for RowCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowCollection")
            .field("rows", &self.rows.len())
            .field("model", &self.model)
            .field("table", &self.table)
            .field("database", &self.database.is_some())
            .finish()
    }
}
