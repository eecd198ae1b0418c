//! RecordModel - The default key/value model.

use std::any::Any;
use std::fmt;

use serde_json::Value;

use super::{
    format_time_value, Configurable, Fields, Model, Persistable, Row, RowError, TimeFormattable,
};
use crate::database::DatabaseHandle;

/// A record held as plain field data, persisted through whatever database
/// and table it was configured with.
///
/// The primary-key column defaults to `"id"`. After an insert the key
/// assigned by the database is written back into that column.
#[derive(Clone)]
pub struct RecordModel {
    fields: Fields,
    primary: String,
    table: Option<String>,
    database: Option<DatabaseHandle>,
}

impl RecordModel {
    /// Registry key of the default model.
    pub const NAME: &'static str = "record";

    /// Default primary-key column.
    pub const PRIMARY_KEY: &'static str = "id";

    pub fn new() -> Self {
        Self::from_fields(Fields::new())
    }

    /// Use a different primary-key column.
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary = column.into();
        self
    }

    pub fn primary_key(&self) -> &str {
        &self.primary
    }

    /// The primary-key value, if set and not null.
    pub fn key(&self) -> Option<&Value> {
        self.fields.get(&self.primary).filter(|v| !v.is_null())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    fn resolve(
        &self,
        table: Option<&str>,
        database: Option<&DatabaseHandle>,
    ) -> Result<(String, DatabaseHandle), RowError> {
        let table = table
            .or(self.table.as_deref())
            .ok_or(RowError::MissingTable)?;
        let database = database
            .or(self.database.as_ref())
            .ok_or(RowError::MissingDatabase)?;
        Ok((table.to_string(), database.clone()))
    }

    fn require_key(&self) -> Result<Value, RowError> {
        self.key().cloned().ok_or_else(|| RowError::MissingPrimaryKey {
            column: self.primary.clone(),
        })
    }
}

impl Default for RecordModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordModel")
            .field("fields", &self.fields)
            .field("primary", &self.primary)
            .field("table", &self.table)
            .field("database", &self.database.is_some())
            .finish()
    }
}

impl Row for RecordModel {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }

    fn as_persistable(&mut self) -> Option<&mut dyn Persistable> {
        Some(self)
    }

    fn as_time_formattable(&mut self) -> Option<&mut dyn TimeFormattable> {
        Some(self)
    }

    fn fields(&self) -> Option<&Fields> {
        Some(&self.fields)
    }

    fn fields_mut(&mut self) -> Option<&mut Fields> {
        Some(&mut self.fields)
    }
}

impl Model for RecordModel {
    fn from_fields(fields: Fields) -> Self {
        Self {
            fields,
            primary: Self::PRIMARY_KEY.to_string(),
            table: None,
            database: None,
        }
    }
}

impl Configurable for RecordModel {
    fn set_database(&mut self, database: DatabaseHandle) {
        self.database = Some(database);
    }

    fn set_table(&mut self, table: &str) {
        self.table = Some(table.to_string());
    }

    fn database(&self) -> Option<&DatabaseHandle> {
        self.database.as_ref()
    }

    fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }
}

impl Persistable for RecordModel {
    fn insert(&mut self, table: Option<&str>, database: Option<&DatabaseHandle>) -> Result<(), RowError> {
        let (table, database) = self.resolve(table, database)?;
        let key = database.insert_row(&table, &self.primary, &self.fields)?;
        self.fields.insert(self.primary.clone(), key);
        Ok(())
    }

    fn update(&mut self, table: Option<&str>, database: Option<&DatabaseHandle>) -> Result<(), RowError> {
        let (table, database) = self.resolve(table, database)?;
        let key = self.require_key()?;
        database.update_row(&table, &self.primary, &key, &self.fields)?;
        Ok(())
    }

    fn save(&mut self, table: Option<&str>, database: Option<&DatabaseHandle>) -> Result<(), RowError> {
        let (table, database) = self.resolve(table, database)?;
        let exists = match self.key() {
            Some(key) => database.get_row(&table, &self.primary, key)?.is_some(),
            None => false,
        };

        if exists {
            self.update(Some(&table), Some(&database))
        } else {
            self.insert(Some(&table), Some(&database))
        }
    }

    fn remove(&mut self, table: Option<&str>, database: Option<&DatabaseHandle>) -> Result<(), RowError> {
        let (table, database) = self.resolve(table, database)?;
        let key = self.require_key()?;
        database.remove_row(&table, &self.primary, &key)?;
        Ok(())
    }
}

impl TimeFormattable for RecordModel {
    fn format_time(&mut self, column: &str, format: &str) -> Result<(), RowError> {
        let formatted = match self.fields.get(column) {
            None | Some(Value::Null) => return Ok(()),
            Some(value) => format_time_value(column, value, format)?,
        };
        self.fields.insert(column.to_string(), Value::String(formatted));
        Ok(())
    }
}
