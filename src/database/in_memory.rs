//! InMemoryDatabase - HashMap-backed record store for testing and development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::trace;

use super::{key_string, Database, DatabaseError};
use crate::model::Fields;

/// Records of a single table, keyed by the rendered primary value.
#[derive(Default)]
struct StoredTable {
    records: BTreeMap<String, Fields>,
    next_id: u64,
}

impl StoredTable {
    /// Next unused integer key. Fails once the key space is exhausted.
    fn assign_key(&mut self) -> Result<Value, DatabaseError> {
        loop {
            let next = self
                .next_id
                .checked_add(1)
                .ok_or_else(|| DatabaseError::Storage("key space exhausted".into()))?;
            self.next_id = next;
            if !self.records.contains_key(&next.to_string()) {
                return Ok(Value::from(next));
            }
        }
    }

    /// Keep auto-increment ahead of explicitly supplied integer keys,
    /// including integers given as strings.
    fn observe_key(&mut self, key: &Value) {
        let n = match key {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse::<u64>().ok(),
            _ => None,
        };
        if let Some(n) = n {
            if n > self.next_id {
                self.next_id = n;
            }
        }
    }
}

/// In-memory record store.
///
/// Tables are created on first insert. Clone-friendly via Arc; clones share
/// the same storage.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<HashMap<String, StoredTable>>>,
}

impl InMemoryDatabase {
    /// Create a new empty database.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, StoredTable>>, DatabaseError> {
        self.tables
            .read()
            .map_err(|_| DatabaseError::Storage("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, StoredTable>>, DatabaseError> {
        self.tables
            .write()
            .map_err(|_| DatabaseError::Storage("lock poisoned".into()))
    }

    /// All records of a table, ordered by rendered key.
    pub fn rows(&self, table: &str) -> Result<Vec<Fields>, DatabaseError> {
        let tables = self.read()?;
        Ok(tables
            .get(table)
            .map(|t| t.records.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Number of records in a table.
    pub fn count(&self, table: &str) -> Result<usize, DatabaseError> {
        let tables = self.read()?;
        Ok(tables.get(table).map(|t| t.records.len()).unwrap_or(0))
    }
}

impl Database for InMemoryDatabase {
    fn insert_row(&self, table: &str, primary: &str, fields: &Fields) -> Result<Value, DatabaseError> {
        let mut tables = self.write()?;
        let stored = tables.entry(table.to_string()).or_default();

        let key = match fields.get(primary) {
            Some(value) if !value.is_null() => value.clone(),
            _ => stored.assign_key()?,
        };
        let rendered = key_string(&key);

        if stored.records.contains_key(&rendered) {
            return Err(DatabaseError::DuplicateKey {
                table: table.to_string(),
                key: rendered,
            });
        }
        stored.observe_key(&key);

        let mut record = fields.clone();
        record.insert(primary.to_string(), key.clone());
        stored.records.insert(rendered, record);

        trace!(table, key = %key, "inserted record");
        Ok(key)
    }

    fn update_row(
        &self,
        table: &str,
        primary: &str,
        key: &Value,
        fields: &Fields,
    ) -> Result<(), DatabaseError> {
        let rendered = key_string(key);
        let mut tables = self.write()?;

        let record = tables
            .get_mut(table)
            .and_then(|t| t.records.get_mut(&rendered))
            .ok_or_else(|| DatabaseError::NotFound {
                table: table.to_string(),
                key: rendered.clone(),
            })?;

        *record = fields.clone();
        record.insert(primary.to_string(), key.clone());

        trace!(table, key = %rendered, "updated record");
        Ok(())
    }

    fn remove_row(&self, table: &str, _primary: &str, key: &Value) -> Result<bool, DatabaseError> {
        let rendered = key_string(key);
        let mut tables = self.write()?;

        let removed = tables
            .get_mut(table)
            .map(|t| t.records.remove(&rendered).is_some())
            .unwrap_or(false);

        trace!(table, key = %rendered, removed, "removed record");
        Ok(removed)
    }

    fn get_row(&self, table: &str, _primary: &str, key: &Value) -> Result<Option<Fields>, DatabaseError> {
        let tables = self.read()?;
        Ok(tables
            .get(table)
            .and_then(|t| t.records.get(&key_string(key)))
            .cloned())
    }
}
