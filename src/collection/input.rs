use serde_json::Value;

use crate::model::{Fields, RecordModel, Row};

/// What can be passed to [`RowCollection::add`](super::RowCollection::add).
pub enum RowInput {
    /// Field data, built into a row by the collection's current model.
    Fields(Fields),
    /// An already constructed row, added as is.
    Row(Box<dyn Row>),
    /// Untyped input. Only JSON objects are accepted; they are treated as
    /// field data.
    Value(Value),
}

impl Default for RowInput {
    fn default() -> Self {
        RowInput::Fields(Fields::new())
    }
}

impl From<Fields> for RowInput {
    fn from(fields: Fields) -> Self {
        RowInput::Fields(fields)
    }
}

impl From<Value> for RowInput {
    fn from(value: Value) -> Self {
        RowInput::Value(value)
    }
}

impl From<Box<dyn Row>> for RowInput {
    fn from(row: Box<dyn Row>) -> Self {
        RowInput::Row(row)
    }
}

impl From<RecordModel> for RowInput {
    fn from(row: RecordModel) -> Self {
        RowInput::Row(Box::new(row))
    }
}

/// Where [`RowCollection::cut`](super::RowCollection::cut) removes a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Last,
    At(usize),
}

impl Position {
    pub(crate) fn resolve(self, len: usize) -> Option<usize> {
        match self {
            Position::First if len > 0 => Some(0),
            Position::Last => len.checked_sub(1),
            Position::At(index) if index < len => Some(index),
            _ => None,
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> String {
    let kind = match value {
        Value::Null => return "null".to_string(),
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("{} {}", kind, value)
}
