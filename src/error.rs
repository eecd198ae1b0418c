use std::fmt;

use crate::model::RowError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// A caller passed a value of the wrong shape. Raised before any mutation.
    Argument {
        index: usize,
        expected: &'static str,
        found: String,
    },
    /// The model name is not registered, so it cannot build rows.
    Configuration { model: String },
    /// A row failed during a delegated call. Remaining rows were not visited.
    Row(RowError),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::Argument {
                index,
                expected,
                found,
            } => write!(
                f,
                "argument {} expected {}, {} given",
                index, expected, found
            ),
            CollectionError::Configuration { model } => {
                write!(f, "{} is not a valid model", model)
            }
            CollectionError::Row(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Row(err) => std::error::Error::source(err),
            _ => None,
        }
    }
}

impl From<RowError> for CollectionError {
    fn from(err: RowError) -> Self {
        CollectionError::Row(err)
    }
}
