//! ModelRegistry - Named constructors for building rows from field data.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{Fields, Model, RecordModel, Row};

type Constructor = Arc<dyn Fn(Fields) -> Box<dyn Row> + Send + Sync>;

/// Maps model names to constructors.
///
/// Constructors can only be registered for [`Model`] types, so any name the
/// registry knows is a valid model. The default registry knows
/// [`RecordModel`] as [`RecordModel::NAME`].
#[derive(Clone)]
pub struct ModelRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl ModelRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register `M` under `name`, built with [`Model::from_fields`].
    pub fn register<M: Model>(&mut self, name: impl Into<String>) -> &mut Self {
        self.register_with(name, M::from_fields)
    }

    /// Register a custom constructor under `name`.
    ///
    /// Replaces any constructor already registered under the same name.
    pub fn register_with<M, F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        M: Model,
        F: Fn(Fields) -> M + Send + Sync + 'static,
    {
        let constructor: Constructor =
            Arc::new(move |fields: Fields| -> Box<dyn Row> { Box::new(constructor(fields)) });
        self.constructors.insert(name.into(), constructor);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Build a row with the constructor registered under `name`.
    pub fn build(&self, name: &str, fields: Fields) -> Option<Box<dyn Row>> {
        self.constructors.get(name).map(|constructor| constructor(fields))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register::<RecordModel>(RecordModel::NAME);
        registry
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
