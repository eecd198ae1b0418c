use serde::{Deserialize, Serialize};

/// Collection defaults that can be loaded from configuration.
///
/// ```ignore
/// let defaults: CollectionDefaults =
///     serde_json::from_str(r#"{ "table": "users", "model": "record" }"#)?;
/// let users = RowCollection::from_defaults(ModelRegistry::default(), &defaults)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionDefaults {
    /// Table applied to every row.
    pub table: Option<String>,
    /// Registered model name used to build rows from field data.
    pub model: Option<String>,
}
