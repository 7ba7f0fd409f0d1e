//! Structured configuration document.
//!
//! A hierarchical value made of mappings, sequences and scalars. Mapping keys
//! keep the order they were written in.

use indexmap::IndexMap;
use serde::Serialize;

/// A node of the configuration document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(IndexMap<String, ConfigValue>),
}

impl Default for ConfigValue {
    fn default() -> Self {
        Self::empty_mapping()
    }
}

impl ConfigValue {
    pub fn empty_mapping() -> Self {
        Self::Mapping(IndexMap::new())
    }

    /// Look up a key of a mapping node.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        match self {
            Self::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Follow a dotted path through nested mappings (`"scripts.paths"`).
    pub fn lookup(&self, path: &str) -> Option<&ConfigValue> {
        path.split('.').try_fold(self, |node, key| node.get(key))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }
}

impl From<toml::Value> for ConfigValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::String(s),
            toml::Value::Integer(i) => Self::Integer(i),
            toml::Value::Float(f) => Self::Float(f),
            toml::Value::Boolean(b) => Self::Boolean(b),
            toml::Value::Datetime(dt) => Self::String(dt.to_string()),
            toml::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            toml::Value::Table(table) => Self::Mapping(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
