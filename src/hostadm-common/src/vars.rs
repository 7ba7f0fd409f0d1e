//! Variables redefined on the command line with `--var KEY=VALUE`.
//!
//! The mapping is consumed by configuration loading (`${KEY}` expansion and
//! well-known paths) and exported to the script runtime.

use indexmap::IndexMap;
use thiserror::Error;

/// Errors produced while parsing variable assignments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariableError {
    /// The assignment does not have the `KEY=VALUE` shape.
    #[error("Bad variable format: {0}")]
    Malformed(String),
}

/// Ordered `KEY -> VALUE` mapping; later assignments overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    entries: IndexMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single `KEY=VALUE` assignment.
    ///
    /// The assignment must contain exactly one `=` and a non-empty key.
    pub fn parse_assignment(raw: &str) -> Result<(String, String), VariableError> {
        let mut parts = raw.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) if !key.is_empty() => {
                Ok((key.to_string(), value.to_string()))
            }
            _ => Err(VariableError::Malformed(raw.to_string())),
        }
    }

    /// Build a mapping from raw assignments, in order.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, VariableError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = Self::new();
        for raw in assignments {
            vars.define(raw.as_ref())?;
        }
        Ok(vars)
    }

    /// Parse and store one assignment.
    pub fn define(&mut self, raw: &str) -> Result<(), VariableError> {
        let (key, value) = Self::parse_assignment(raw)?;
        tracing::trace!(key = %key, value = %value, "Variable redefined");
        self.set(key, value);
        Ok(())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let vars = Variables::from_assignments(["FOO=bar", "FOO=baz"]).unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("FOO"), Some("baz"));
    }

    #[test]
    fn test_missing_equals_is_malformed() {
        let err = Variables::from_assignments(["FOO"]).unwrap_err();
        assert_eq!(err, VariableError::Malformed("FOO".to_string()));
        assert_eq!(err.to_string(), "Bad variable format: FOO");
    }

    #[test]
    fn test_more_than_one_equals_is_malformed() {
        assert!(Variables::parse_assignment("A=b=c").is_err());
    }

    #[test]
    fn test_empty_key_is_malformed() {
        assert!(Variables::parse_assignment("=value").is_err());
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let (key, value) = Variables::parse_assignment("EMPTY=").unwrap();
        assert_eq!(key, "EMPTY");
        assert_eq!(value, "");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let vars = Variables::from_assignments(["B=2", "A=1", "B=3"]).unwrap();
        let keys: Vec<_> = vars.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["B", "A"]);
    }
}
