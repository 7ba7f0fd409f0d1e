//! Variable substitution for hostadm configuration files.
//!
//! Strings in the configuration may reference variables defined with `--var`:
//! - `${NAME}` - substitutes the value of `NAME`
//! - `${NAME:default}` - substitutes `NAME`, or `default` when it is not defined

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::vars::Variables;

/// Group 1: variable name, group 2: optional default after the colon.
static VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}")
        .expect("variable regex pattern is valid and tested")
});

/// Errors that can occur during configuration substitution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubstitutionError {
    /// Variable not defined and no default provided.
    #[error("Variable '{0}' is not defined and no default provided")]
    UndefinedVariable(String),
}

/// Substitute every `${...}` reference in `input`.
pub fn substitute_str(input: &str, vars: &Variables) -> Result<String, SubstitutionError> {
    let mut missing: Option<String> = None;

    let result = VAR_REGEX.replace_all(input, |cap: &regex::Captures<'_>| {
        let name = &cap[1];
        match (vars.get(name), cap.get(2)) {
            (Some(value), _) => value.to_string(),
            (None, Some(default)) => default.as_str().to_string(),
            (None, None) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(SubstitutionError::UndefinedVariable(name)),
        None => Ok(result.into_owned()),
    }
}

/// Recursively substitutes variables in a TOML value.
///
/// Only string values are rewritten; keys are left untouched.
pub fn substitute_toml_value(
    value: &mut toml::Value,
    vars: &Variables,
) -> Result<(), SubstitutionError> {
    match value {
        toml::Value::String(s) => {
            *s = substitute_str(s, vars)?;
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_toml_value(item, vars)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_toml_value(v, vars)?;
            }
        }
        // Integer, Float, Boolean, Datetime are not affected
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        let mut vars = Variables::new();
        for (k, v) in pairs {
            vars.set(*k, *v);
        }
        vars
    }

    #[test]
    fn test_substitution_basic() {
        let vars = vars(&[("CONFDIR", "/etc/hostadm")]);
        let result = substitute_str("${CONFDIR}/local.d", &vars).unwrap();
        assert_eq!(result, "/etc/hostadm/local.d");
    }

    #[test]
    fn test_substitution_with_default() {
        let result = substitute_str("${MISSING:fallback}", &Variables::new()).unwrap();
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_defined_value_ignores_default() {
        let vars = vars(&[("MODE", "strict")]);
        let result = substitute_str("${MODE:lax}", &vars).unwrap();
        assert_eq!(result, "strict");
    }

    #[test]
    fn test_empty_default() {
        let result = substitute_str("a${MISSING:}b", &Variables::new()).unwrap();
        assert_eq!(result, "ab");
    }

    #[test]
    fn test_undefined_without_default() {
        let err = substitute_str("${NOPE}", &Variables::new()).unwrap_err();
        assert_eq!(err, SubstitutionError::UndefinedVariable("NOPE".to_string()));
    }

    #[test]
    fn test_plain_dollar_untouched() {
        let result = substitute_str("cost: $5 and $HOME", &Variables::new()).unwrap();
        assert_eq!(result, "cost: $5 and $HOME");
    }

    #[test]
    fn test_nested_toml_value() {
        let vars = vars(&[("DB", "redis")]);
        let mut value: toml::Value = toml::from_str(
            r#"
backend = "${DB}"
[nested]
list = ["${DB}:6379", 7]
"#,
        )
        .unwrap();

        substitute_toml_value(&mut value, &vars).unwrap();

        assert_eq!(value["backend"].as_str(), Some("redis"));
        assert_eq!(value["nested"]["list"][0].as_str(), Some("redis:6379"));
        assert_eq!(value["nested"]["list"][1].as_integer(), Some(7));
    }
}
