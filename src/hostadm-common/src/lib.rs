//! Common utilities shared across hostadm crates.
//!
//! - `vars` - the `--var KEY=VALUE` mapping
//! - `value` - the structured configuration document handed to commands
//! - `config` - host configuration loading
//! - `config_substitution` - `${NAME}` expansion inside configuration strings
//! - `fuzzy_match` - "did you mean" matching for command names

pub mod config;
pub mod config_substitution;
pub mod fuzzy_match;
pub mod value;
pub mod vars;

pub use config::{
    ConfigError, ConfigId, DEFAULT_CONFDIR, DEFAULT_CONFIG_NAME, DEFAULT_SCRIPT_DIR, HostConfig,
};
pub use config_substitution::{SubstitutionError, substitute_str, substitute_toml_value};
pub use fuzzy_match::{levenshtein_distance, matches};
pub use value::ConfigValue;
pub use vars::{VariableError, Variables};
