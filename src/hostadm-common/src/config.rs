//! Host configuration loading.
//!
//! The host configuration is a TOML document whose location and string
//! values are controlled by the `--var` mapping:
//!
//! - `CONFDIR` - configuration directory (default `/etc/hostadm`)
//! - `CONFIG` - configuration file (default `${CONFDIR}/hostadm.toml`)
//! - `SCRIPTDIR` - script library directory (default `/usr/share/hostadm/lua`)
//!
//! A missing file is not an error: the document is then an empty mapping.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::config_substitution::{SubstitutionError, substitute_toml_value};
use crate::value::ConfigValue;
use crate::vars::Variables;

pub const DEFAULT_CONFDIR: &str = "/etc/hostadm";
pub const DEFAULT_CONFIG_NAME: &str = "hostadm.toml";
pub const DEFAULT_SCRIPT_DIR: &str = "/usr/share/hostadm/lua";

static NEXT_CONFIG_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one loaded configuration.
///
/// Two loads of the same file yield different identities; the script runtime
/// pool is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigId(u64);

impl ConfigId {
    fn next() -> Self {
        Self(NEXT_CONFIG_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Errors that can occur while loading the host configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to expand variables in {path}: {source}")]
    Substitution {
        path: PathBuf,
        #[source]
        source: SubstitutionError,
    },
}

/// A loaded host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    id: ConfigId,
    path: Option<PathBuf>,
    document: ConfigValue,
    vars: Variables,
    script_paths: Vec<PathBuf>,
}

impl HostConfig {
    /// Load the configuration file selected by `vars`.
    pub fn load(vars: Variables) -> Result<Self, ConfigError> {
        let path = Self::config_path(&vars);
        Self::load_from(&path, vars)
    }

    /// Load a specific configuration file.
    pub fn load_from(path: &Path, vars: Variables) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("Configuration file {} not found, using defaults", path.display());
            return Ok(Self::from_document(ConfigValue::empty_mapping(), vars));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut value: toml::Value =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        substitute_toml_value(&mut value, &vars).map_err(|source| {
            ConfigError::Substitution {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::debug!("Loaded configuration from {}", path.display());

        let mut config = Self::from_document(ConfigValue::from(value), vars);
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Build a configuration around an already parsed document.
    pub fn from_document(document: ConfigValue, vars: Variables) -> Self {
        let script_paths = Self::collect_script_paths(&document, &vars);
        Self {
            id: ConfigId::next(),
            path: None,
            document,
            vars,
            script_paths,
        }
    }

    /// Configuration file path chosen by `CONFIG` / `CONFDIR`.
    pub fn config_path(vars: &Variables) -> PathBuf {
        if let Some(config) = vars.get("CONFIG") {
            return PathBuf::from(config);
        }
        let confdir = vars.get("CONFDIR").unwrap_or(DEFAULT_CONFDIR);
        Path::new(confdir).join(DEFAULT_CONFIG_NAME)
    }

    fn collect_script_paths(document: &ConfigValue, vars: &Variables) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(
            vars.get("SCRIPTDIR").unwrap_or(DEFAULT_SCRIPT_DIR),
        )];

        if let Some(extra) = document.lookup("scripts.paths").and_then(ConfigValue::as_sequence) {
            for item in extra {
                match item.as_str() {
                    Some(p) => paths.push(PathBuf::from(p)),
                    None => tracing::warn!(
                        "Ignoring non-string entry in scripts.paths: {}",
                        item.type_name()
                    ),
                }
            }
        }

        paths
    }

    pub fn id(&self) -> ConfigId {
        self.id
    }

    /// File the document was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn document(&self) -> &ConfigValue {
        &self.document
    }

    pub fn vars(&self) -> &Variables {
        &self.vars
    }

    /// Script library directories, in search order.
    pub fn script_paths(&self) -> &[PathBuf] {
        &self.script_paths
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::from_document(ConfigValue::empty_mapping(), Variables::new())
    }
}
