//! Script command discovery.
//!
//! Every `<dir>/hostadm/*.lua` under the configured script directories is a
//! candidate subcommand. A module may return:
//!
//! - a function: the command is named after the file stem
//! - a table with optional `name`, `aliases`, `description`, `usage`,
//!   `hidden` and `help` fields next to its `handler`

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use hostadm_commands::{CommandDescriptor, CommandFlags, ScriptEntry};
use mlua::{Lua, Table, Value};

use crate::bridge::{ScriptBridge, load_module};
use crate::runtime::GLOBAL_TABLE;
use crate::error::lua_type_name;
use crate::{Result, ScriptError};

/// A script module found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredScript {
    /// Module name under the `hostadm.` namespace.
    pub stem: String,
    pub path: PathBuf,
}

impl ScriptBridge {
    /// Load every discovered module and describe it as a command.
    ///
    /// Modules that fail to load or do not describe a command are skipped
    /// with a warning.
    pub async fn discover_commands(&self) -> Vec<CommandDescriptor> {
        let scripts = discover_scripts(self.config().script_paths()).await;
        if scripts.is_empty() {
            return Vec::new();
        }

        let runtime = match self.pool().acquire(self.config()) {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!("Cannot create script runtime for discovery: {e}");
                return Vec::new();
            }
        };

        let mut commands = Vec::with_capacity(scripts.len());
        for script in scripts {
            match describe_module(runtime.lua(), &script.stem) {
                Ok(cmd) => {
                    tracing::debug!(
                        "Discovered script command {} ({})",
                        cmd.name(),
                        script.path.display()
                    );
                    commands.push(cmd);
                }
                Err(e) => {
                    tracing::warn!("Skipping script {}: {e}", script.path.display());
                }
            }
        }
        commands
    }
}

/// List `hostadm/*.lua` in each directory, sorted by file name per
/// directory. A stem seen in an earlier directory shadows later ones.
pub async fn discover_scripts(dirs: &[PathBuf]) -> Vec<DiscoveredScript> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for dir in dirs {
        let commands_dir = dir.join(GLOBAL_TABLE);
        if !commands_dir.is_dir() {
            tracing::debug!("Script directory does not exist: {}", commands_dir.display());
            continue;
        }

        match scripts_in(&commands_dir).await {
            Ok(scripts) => {
                for script in scripts {
                    if seen.insert(script.stem.clone()) {
                        found.push(script);
                    } else {
                        tracing::debug!("Shadowed script {}", script.path.display());
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Error reading script directory {}: {e}", commands_dir.display());
            }
        }
    }

    found
}

async fn scripts_in(dir: &Path) -> std::io::Result<Vec<DiscoveredScript>> {
    let mut scripts = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "lua") || !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        scripts.push(DiscoveredScript {
            stem: stem.to_string(),
            path: path.clone(),
        });
    }

    scripts.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(scripts)
}

/// Build the descriptor of `hostadm.<stem>`.
fn describe_module(lua: &Lua, stem: &str) -> Result<CommandDescriptor> {
    let entry = ScriptEntry::subcommand(stem);

    match load_module(lua, stem, true)? {
        Value::Function(_) => Ok(CommandDescriptor::script(stem, entry)),
        Value::Table(module) => describe_table(&module, stem, entry),
        other => Err(ScriptError::handler_type(stem, lua_type_name(&other))),
    }
}

/// The `handler` field is checked when the command runs, not here.
fn describe_table(module: &Table, stem: &str, entry: ScriptEntry) -> Result<CommandDescriptor> {
    let name = module
        .get::<Option<String>>("name")?
        .unwrap_or_else(|| stem.to_string());
    let aliases = module.get::<Option<Vec<String>>>("aliases")?.unwrap_or_default();
    let hidden = module.get::<Option<bool>>("hidden")?.unwrap_or(false);

    let flags = if hidden {
        CommandFlags::NO_HELP
    } else {
        CommandFlags::empty()
    };

    Ok(CommandDescriptor::script(name, entry)
        .with_aliases(aliases)
        .with_flags(flags))
}
