//! Boundary between the command system and the script runtime.

use async_trait::async_trait;

use crate::command::ScriptEntry;

/// Runs script-sourced commands on behalf of the registry.
#[async_trait(?Send)]
pub trait ScriptHost {
    /// Invoke the script's help entry point. The script prints its own
    /// output; nothing is returned to the caller.
    async fn help(&self, name: &str, entry: &ScriptEntry, full: bool) -> anyhow::Result<()>;

    /// Run the script's handler with the sub-argv (`args[0]` is not forwarded).
    async fn run(&self, entry: &ScriptEntry, args: &[String]) -> anyhow::Result<()>;
}

/// Host used when no script runtime is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScriptHost;

#[async_trait(?Send)]
impl ScriptHost for NoScriptHost {
    async fn help(&self, name: &str, _entry: &ScriptEntry, _full: bool) -> anyhow::Result<()> {
        anyhow::bail!("no script runtime available to describe '{name}'")
    }

    async fn run(&self, entry: &ScriptEntry, _args: &[String]) -> anyhow::Result<()> {
        anyhow::bail!(
            "no script runtime available to run '{}'",
            entry.module_path
        )
    }
}
