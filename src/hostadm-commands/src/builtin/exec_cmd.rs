//! Built-in `exec` command: run a script module that is not a registered
//! subcommand.

use async_trait::async_trait;
use clap::Parser;

use super::{BuiltinCommand, builtin_help, parse_args};
use crate::command::{CommandContext, ExitOutcome, NativeCommand, ScriptEntry};

#[derive(Debug, Parser)]
#[command(disable_version_flag = true)]
struct ExecArgs {
    /// Module to require, e.g. `tools.cleanup`
    #[arg(value_name = "MODULE")]
    module: String,

    /// Arguments passed to the module's handler
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

/// The `exec` built-in command.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecCommand;

impl BuiltinCommand for ExecCommand {
    const NAME: &'static str = "exec";
    const DESCRIPTION: &'static str = "Execute a script module";
    const USAGE: &'static str = "Execute a script module\n\
        Usage: hostadm exec <module> [<args> ...]\n\
        The module is required by its own name and must return a handler\n\
        function or a table with a `handler` field.";
}

impl ExecCommand {
    /// Sub-argv handed to the script: display name first, then the handler
    /// arguments.
    fn forwarded_args(program: &str, parsed: ExecArgs) -> (ScriptEntry, Vec<String>) {
        let mut forwarded = Vec::with_capacity(parsed.args.len() + 1);
        forwarded.push(format!("{program} {}", parsed.module));
        forwarded.extend(parsed.args);
        (ScriptEntry::plain(parsed.module), forwarded)
    }
}

#[async_trait(?Send)]
impl NativeCommand for ExecCommand {
    fn help(&self, full: bool) -> &str {
        builtin_help::<Self>(full)
    }

    async fn run(&self, args: &[String], ctx: &CommandContext<'_>) -> anyhow::Result<ExitOutcome> {
        let parsed: ExecArgs = match parse_args(args) {
            Ok(parsed) => parsed,
            Err(outcome) => return Ok(outcome),
        };

        let program = args.first().map(String::as_str).unwrap_or(Self::NAME);
        let (entry, forwarded) = Self::forwarded_args(program, parsed);

        tracing::debug!("Executing script module {}", entry.module_path);
        ctx.host.run(&entry, &forwarded).await?;
        Ok(ExitOutcome::Success)
    }
}
