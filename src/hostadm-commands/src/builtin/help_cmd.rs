//! Built-in `help` command.

use std::io::{self, Write};
use std::sync::Weak;

use async_trait::async_trait;

use super::{BuiltinCommand, builtin_help};
use crate::command::{
    AppInfo, CommandContext, CommandDescriptor, CommandFlags, ExitOutcome, NativeCommand,
};
use crate::help::{self, HelpAssembler};
use crate::host::ScriptHost;
use crate::registry::CommandRegistry;
use crate::resolver;

/// The `help` built-in command.
///
/// Holds a weak handle on the registry that owns it.
#[derive(Debug, Clone)]
pub struct HelpCommand {
    registry: Weak<CommandRegistry>,
}

impl BuiltinCommand for HelpCommand {
    const NAME: &'static str = "help";
    const DESCRIPTION: &'static str = "Shows help for a specified command";
    const USAGE: &'static str = "Shows help for a specified command\n\
        Usage: hostadm help <command>";
}

impl HelpCommand {
    pub(crate) fn descriptor(registry: Weak<CommandRegistry>) -> CommandDescriptor {
        CommandDescriptor::native(Self::NAME, Self { registry })
            .with_flags(CommandFlags::NO_HELP)
    }

    /// Print the listing (no target, or `help` itself) or the full help of
    /// `target`.
    ///
    /// `help` and `help help` produce the same output.
    pub async fn render(
        registry: &CommandRegistry,
        host: &dyn ScriptHost,
        app: &AppInfo,
        target: Option<&str>,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> anyhow::Result<ExitOutcome> {
        help::write_banner(app, out)?;
        let assembler = HelpAssembler::new(registry, host);

        let name = match target {
            Some(name) if name != Self::NAME => name,
            _ => {
                assembler.listing(out).await?;
                return Ok(ExitOutcome::Success);
            }
        };

        match registry.resolve(name) {
            Ok(cmd) => {
                writeln!(out, "Showing help for {name} command")?;
                writeln!(out)?;
                assembler.detail(cmd, out).await?;
                Ok(ExitOutcome::Success)
            }
            Err(not_found) => {
                out.flush()?;
                resolver::report_not_found(&not_found, registry, err)?;
                Ok(ExitOutcome::Failure)
            }
        }
    }
}

#[async_trait(?Send)]
impl NativeCommand for HelpCommand {
    fn help(&self, full: bool) -> &str {
        builtin_help::<Self>(full)
    }

    async fn run(&self, args: &[String], ctx: &CommandContext<'_>) -> anyhow::Result<ExitOutcome> {
        let Some(registry) = self.registry.upgrade() else {
            anyhow::bail!("command registry is no longer available");
        };

        let target = args.get(1).map(String::as_str);
        Self::render(
            &registry,
            ctx.host,
            ctx.app,
            target,
            &mut io::stdout(),
            &mut io::stderr(),
        )
        .await
    }
}
