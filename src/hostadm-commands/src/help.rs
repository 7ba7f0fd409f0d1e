//! Help assembly over native and script commands.

use std::io::{self, Write};

use crate::command::{AppInfo, CommandDescriptor, CommandKind};
use crate::host::ScriptHost;
use crate::registry::CommandRegistry;

/// Width of the name column in listings.
pub const NAME_WIDTH: usize = 18;
/// Width of the short-help column in listings.
pub const HELP_WIDTH: usize = 60;

/// One listing line: two spaces, the padded name, a space, the padded help.
pub fn format_listing_line(name: &str, help: &str) -> String {
    format!(
        "  {name:<name_width$} {help:<help_width$}",
        name_width = NAME_WIDTH,
        help_width = HELP_WIDTH
    )
}

/// Program banner printed above listings and full help.
pub fn write_banner(app: &AppInfo, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{} {}", app.display_name, app.version)?;
    writeln!(
        out,
        "Usage: {} [global_options] command [command_options]",
        app.name
    )?;
    writeln!(out)
}

/// Builds the short listing and the long single-command help.
///
/// Native commands hand back text that is written to `out`. Script commands
/// print through the [`ScriptHost`] themselves, so `out` is flushed first to
/// keep the ordering.
pub struct HelpAssembler<'a> {
    registry: &'a CommandRegistry,
    host: &'a dyn ScriptHost,
}

impl<'a> HelpAssembler<'a> {
    pub fn new(registry: &'a CommandRegistry, host: &'a dyn ScriptHost) -> Self {
        Self { registry, host }
    }

    /// `Available commands:` followed by one line per visible command.
    ///
    /// A script command whose help fails is logged and skipped so one broken
    /// module does not hide the rest of the listing.
    pub async fn listing(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Available commands:")?;

        for cmd in self.registry.iter().filter(|cmd| cmd.is_visible()) {
            match cmd.kind() {
                CommandKind::Native(native) => {
                    writeln!(out, "{}", format_listing_line(cmd.name(), native.help(false)))?;
                }
                CommandKind::Script(entry) => {
                    out.flush()?;
                    if let Err(e) = self.host.help(cmd.name(), entry, false).await {
                        tracing::warn!("Cannot show help for {}: {e:#}", cmd.name());
                    }
                }
            }
        }

        out.flush()
    }

    /// Full help of a single command.
    pub async fn detail(&self, cmd: &CommandDescriptor, out: &mut dyn Write) -> anyhow::Result<()> {
        match cmd.kind() {
            CommandKind::Native(native) => {
                writeln!(out, "{}", native.help(true))?;
                out.flush()?;
            }
            CommandKind::Script(entry) => {
                out.flush()?;
                self.host.help(cmd.name(), entry, true).await?;
            }
        }
        Ok(())
    }
}
