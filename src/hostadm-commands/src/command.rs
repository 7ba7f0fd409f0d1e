//! Command descriptors.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use hostadm_common::HostConfig;

use crate::host::ScriptHost;

bitflags::bitflags! {
    /// Capability bits of a command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandFlags: u32 {
        /// Excluded from listings and from full-help enumeration.
        const NO_HELP = 1 << 0;
        /// Help and run go through the script runtime.
        const SCRIPT_SOURCED = 1 << 1;
    }
}

/// Outcome of running a command, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure,
}

impl ExitOutcome {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl From<bool> for ExitOutcome {
    fn from(ok: bool) -> Self {
        if ok { Self::Success } else { Self::Failure }
    }
}

/// Program identity used in banners and sub-argv rewriting.
#[derive(Debug, Clone)]
pub struct AppInfo {
    /// Executable name (`hostadm`).
    pub name: String,
    /// Name shown in banners (`Hostadm`).
    pub display_name: String,
    pub version: String,
}

impl AppInfo {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            version: version.into(),
        }
    }
}

/// Everything a command may use while it runs.
pub struct CommandContext<'a> {
    pub app: &'a AppInfo,
    pub config: &'a HostConfig,
    pub host: &'a dyn ScriptHost,
}

/// A command implemented in Rust.
#[async_trait(?Send)]
pub trait NativeCommand {
    /// Short help when `full` is false, complete help otherwise.
    fn help(&self, full: bool) -> &str;

    /// Run the command. `args[0]` is the display name (`"hostadm <command>"`).
    async fn run(&self, args: &[String], ctx: &CommandContext<'_>) -> anyhow::Result<ExitOutcome>;
}

/// Location of a script-implemented command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub module_path: String,
    /// Resolve the module under the `hostadm.` namespace.
    pub as_subcommand: bool,
}

impl ScriptEntry {
    /// A module under the command namespace.
    pub fn subcommand(module_path: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            as_subcommand: true,
        }
    }

    /// A module required by its own name.
    pub fn plain(module_path: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            as_subcommand: false,
        }
    }
}

/// How a command is implemented.
#[derive(Clone)]
pub enum CommandKind {
    Native(Arc<dyn NativeCommand>),
    Script(ScriptEntry),
}

impl fmt::Debug for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(_) => f.write_str("Native"),
            Self::Script(entry) => f.debug_tuple("Script").field(entry).finish(),
        }
    }
}

/// Description of one subcommand.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    name: String,
    aliases: Vec<String>,
    flags: CommandFlags,
    kind: CommandKind,
}

impl CommandDescriptor {
    pub fn native(name: impl Into<String>, command: impl NativeCommand + 'static) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            flags: CommandFlags::empty(),
            kind: CommandKind::Native(Arc::new(command)),
        }
    }

    pub fn script(name: impl Into<String>, entry: ScriptEntry) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            flags: CommandFlags::SCRIPT_SOURCED,
            kind: CommandKind::Script(entry),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Add capability flags. `SCRIPT_SOURCED` always follows the command kind.
    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.flags |= flags.difference(CommandFlags::SCRIPT_SOURCED);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn flags(&self) -> CommandFlags {
        self.flags
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// Whether the command shows up in listings.
    pub fn is_visible(&self) -> bool {
        !self.flags.contains(CommandFlags::NO_HELP)
    }

    pub fn is_script_sourced(&self) -> bool {
        self.flags.contains(CommandFlags::SCRIPT_SOURCED)
    }

    /// Run the command with its sub-argv.
    pub async fn run(&self, args: &[String], ctx: &CommandContext<'_>) -> anyhow::Result<ExitOutcome> {
        match &self.kind {
            CommandKind::Native(command) => command.run(args, ctx).await,
            CommandKind::Script(entry) => {
                ctx.host.run(entry, args).await?;
                Ok(ExitOutcome::Success)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait(?Send)]
    impl NativeCommand for Noop {
        fn help(&self, _full: bool) -> &str {
            "Does nothing"
        }

        async fn run(&self, _args: &[String], _ctx: &CommandContext<'_>) -> anyhow::Result<ExitOutcome> {
            Ok(ExitOutcome::Success)
        }
    }

    #[test]
    fn test_script_flag_follows_kind() {
        let native = CommandDescriptor::native("noop", Noop).with_flags(CommandFlags::all());
        assert!(!native.is_script_sourced());
        assert!(!native.is_visible());

        let script = CommandDescriptor::script("scan", ScriptEntry::subcommand("scan"));
        assert!(script.is_script_sourced());
        assert!(script.is_visible());
    }

    #[test]
    fn test_exit_outcome_codes() {
        assert_eq!(ExitOutcome::Success.code(), 0);
        assert_eq!(ExitOutcome::Failure.code(), 1);
        assert_eq!(ExitOutcome::from(false), ExitOutcome::Failure);
    }

    #[test]
    fn test_aliases() {
        let cmd = CommandDescriptor::script("signtool", ScriptEntry::subcommand("signtool"))
            .with_aliases(["sign", "signer"]);
        assert_eq!(cmd.aliases(), &["sign".to_string(), "signer".to_string()]);
    }
}
