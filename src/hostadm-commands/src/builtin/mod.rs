//! Built-in native commands.
//!
//! # Available Commands
//!
//! - `help [command]` - command listing or full help of one command
//! - `configtest [-c FILE] [-q]` - validate a configuration file
//! - `configdump [-j] [SECTION...]` - print the loaded configuration
//! - `exec <module> [args...]` - run a plain script module
//!
//! `help` is not part of [`native_commands`]: the registry adds it itself
//! so it can hold a handle on the registry.

mod configdump_cmd;
mod configtest_cmd;
mod exec_cmd;
mod help_cmd;

pub use configdump_cmd::{ConfigDumpCommand, ConfigDumpError, OutputFormat};
pub use configtest_cmd::ConfigTestCommand;
pub use exec_cmd::ExecCommand;
pub use help_cmd::HelpCommand;

use clap::Parser;

use crate::command::{CommandDescriptor, ExitOutcome};

/// Static description shared by the built-in commands.
pub trait BuiltinCommand {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    const USAGE: &'static str;
}

/// Short help is the description; full help appends the usage block.
fn builtin_help<C: BuiltinCommand>(full: bool) -> &'static str {
    if full { C::USAGE } else { C::DESCRIPTION }
}

/// Native commands other than `help`.
pub fn native_commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::native(ConfigTestCommand::NAME, ConfigTestCommand),
        CommandDescriptor::native(ConfigDumpCommand::NAME, ConfigDumpCommand),
        CommandDescriptor::native(ExecCommand::NAME, ExecCommand),
    ]
}

/// Parse a command's own argv with clap.
///
/// `--help` output is printed and reported as success; parse errors are
/// printed and reported as failure.
fn parse_args<T: Parser>(args: &[String]) -> Result<T, ExitOutcome> {
    T::try_parse_from(args).map_err(|e| {
        let outcome = ExitOutcome::from(!e.use_stderr());
        if let Err(print_err) = e.print() {
            tracing::warn!("Cannot print usage: {print_err}");
        }
        outcome
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_commands_names() {
        let names: Vec<String> = native_commands()
            .iter()
            .map(|cmd| cmd.name().to_string())
            .collect();
        assert_eq!(names, vec!["configtest", "configdump", "exec"]);
    }

    #[test]
    fn test_builtin_help_texts() {
        assert_eq!(
            builtin_help::<ConfigTestCommand>(false),
            ConfigTestCommand::DESCRIPTION
        );
        assert!(builtin_help::<ConfigTestCommand>(true).starts_with(ConfigTestCommand::DESCRIPTION));
        assert!(builtin_help::<ExecCommand>(true).contains("Usage: hostadm exec"));
    }
}
