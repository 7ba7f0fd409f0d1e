//! Built-in `configtest` command.
//!
//! Loads a configuration file the same way startup does and reports whether
//! it is usable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clap::Parser;
use hostadm_common::{ConfigError, HostConfig, Variables};

use super::{BuiltinCommand, builtin_help, parse_args};
use crate::command::{CommandContext, ExitOutcome, NativeCommand};

#[derive(Debug, Parser)]
#[command(disable_version_flag = true)]
struct ConfigTestArgs {
    /// Configuration file to test
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Quiet output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

/// The `configtest` built-in command.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigTestCommand;

impl BuiltinCommand for ConfigTestCommand {
    const NAME: &'static str = "configtest";
    const DESCRIPTION: &'static str = "Perform configuration file test";
    const USAGE: &'static str = "Perform configuration file test\n\
        Usage: hostadm configtest [-c <config_name>] [-q]\n\
        Where options are:\n\n\
        -c: config file to test\n\
        -q: quiet output";
}

impl ConfigTestCommand {
    /// Load `path` with `vars`. A missing file counts as a failure here even
    /// though startup tolerates it.
    pub fn check(&self, path: &Path, vars: &Variables) -> Result<HostConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }
        HostConfig::load_from(path, vars.clone())
    }
}

#[async_trait(?Send)]
impl NativeCommand for ConfigTestCommand {
    fn help(&self, full: bool) -> &str {
        builtin_help::<Self>(full)
    }

    async fn run(&self, args: &[String], ctx: &CommandContext<'_>) -> anyhow::Result<ExitOutcome> {
        let args: ConfigTestArgs = match parse_args(args) {
            Ok(args) => args,
            Err(outcome) => return Ok(outcome),
        };

        let vars = ctx.config.vars();
        let path = args
            .config
            .unwrap_or_else(|| HostConfig::config_path(vars));

        match self.check(&path, vars) {
            Ok(_) => {
                if !args.quiet {
                    println!("syntax OK");
                }
                Ok(ExitOutcome::Success)
            }
            Err(e) => {
                eprintln!("{e}");
                if !args.quiet {
                    println!("syntax error");
                }
                Ok(ExitOutcome::Failure)
            }
        }
    }
}
