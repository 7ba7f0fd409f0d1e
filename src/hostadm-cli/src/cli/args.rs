//! Global option parsing.
//!
//! Only the leading run of flag-like tokens is handed to clap; everything
//! from the first non-flag token on belongs to the subcommand.

use clap::{ArgAction, CommandFactory, Parser};
use hostadm_common::{VariableError, Variables};
use thiserror::Error;

use super::styles::{AFTER_HELP, get_styles};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Release id captured at build time.
pub fn release_id() -> &'static str {
    match option_env!("HOSTADM_RELEASE_ID") {
        Some(id) => id,
        None => "unknown",
    }
}

/// Summary shown above the usage.
pub fn get_summary() -> &'static str {
    const BUILD_DATE: &str = match option_env!("HOSTADM_BUILD_DATE") {
        Some(v) => v,
        None => "unknown",
    };

    static SUMMARY: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    SUMMARY.get_or_init(|| {
        format!(
            "Summary:\n  Host administration utility version {VERSION}\n  Release id: {} ({BUILD_DATE})",
            release_id()
        )
    })
}

/// Global options of `hostadm`.
#[derive(Debug, Default, Parser)]
#[command(name = "hostadm")]
#[command(about = get_summary(), long_about = None)]
#[command(
    styles = get_styles(),
    disable_help_flag = true,
    disable_version_flag = true,
    override_usage = "hostadm [global_options] command [command_options]",
    after_help = AFTER_HELP
)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// List available commands
    #[arg(short = 'l', long = "list-commands")]
    pub list_commands: bool,

    /// Redefine a configuration variable (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", action = ArgAction::Append)]
    pub vars: Vec<String>,

    /// Show help
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Show version
    #[arg(short = 'V', long = "version")]
    pub version: bool,
}

impl GlobalArgs {
    /// Rendered usage text.
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}

/// Failure of the global option stage.
#[derive(Debug, Error)]
pub enum OptionParseError {
    #[error("{0}")]
    Clap(String),

    #[error(transparent)]
    Variable(#[from] VariableError),
}

impl From<clap::Error> for OptionParseError {
    fn from(err: clap::Error) -> Self {
        let rendered = err.render().to_string();
        let message = rendered
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string();
        Self::Clap(message)
    }
}

/// A command line split into global options and the subcommand tail.
#[derive(Debug)]
pub struct Invocation {
    /// `argv[0]` as given.
    pub program: String,
    pub globals: GlobalArgs,
    pub vars: Variables,
    /// First non-flag token, if any.
    pub command: Option<String>,
    /// Tokens after the command.
    pub rest: Vec<String>,
}

impl Invocation {
    /// Parse `argv` (including `argv[0]`).
    pub fn parse(argv: &[String]) -> Result<Self, OptionParseError> {
        let program = argv.first().cloned().unwrap_or_else(|| "hostadm".to_string());
        let split = global_prefix_len(argv);

        let globals = GlobalArgs::try_parse_from(&argv[..split])?;
        let vars = Variables::from_assignments(&globals.vars)?;

        let mut tail = argv[split..].iter().cloned();
        let command = tail.next();
        let rest = tail.collect();

        Ok(Self {
            program,
            globals,
            vars,
            command,
            rest,
        })
    }
}

/// Length of `argv[0]` plus the leading flag-like tokens.
///
/// A bare `--var` also takes the token after it.
pub fn global_prefix_len(argv: &[String]) -> usize {
    let mut index = 1;
    while let Some(token) = argv.get(index) {
        if !token.starts_with('-') {
            break;
        }
        index += if token == "--var" { 2 } else { 1 };
    }
    index.min(argv.len())
}
