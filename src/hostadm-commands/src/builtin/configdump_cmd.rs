//! Built-in `configdump` command.

use async_trait::async_trait;
use clap::Parser;
use hostadm_common::ConfigValue;
use indexmap::IndexMap;
use thiserror::Error;

use super::{BuiltinCommand, builtin_help, parse_args};
use crate::command::{CommandContext, ExitOutcome, NativeCommand};

/// Errors for the configdump command.
#[derive(Debug, Error)]
pub enum ConfigDumpError {
    #[error("Unknown configuration section: {0}")]
    UnknownSection(String),

    #[error("Cannot render configuration as TOML: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Cannot render configuration as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rendering of the dumped document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Toml,
    Json,
}

#[derive(Debug, Parser)]
#[command(disable_version_flag = true)]
struct ConfigDumpArgs {
    /// Output JSON instead of TOML
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Top-level sections to dump
    #[arg(value_name = "SECTION")]
    sections: Vec<String>,
}

/// The `configdump` built-in command.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigDumpCommand;

impl BuiltinCommand for ConfigDumpCommand {
    const NAME: &'static str = "configdump";
    const DESCRIPTION: &'static str = "Perform configuration file dump";
    const USAGE: &'static str = "Perform configuration file dump\n\
        Usage: hostadm configdump [-j] [<section> ...]\n\
        Where options are:\n\n\
        -j: output JSON\n\
        <section>: dump only the named top-level sections";
}

impl ConfigDumpCommand {
    /// Render `document`, restricted to `sections` when any are given.
    ///
    /// Sections keep the order they were requested in.
    pub fn render(
        &self,
        document: &ConfigValue,
        sections: &[String],
        format: OutputFormat,
    ) -> Result<String, ConfigDumpError> {
        let selected;
        let document = if sections.is_empty() {
            document
        } else {
            let mut map = IndexMap::with_capacity(sections.len());
            for section in sections {
                let value = document
                    .get(section)
                    .ok_or_else(|| ConfigDumpError::UnknownSection(section.clone()))?;
                map.insert(section.clone(), value.clone());
            }
            selected = ConfigValue::Mapping(map);
            &selected
        };

        let mut rendered = match format {
            OutputFormat::Toml => toml::to_string_pretty(document)?,
            OutputFormat::Json => serde_json::to_string_pretty(document)?,
        };
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        Ok(rendered)
    }
}

#[async_trait(?Send)]
impl NativeCommand for ConfigDumpCommand {
    fn help(&self, full: bool) -> &str {
        builtin_help::<Self>(full)
    }

    async fn run(&self, args: &[String], ctx: &CommandContext<'_>) -> anyhow::Result<ExitOutcome> {
        let args: ConfigDumpArgs = match parse_args(args) {
            Ok(args) => args,
            Err(outcome) => return Ok(outcome),
        };

        let format = if args.json {
            OutputFormat::Json
        } else {
            OutputFormat::Toml
        };

        match self.render(ctx.config.document(), &args.sections, format) {
            Ok(text) => {
                print!("{text}");
                Ok(ExitOutcome::Success)
            }
            Err(e) => {
                eprintln!("{e}");
                Ok(ExitOutcome::Failure)
            }
        }
    }
}
