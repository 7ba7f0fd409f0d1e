//! Command lookup and "did you mean" suggestions.

use std::io::{self, Write};
use std::slice;

use hostadm_common::fuzzy_match;
use thiserror::Error;

use crate::command::CommandDescriptor;
use crate::registry::CommandRegistry;

/// No command carries the requested name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid command name: {name}")]
pub struct CommandNotFound {
    pub name: String,
}

/// Exact lookup on the primary name. Aliases are never consulted.
pub fn resolve<'a>(
    name: &str,
    registry: &'a CommandRegistry,
) -> Result<&'a CommandDescriptor, CommandNotFound> {
    registry
        .all()
        .binary_search_by(|cmd| cmd.name().cmp(name))
        .map(|index| &registry.all()[index])
        .map_err(|_| CommandNotFound {
            name: name.to_string(),
        })
}

/// Names close to `name`.
///
/// For each command in registry order the primary name is yielded when it
/// matches; otherwise every matching alias is.
pub fn suggest<'a>(name: &'a str, registry: &'a CommandRegistry) -> Suggestions<'a> {
    Suggestions {
        input: name,
        commands: registry.all().iter(),
        aliases: None,
    }
}

/// Print the unresolved name followed by `Suggested commands:` and one
/// suggestion per line.
pub fn report_not_found(
    not_found: &CommandNotFound,
    registry: &CommandRegistry,
    err: &mut dyn Write,
) -> io::Result<()> {
    writeln!(err, "{not_found}")?;
    writeln!(err, "Suggested commands:")?;
    for name in suggest(&not_found.name, registry) {
        writeln!(err, "{name}")?;
    }
    err.flush()
}

/// Lazy iterator returned by [`suggest`].
#[derive(Debug, Clone)]
pub struct Suggestions<'a> {
    input: &'a str,
    commands: slice::Iter<'a, CommandDescriptor>,
    aliases: Option<slice::Iter<'a, String>>,
}

impl<'a> Iterator for Suggestions<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(aliases) = &mut self.aliases {
                if let Some(alias) = aliases.find(|alias| fuzzy_match::matches(alias, self.input)) {
                    return Some(alias.as_str());
                }
                self.aliases = None;
            }

            let cmd = self.commands.next()?;
            if fuzzy_match::matches(cmd.name(), self.input) {
                return Some(cmd.name());
            }
            self.aliases = Some(cmd.aliases().iter());
        }
    }
}
