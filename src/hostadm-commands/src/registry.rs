//! Command registry.

use std::sync::Arc;

use thiserror::Error;

use crate::builtin::{BuiltinCommand, HelpCommand};
use crate::command::CommandDescriptor;
use crate::resolver::{self, CommandNotFound, Suggestions};

/// Errors raised while building the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two commands share a name.
    #[error("Duplicate command name: {0}")]
    DuplicateCommand(String),

    /// A command has an empty name.
    #[error("Command names must not be empty")]
    EmptyName,
}

/// Sorted, immutable collection of commands.
///
/// Built once at startup: native commands (the built-in `help` included)
/// first, then script-discovered commands, then sorted byte-wise by name.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
}

impl CommandRegistry {
    /// Merge native and script-discovered commands into a registry.
    ///
    /// The built-in `help` command is added with the native commands and keeps
    /// a weak handle on the registry it belongs to.
    pub fn build(
        native: Vec<CommandDescriptor>,
        script_discovered: Vec<CommandDescriptor>,
    ) -> Result<Arc<Self>, RegistryError> {
        let mut names: Vec<&str> = native
            .iter()
            .map(CommandDescriptor::name)
            .chain(std::iter::once(HelpCommand::NAME))
            .chain(script_discovered.iter().map(CommandDescriptor::name))
            .collect();

        if names.iter().any(|name| name.is_empty()) {
            return Err(RegistryError::EmptyName);
        }

        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(RegistryError::DuplicateCommand(pair[0].to_string()));
        }

        Ok(Arc::new_cyclic(|registry| {
            let mut commands = native;
            commands.push(HelpCommand::descriptor(registry.clone()));
            commands.extend(script_discovered);
            commands.sort_by(|a, b| a.name().cmp(b.name()));

            tracing::debug!("Registered {} commands", commands.len());
            Self { commands }
        }))
    }

    /// All commands in sorted order.
    pub fn all(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    /// Exact lookup by primary name.
    pub fn resolve(&self, name: &str) -> Result<&CommandDescriptor, CommandNotFound> {
        resolver::resolve(name, self)
    }

    /// Names close to `name`, in registry order.
    pub fn suggest<'a>(&'a self, name: &'a str) -> Suggestions<'a> {
        resolver::suggest(name, self)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandRegistry {
    type Item = &'a CommandDescriptor;
    type IntoIter = std::slice::Iter<'a, CommandDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
