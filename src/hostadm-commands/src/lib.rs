//! Command system for hostadm.
//!
//! Commands come from two sources:
//!
//! - **native** commands compiled into the binary (see [`builtin`])
//! - **script** commands discovered in the embedded Lua runtime and invoked
//!   through a [`ScriptHost`]
//!
//! Both are described by a [`CommandDescriptor`] and collected into a
//! [`CommandRegistry`], which is sorted by name and never mutated afterwards.
//!
//! ```rust,ignore
//! use hostadm_commands::{CommandRegistry, builtin, resolver};
//!
//! let registry = CommandRegistry::build(builtin::native_commands(), discovered)?;
//! match resolver::resolve("configdump", &registry) {
//!     Ok(cmd) => cmd.run(&args, &ctx).await?,
//!     Err(not_found) => {
//!         for name in resolver::suggest(&not_found.name, &registry) {
//!             eprintln!("{name}");
//!         }
//!     }
//! }
//! ```

pub mod builtin;
mod command;
pub mod help;
mod host;
mod registry;
pub mod resolver;

pub use command::{
    AppInfo, CommandContext, CommandDescriptor, CommandFlags, CommandKind, ExitOutcome,
    NativeCommand, ScriptEntry,
};
pub use help::HelpAssembler;
pub use host::{NoScriptHost, ScriptHost};
pub use registry::{CommandRegistry, RegistryError};
pub use resolver::CommandNotFound;
