//! # hostadm script runtime
//!
//! Embeds Lua (via `mlua`) so subcommands can be written as scripts.
//!
//! ## Script layout
//!
//! ```text
//! <SCRIPTDIR>/
//! └── hostadm/
//!     ├── scan.lua       # `hostadm scan`
//!     └── signtool.lua   # `hostadm signtool`
//! ```
//!
//! A command module returns either its handler function or a table:
//!
//! ```lua
//! return {
//!   description = "Scan a message",
//!   usage = "Scan a message\nUsage: hostadm scan <file>",
//!   handler = function(args, config)
//!     hostadm.log("info", "scanning " .. args[1])
//!   end,
//! }
//! ```
//!
//! Handlers run as coroutines; `hostadm.sleep(ms)` suspends without blocking
//! the process.

pub mod bridge;
pub mod discovery;
pub mod error;
pub mod marshal;
pub mod pool;
pub mod runtime;

pub use bridge::{InvocationContext, ScriptBridge, require_name};
pub use discovery::{DiscoveredScript, discover_scripts};
pub use error::{Result, ScriptError};
pub use pool::{PoolStats, PooledContext, RuntimePool};
pub use runtime::{GLOBAL_TABLE, ScriptRuntime};
