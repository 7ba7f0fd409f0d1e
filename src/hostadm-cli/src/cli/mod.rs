//! CLI argument parsing and command dispatch.
//!
//! # Module Structure
//!
//! - `args` - global options and the split of argv into options and command
//! - `styles` - ANSI styling for usage output
//! - `dispatch` - the dispatch loop

pub mod args;
pub mod dispatch;
pub mod styles;

pub use args::{GlobalArgs, Invocation, OptionParseError, VERSION, global_prefix_len};
pub use dispatch::{Dispatcher, run};
pub use styles::{AFTER_HELP, get_styles};
