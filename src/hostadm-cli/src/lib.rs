//! hostadm CLI library module.
//!
//! - `cli/` - global option parsing and the dispatch loop
//! - `logging` - stderr tracing subscriber

pub mod cli;
pub mod logging;

pub use cli::run;
