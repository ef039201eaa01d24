//! Operations module for fhost
//!
//! This module turns raw string commands into typed [`Command`] values and
//! dispatches them against a store, collecting one [`Output`] per command.

pub mod command;
pub mod dispatch;
pub mod script;

// Re-export key types for convenience
pub use command::{Command, CommandError};
pub use dispatch::{simulate, DispatchError, Dispatcher, Output};
pub use script::{parse_line, Script, ScriptError};
