//! Command-line interface.

mod commands;
pub mod helpers;
pub mod icons;
pub mod progress;
pub mod prompt;

pub use commands::{is_verbose, run, Cli};
