//! Command-line interface for hookstack
//!
//! Argument parsing lives in [`commands`]; [`Output`] and [`prompt`] are the
//! two ways hookstack talks to the person at the terminal.

pub mod commands;
mod output;
pub mod prompt;

pub use output::Output;
