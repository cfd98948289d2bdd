//! Command-line host for the engine

pub mod args;
pub mod commands;
pub mod ui;

pub use args::{Cli, Commands};
