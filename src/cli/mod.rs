//! Command-line interface and subcommand entry points.

mod args;
pub mod extract;
pub mod generate;

pub use args::{Cli, Commands, ExtractArgs, GenerateArgs, ServeArgs};
