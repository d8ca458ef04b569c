//! CLI subcommands.

pub mod list;
pub mod run;
