//! Command handlers behind the CLI subcommands

pub mod analyze;
pub mod config;
pub mod history;
pub mod llm;
pub mod report;
