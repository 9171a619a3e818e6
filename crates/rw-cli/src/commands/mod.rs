//! CLI subcommand implementations.

pub mod assess;
pub mod dataset;
