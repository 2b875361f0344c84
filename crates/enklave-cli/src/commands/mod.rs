//! CLI subcommand implementations.

pub mod events;
pub mod report;
pub mod total;
pub mod util;
