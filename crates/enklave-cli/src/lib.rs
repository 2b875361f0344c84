//! Enklave time report CLI library.
//!
//! This crate provides the CLI interface for computing the time spent at
//! Enklave from check-in and check-out notification mails.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
