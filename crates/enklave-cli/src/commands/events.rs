//! Events command for inspecting what was parsed from the mail folder.
//!
//! This module outputs events as JSONL for debugging.

use std::io::Write;

use anyhow::Result;

use super::util::load_events;
use crate::Config;

/// Runs the events command, writing one JSON object per event, oldest first.
pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let mut events = load_events(config)?;
    events.sort_by_key(|event| event.timestamp);

    for event in events {
        let json = serde_json::to_string(&event)?;
        writeln!(writer, "{json}")?;
    }

    Ok(())
}
