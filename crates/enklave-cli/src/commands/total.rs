//! Total command: the time spent at Enklave on a single line.

use std::io::Write;

use anyhow::{Context, Result};
use enklave_core::{reconcile, total_duration};

use super::util::{format_hms, load_events};
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let events = load_events(config)?;
    let slots = reconcile(events).context("failed to compute time slots")?;
    let total = total_duration(&slots);

    writeln!(writer, "Time spent at Enklave: {}", format_hms(total))?;
    Ok(())
}
