//! Report command for listing stays and discarded events.
//!
//! This module implements `enklave report` with human-readable and JSON
//! output. Both show the same content: every stay with its duration, every
//! event dropped while pairing, and the total.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::Duration;
use enklave_core::{Discarded, Event, Reconciliation, Slot, reconcile_detailed, total_duration};
use serde::Serialize;

use super::util::{format_hms, load_events};
use crate::Config;

const TIME_FORMAT: &str = "%F %T";

/// A stay with its precomputed duration.
#[derive(Debug, Serialize)]
pub struct SlotEntry {
    #[serde(flatten)]
    pub slot: Slot,
    pub duration_seconds: i64,
}

/// Computed report data.
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub slots: Vec<SlotEntry>,
    pub discarded: Vec<Discarded>,
    pub total_seconds: i64,
    /// Total formatted as `HH:MM:SS`.
    pub total: String,
}

/// Reconciles the events and collects everything the report shows.
pub fn generate_report_data(events: Vec<Event>) -> Result<ReportData> {
    let Reconciliation { slots, discarded } =
        reconcile_detailed(events).context("failed to compute time slots")?;
    let total = total_duration(&slots);

    let slots = slots
        .into_iter()
        .map(|slot| {
            let duration_seconds = slot.duration().num_seconds();
            SlotEntry {
                slot,
                duration_seconds,
            }
        })
        .collect();

    Ok(ReportData {
        slots,
        discarded,
        total_seconds: total.num_seconds(),
        total: format_hms(total),
    })
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(output, "ENKLAVE REPORT").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "STAYS").unwrap();
    writeln!(output, "─────").unwrap();

    if data.slots.is_empty() {
        writeln!(output, "(no complete check-in/check-out pairs)").unwrap();
    }
    for entry in &data.slots {
        writeln!(
            output,
            "{} → {}  {}",
            entry.slot.check_in.timestamp.format(TIME_FORMAT),
            entry.slot.check_out.timestamp.format(TIME_FORMAT),
            format_hms(Duration::seconds(entry.duration_seconds))
        )
        .unwrap();
    }

    if !data.discarded.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "DISCARDED").unwrap();
        writeln!(output, "─────────").unwrap();
        for discarded in &data.discarded {
            writeln!(
                output,
                "{}  {:<9}  {} ({})",
                discarded.event.timestamp.format(TIME_FORMAT),
                discarded.event.kind,
                discarded.reason,
                discarded.event.source.display()
            )
            .unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "TOTAL: {}", data.total).unwrap();
    output
}

pub fn run<W: Write>(writer: &mut W, config: &Config, json: bool) -> Result<()> {
    let events = load_events(config)?;
    let data = generate_report_data(events)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }

    Ok(())
}
