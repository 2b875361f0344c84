//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono::Duration;
use enklave_core::{Event, scan_directory};

use crate::Config;

/// Scan the configured mail folder for events.
pub fn load_events(config: &Config) -> Result<Vec<Event>> {
    let patterns = config
        .mail_patterns()
        .context("invalid mail pattern in configuration")?;
    let events = scan_directory(&config.mail_dir, &patterns).context("failed to scan mail folder")?;
    tracing::debug!(event_count = events.len(), "loaded events");
    Ok(events)
}

/// Formats a duration as `HH:MM:SS`.
///
/// Hours are not wrapped at 24. Negative durations are shown as zero.
pub fn format_hms(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds % 3600 / 60,
        seconds % 60
    )
}
