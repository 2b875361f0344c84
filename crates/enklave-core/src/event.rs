//! Check-in and check-out events parsed from access-control mails.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a notification marks an arrival or a departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CheckIn,
    CheckOut,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CheckIn => "check-in",
            Self::CheckOut => "check-out",
        }
    }

    /// Capitalized label used when rendering events for humans.
    const fn label(self) -> &'static str {
        match self {
            Self::CheckIn => "Check-in",
            Self::CheckOut => "Check-out",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check-in" | "check_in" => Ok(Self::CheckIn),
            "check-out" | "check_out" => Ok(Self::CheckOut),
            _ => Err(UnknownEventKind(s.to_string())),
        }
    }
}

/// Error type for unknown event kind strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownEventKind(String);

/// One observed access-control notification.
///
/// Every field is populated: mails that do not yield a kind and a timestamp
/// never become an `Event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Wall-clock time of the notification with its UTC offset stripped.
    pub timestamp: DateTime<Utc>,
    /// File the event was read from. Only used for diagnostics.
    pub source: PathBuf,
}

impl Event {
    pub fn new(kind: EventKind, timestamp: DateTime<Utc>, source: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            timestamp,
            source: source.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at: {} ({})",
            self.kind.label(),
            self.timestamp.format("%F %T"),
            self.source.display()
        )
    }
}
