//! Reading check-in/check-out events from a folder of notification mails.
//!
//! A mail is relevant when its first line names the expected sender. The kind
//! comes from the subject line and the timestamp from the date header that
//! follows it. Each file yields at most one [`Event`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;

use crate::event::{Event, EventKind};

/// Files considered for scanning.
pub const DEFAULT_FILE_PATTERN: &str = r"\.eml$";

/// Must match the first line of a relevant mail.
pub const DEFAULT_SENDER_PATTERN: &str = r"header\.from=enklave\.de";

pub const DEFAULT_CHECK_IN_PATTERN: &str = r"^Subject:.*Check_in";

pub const DEFAULT_CHECK_OUT_PATTERN: &str = r"^Subject:.*Check out";

/// Date header, e.g. `X-Pm-Date: Fri, 13 Sep 2019 13:44:02 +0200`.
///
/// The UTC offset is left outside the `datetime` group and therefore ignored.
pub const DEFAULT_DATE_PATTERN: &str = r"^X-Pm-Date:\s*(?:[A-Za-z]{3},\s*)?(?P<datetime>\d{1,2} [A-Za-z]{3} \d{4} \d{2}:\d{2}:\d{2})";

pub const DEFAULT_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Name of the capture group holding the date text.
const DATETIME_GROUP: &str = "datetime";

/// Errors from compiling [`MailPatterns`].
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid {name} pattern: {source}")]
    Regex {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("date pattern must contain a named group `datetime`")]
    MissingDatetimeGroup,
}

/// Errors from reading a single mail or scanning a folder.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file is empty")]
    Empty,

    #[error("not a mail from the expected sender")]
    NotFromSender,

    #[error("date header found before any check-in or check-out marker")]
    NoMarker,

    #[error("no date header found")]
    MissingDate,

    #[error("invalid date {value:?}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Compiled patterns used to recognize and parse notification mails.
#[derive(Debug, Clone)]
pub struct MailPatterns {
    file: Regex,
    sender: Regex,
    check_in: Regex,
    check_out: Regex,
    date: Regex,
    date_format: String,
}

impl MailPatterns {
    /// Compiles the given patterns.
    ///
    /// `date` must contain a named group `datetime` whose text is parsed
    /// with `date_format`.
    pub fn new(
        file: &str,
        sender: &str,
        check_in: &str,
        check_out: &str,
        date: &str,
        date_format: impl Into<String>,
    ) -> Result<Self, PatternError> {
        let date = compile("date", date)?;
        if !date.capture_names().flatten().any(|n| n == DATETIME_GROUP) {
            return Err(PatternError::MissingDatetimeGroup);
        }

        Ok(Self {
            file: compile("file", file)?,
            sender: compile("sender", sender)?,
            check_in: compile("check-in", check_in)?,
            check_out: compile("check-out", check_out)?,
            date,
            date_format: date_format.into(),
        })
    }

    /// Whether the file name marks a candidate mail.
    pub fn is_candidate(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.file.is_match(n))
    }
}

impl Default for MailPatterns {
    fn default() -> Self {
        Self::new(
            DEFAULT_FILE_PATTERN,
            DEFAULT_SENDER_PATTERN,
            DEFAULT_CHECK_IN_PATTERN,
            DEFAULT_CHECK_OUT_PATTERN,
            DEFAULT_DATE_PATTERN,
            DEFAULT_DATE_FORMAT,
        )
        .expect("default mail patterns are valid")
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError::Regex { name, source })
}

/// Parse the text of one mail into an event.
///
/// The first line must match the sender pattern. The remaining lines are read
/// in order: marker lines set the kind, and the first date header ends the
/// scan.
pub fn parse_mail(text: &str, source: &Path, patterns: &MailPatterns) -> Result<Event, SourceError> {
    let mut lines = text.lines();
    let first = lines.next().ok_or(SourceError::Empty)?;
    if !patterns.sender.is_match(first) {
        return Err(SourceError::NotFromSender);
    }

    let mut kind = None;
    for line in lines {
        if patterns.check_in.is_match(line) {
            kind = Some(EventKind::CheckIn);
        }
        if patterns.check_out.is_match(line) {
            kind = Some(EventKind::CheckOut);
        }

        if let Some(caps) = patterns.date.captures(line) {
            let kind = kind.ok_or(SourceError::NoMarker)?;
            let value = caps.name(DATETIME_GROUP).map_or("", |m| m.as_str());
            let timestamp = NaiveDateTime::parse_from_str(value, &patterns.date_format)
                .map_err(|source| SourceError::InvalidDate {
                    value: value.to_string(),
                    source,
                })?
                .and_utc();
            return Ok(Event::new(kind, timestamp, source));
        }
    }

    Err(SourceError::MissingDate)
}

/// Read and parse a single mail file.
pub fn parse_file(path: &Path, patterns: &MailPatterns) -> Result<Event, SourceError> {
    let bytes = fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Mail bodies are not guaranteed to be UTF-8; headers we care about are ASCII.
    parse_mail(&String::from_utf8_lossy(&bytes), path, patterns)
}

/// Scan a folder (non-recursively) and parse every candidate mail.
///
/// Files that fail to parse are logged and skipped. Events are returned in
/// file path order.
pub fn scan_directory(dir: &Path, patterns: &MailPatterns) -> Result<Vec<Event>, SourceError> {
    tracing::debug!(dir = ?dir, "scanning for relevant files");

    let io_error = |source: std::io::Error| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && patterns.is_candidate(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();

    let events: Vec<Event> = candidates
        .par_iter()
        .filter_map(|path| match parse_file(path, patterns) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "skipping file");
                None
            }
        })
        .collect();

    tracing::debug!(
        candidates = candidates.len(),
        events = events.len(),
        "scanned mail folder"
    );
    Ok(events)
}
