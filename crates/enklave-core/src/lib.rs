//! Core domain logic for tracking time spent at Enklave.
//!
//! This crate contains:
//! - Events: check-ins and check-outs read from notification mails
//! - Source: scanning a mail folder and parsing each mail into an event
//! - Reconciliation: repairing the events into check-in/check-out slots
//! - Aggregation: summing the time covered by the slots

mod aggregate;
pub mod event;
pub mod reconcile;
pub mod source;

pub use aggregate::total_duration;
pub use event::{Event, EventKind, UnknownEventKind};
pub use reconcile::{
    DiscardReason, Discarded, ReconcileError, Reconciliation, Slot, reconcile, reconcile_detailed,
};
pub use source::{MailPatterns, PatternError, SourceError, parse_file, parse_mail, scan_directory};
