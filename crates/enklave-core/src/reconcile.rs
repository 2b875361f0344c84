//! Repairing raw events into check-in/check-out slots.
//!
//! # Algorithm Summary
//!
//! 1. Sort events by timestamp (stable, so ties keep their input order)
//! 2. Collapse every run of same-kind events to its most recent member
//! 3. Drop a leading check-out, which has no check-in to pair with
//! 4. Drop a trailing check-in if the sequence is still odd
//! 5. Pair the remaining events two at a time and validate the pairs
//!
//! Steps 2-4 are recoverable: each discarded event is logged and recorded
//! in [`Reconciliation::discarded`]. A failed validation in step 5 aborts
//! the whole computation.

use std::fmt;

use chrono::Duration;
use serde::Serialize;
use thiserror::Error;

use crate::event::{Event, EventKind};

/// Errors that stop a reconciliation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Fewer than two events were supplied.
    #[error("at least 2 events are required, found {found}")]
    InsufficientData { found: usize },

    /// The repaired sequence did not pair up into valid slots.
    #[error("reconciliation invariant violated: {0}")]
    InvariantViolation(String),
}

/// A check-in paired with the check-out that ends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub check_in: Event,
    pub check_out: Event,
}

impl Slot {
    /// Time between check-in and check-out.
    pub fn duration(&self) -> Duration {
        self.check_out.timestamp - self.check_in.timestamp
    }
}

/// Why an event was left out of the slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// A later event of the same kind followed it directly.
    Superseded,
    /// A check-out at the start of the sequence.
    LeadingCheckOut,
    /// A check-in at the end of the sequence.
    TrailingUnmatched,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Superseded => "superseded by a later event of the same kind",
            Self::LeadingCheckOut => "check-out without a preceding check-in",
            Self::TrailingUnmatched => "check-in without a following check-out",
        };
        f.write_str(s)
    }
}

/// An event dropped while repairing the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discarded {
    pub event: Event,
    pub reason: DiscardReason,
}

/// Slots produced from a batch of events, with everything that was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Slots in chronological order.
    pub slots: Vec<Slot>,
    /// Dropped events in chronological order.
    pub discarded: Vec<Discarded>,
}

/// Pair events into chronologically ordered slots.
///
/// See [`reconcile_detailed`] for the repair rules.
pub fn reconcile(events: Vec<Event>) -> Result<Vec<Slot>, ReconcileError> {
    reconcile_detailed(events).map(|reconciliation| reconciliation.slots)
}

/// Pair events into slots and report the events that had to be dropped.
///
/// # Errors
///
/// Returns [`ReconcileError::InsufficientData`] for fewer than two events and
/// [`ReconcileError::InvariantViolation`] if the repaired sequence cannot be
/// paired. No partial result is returned in either case.
pub fn reconcile_detailed(mut events: Vec<Event>) -> Result<Reconciliation, ReconcileError> {
    if events.len() < 2 {
        return Err(ReconcileError::InsufficientData {
            found: events.len(),
        });
    }

    // sort_by_key is stable
    events.sort_by_key(|event| event.timestamp);

    let mut discarded = Vec::new();
    let mut sequence = collapse_runs(events, &mut discarded);

    if sequence
        .first()
        .is_some_and(|event| event.kind == EventKind::CheckOut)
    {
        let leading = sequence.remove(0);
        discard(&mut discarded, leading, DiscardReason::LeadingCheckOut);
    }

    if sequence.len() % 2 != 0 {
        if let Some(trailing) = sequence.pop() {
            discard(&mut discarded, trailing, DiscardReason::TrailingUnmatched);
        }
    }

    let slots = pair(sequence)?;
    discarded.sort_by_key(|d| d.event.timestamp);

    tracing::debug!(
        slots = slots.len(),
        discarded = discarded.len(),
        "reconciled events"
    );

    Ok(Reconciliation { slots, discarded })
}

/// Keep only the most recent event of each run of same-kind events.
fn collapse_runs(events: Vec<Event>, discarded: &mut Vec<Discarded>) -> Vec<Event> {
    let mut sequence: Vec<Event> = Vec::with_capacity(events.len());

    for event in events {
        match sequence.last_mut() {
            Some(last) if last.kind == event.kind => {
                let superseded = std::mem::replace(last, event);
                discard(discarded, superseded, DiscardReason::Superseded);
            }
            _ => sequence.push(event),
        }
    }

    sequence
}

fn discard(discarded: &mut Vec<Discarded>, event: Event, reason: DiscardReason) {
    tracing::warn!(%event, %reason, "discarding event");
    discarded.push(Discarded { event, reason });
}

/// Pair an even-length, alternating sequence two at a time.
fn pair(sequence: Vec<Event>) -> Result<Vec<Slot>, ReconcileError> {
    let expected = sequence.len() / 2;
    let mut slots = Vec::with_capacity(expected);
    let mut events = sequence.into_iter();

    while let Some(check_in) = events.next() {
        let Some(check_out) = events.next() else {
            return Err(ReconcileError::InvariantViolation(format!(
                "{check_in} has no partner left to pair with"
            )));
        };
        slots.push(Slot {
            check_in,
            check_out,
        });
    }

    validate(&slots, expected)?;
    Ok(slots)
}

fn validate(slots: &[Slot], expected: usize) -> Result<(), ReconcileError> {
    if slots.len() != expected {
        return Err(ReconcileError::InvariantViolation(format!(
            "expected {expected} slots, built {}",
            slots.len()
        )));
    }

    for slot in slots {
        if slot.check_in.kind != EventKind::CheckIn || slot.check_out.kind != EventKind::CheckOut {
            return Err(ReconcileError::InvariantViolation(format!(
                "check-in and check-out interchanged: {} / {}",
                slot.check_in, slot.check_out
            )));
        }
        if slot.check_in.timestamp > slot.check_out.timestamp {
            return Err(ReconcileError::InvariantViolation(format!(
                "check-out precedes check-in: {} / {}",
                slot.check_in, slot.check_out
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 9, 13, hour, minute, 0).unwrap()
    }

    fn check_in(hour: u32) -> Event {
        Event::new(EventKind::CheckIn, at(hour, 0), format!("in-{hour}.eml"))
    }

    fn check_out(hour: u32) -> Event {
        Event::new(EventKind::CheckOut, at(hour, 0), format!("out-{hour}.eml"))
    }

    fn hours(slots: &[Slot]) -> Vec<(u32, u32)> {
        use chrono::Timelike;
        slots
            .iter()
            .map(|s| (s.check_in.timestamp.hour(), s.check_out.timestamp.hour()))
            .collect()
    }

    #[test]
    fn empty_input_is_insufficient() {
        assert_eq!(
            reconcile(Vec::new()),
            Err(ReconcileError::InsufficientData { found: 0 })
        );
    }

    #[test]
    fn single_event_is_insufficient() {
        assert_eq!(
            reconcile(vec![check_in(9)]),
            Err(ReconcileError::InsufficientData { found: 1 })
        );
    }

    #[test]
    fn alternating_sequence_pairs_in_order() {
        let slots = reconcile(vec![
            check_in(8),
            check_out(9),
            check_in(10),
            check_out(12),
            check_in(13),
            check_out(17),
        ])
        .unwrap();

        assert_eq!(hours(&slots), vec![(8, 9), (10, 12), (13, 17)]);
        for slot in &slots {
            assert_eq!(slot.check_in.kind, EventKind::CheckIn);
            assert_eq!(slot.check_out.kind, EventKind::CheckOut);
        }
    }

    #[test]
    fn unsorted_input_is_sorted_by_timestamp() {
        let slots = reconcile(vec![
            check_out(17),
            check_in(8),
            check_in(13),
            check_out(9),
        ])
        .unwrap();

        assert_eq!(hours(&slots), vec![(8, 9), (13, 17)]);
    }

    #[test]
    fn repaired_sequence_is_returned_unchanged() {
        let events = vec![check_in(8), check_out(9), check_in(10), check_out(11)];
        let reconciliation = reconcile_detailed(events.clone()).unwrap();

        assert!(reconciliation.discarded.is_empty());
        let flattened: Vec<Event> = reconciliation
            .slots
            .into_iter()
            .flat_map(|slot| [slot.check_in, slot.check_out])
            .collect();
        assert_eq!(flattened, events);
    }

    #[test]
    fn duplicate_check_out_keeps_most_recent() {
        let reconciliation = reconcile_detailed(vec![
            check_in(9),
            check_out(10),
            check_out(11),
            check_in(12),
            check_out(13),
        ])
        .unwrap();

        assert_eq!(hours(&reconciliation.slots), vec![(9, 11), (12, 13)]);
        assert_eq!(
            reconciliation.discarded,
            vec![Discarded {
                event: check_out(10),
                reason: DiscardReason::Superseded,
            }]
        );
    }

    #[test]
    fn run_of_any_length_collapses_to_last_member() {
        for run in 2..=6 {
            let mut events = vec![check_in(1)];
            events.extend((0..run).map(|i| check_in(2 + i)));
            events.push(check_out(20));

            let reconciliation = reconcile_detailed(events).unwrap();

            assert_eq!(
                hours(&reconciliation.slots),
                vec![(1 + run, 20)],
                "run of {run} extra check-ins"
            );
            assert_eq!(reconciliation.discarded.len(), usize::try_from(run).unwrap());
            assert!(
                reconciliation
                    .discarded
                    .iter()
                    .all(|d| d.reason == DiscardReason::Superseded)
            );
        }
    }

    #[test]
    fn trailing_check_in_is_trimmed() {
        let reconciliation = reconcile_detailed(vec![
            check_in(8),
            check_out(9),
            check_in(10),
            check_out(11),
            check_in(12),
        ])
        .unwrap();

        assert_eq!(hours(&reconciliation.slots), vec![(8, 9), (10, 11)]);
        assert_eq!(
            reconciliation.discarded,
            vec![Discarded {
                event: check_in(12),
                reason: DiscardReason::TrailingUnmatched,
            }]
        );
    }

    #[test]
    fn leading_check_out_is_dropped() {
        let reconciliation =
            reconcile_detailed(vec![check_out(7), check_in(8), check_out(9)]).unwrap();

        assert_eq!(hours(&reconciliation.slots), vec![(8, 9)]);
        assert_eq!(
            reconciliation.discarded,
            vec![Discarded {
                event: check_out(7),
                reason: DiscardReason::LeadingCheckOut,
            }]
        );
    }

    #[test]
    fn leading_and_trailing_unmatched_are_both_dropped() {
        let reconciliation =
            reconcile_detailed(vec![check_out(7), check_in(8), check_out(9), check_in(10)])
                .unwrap();

        assert_eq!(hours(&reconciliation.slots), vec![(8, 9)]);
        let reasons: Vec<_> = reconciliation
            .discarded
            .iter()
            .map(|d| d.reason)
            .collect();
        assert_eq!(
            reasons,
            vec![
                DiscardReason::LeadingCheckOut,
                DiscardReason::TrailingUnmatched
            ]
        );
    }

    #[test]
    fn result_is_always_even_after_repair() {
        let inputs = vec![
            vec![check_in(1), check_in(2), check_in(3)],
            vec![check_out(1), check_out(2)],
            vec![check_in(1), check_out(2), check_out(3), check_out(4), check_in(5)],
            vec![check_out(1), check_in(2)],
        ];

        for events in inputs {
            let total = events.len();
            let reconciliation = reconcile_detailed(events).unwrap();
            assert_eq!(
                reconciliation.slots.len() * 2 + reconciliation.discarded.len(),
                total
            );
        }
    }

    #[test]
    fn only_check_outs_yield_no_slots() {
        let reconciliation = reconcile_detailed(vec![check_out(9), check_out(10)]).unwrap();

        assert!(reconciliation.slots.is_empty());
        assert_eq!(reconciliation.discarded.len(), 2);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let slots = reconcile(vec![check_in(9), check_out(9)]).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].duration(), Duration::zero());

        // The check-out stays first on the tie, so it is dropped as leading.
        let reconciliation =
            reconcile_detailed(vec![check_out(9), check_in(9), check_out(10)]).unwrap();
        assert_eq!(hours(&reconciliation.slots), vec![(9, 10)]);
        assert_eq!(
            reconciliation.discarded[0].reason,
            DiscardReason::LeadingCheckOut
        );
    }

    #[test]
    fn validate_rejects_interchanged_kinds() {
        let slots = vec![Slot {
            check_in: check_out(9),
            check_out: check_in(10),
        }];

        let err = validate(&slots, 1).unwrap_err();
        assert!(matches!(err, ReconcileError::InvariantViolation(_)));
    }

    #[test]
    fn validate_rejects_slot_count_mismatch() {
        let slots = vec![Slot {
            check_in: check_in(9),
            check_out: check_out(10),
        }];

        assert_eq!(
            validate(&slots, 2),
            Err(ReconcileError::InvariantViolation(
                "expected 2 slots, built 1".to_string()
            ))
        );
    }

    #[test]
    fn validate_rejects_reversed_timestamps() {
        let slots = vec![Slot {
            check_in: check_in(10),
            check_out: check_out(9),
        }];

        assert!(validate(&slots, 1).is_err());
    }

    #[test]
    fn discard_reason_display() {
        assert_eq!(
            DiscardReason::TrailingUnmatched.to_string(),
            "check-in without a following check-out"
        );
    }
}
