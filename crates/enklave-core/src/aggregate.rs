//! Summing the time spent across slots.

use chrono::Duration;

use crate::reconcile::Slot;

/// Total time covered by the given slots.
///
/// An empty slice yields a zero duration.
pub fn total_duration(slots: &[Slot]) -> Duration {
    slots
        .iter()
        .fold(Duration::zero(), |total, slot| total + slot.duration())
}
