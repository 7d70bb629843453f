//! Pure create-or-update rules for an in-memory assignment collection.
//!
//! These functions never touch a store. The session applies them to its local
//! state before the corresponding write is sent, and stores mirror the same
//! rules in their upsert.

use chrono::NaiveDate;

use crate::{
  assignment::{Assignment, AssignmentChange, Period},
  person::PersonId,
};

/// Apply `change` to `existing`, returning the new collection.
///
/// An assignment already keyed by the change's (date, period) has only the
/// requested slot replaced; otherwise a new assignment is appended with the
/// other slot empty. All other entries are returned unmodified and in their
/// original order.
pub fn apply_assignment(
  existing: &[Assignment],
  change: &AssignmentChange,
) -> Vec<Assignment> {
  let mut next = existing.to_vec();
  match next
    .iter_mut()
    .find(|a| a.is_for(change.date, change.period))
  {
    Some(found) => found.set_occupant(change.slot, change.occupant),
    None => next.push(Assignment::from_change(change)),
  }
  next
}

/// Replace-or-append a record the store reported as authoritative.
pub fn merge_confirmed(
  existing: &[Assignment],
  confirmed: Assignment,
) -> Vec<Assignment> {
  let mut next = existing.to_vec();
  match next
    .iter_mut()
    .find(|a| a.is_for(confirmed.date, confirmed.period))
  {
    Some(found) => *found = confirmed,
    None => next.push(confirmed),
  }
  next
}

/// Empty every slot that `person` occupies. Used when a person leaves the
/// roster.
pub fn clear_occupant(
  existing: &[Assignment],
  person: PersonId,
) -> Vec<Assignment> {
  existing
    .iter()
    .cloned()
    .map(|mut a| {
      if a.slot1 == Some(person) {
        a.slot1 = None;
      }
      if a.slot2 == Some(person) {
        a.slot2 = None;
      }
      a
    })
    .collect()
}

/// The assignment for `(date, period)`, if one exists.
pub fn find(
  assignments: &[Assignment],
  date: NaiveDate,
  period: Period,
) -> Option<&Assignment> {
  assignments.iter().find(|a| a.is_for(date, period))
}
