//! Assignment types: who serves in which slot of a (date, period).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{Error, Result, person::PersonId};

// ─── Period ──────────────────────────────────────────────────────────────────

/// A time-of-day service window.
///
/// Persisted as `MORNING` / `EVENING`. Records written by the earlier
/// Portuguese-language schedule used `MANHÃ` / `NOITE`; those are accepted on
/// input and never produced.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Period {
  #[serde(alias = "MANHÃ")]
  #[strum(to_string = "MORNING", serialize = "MANHÃ")]
  Morning,
  #[serde(alias = "NOITE")]
  #[strum(to_string = "EVENING", serialize = "NOITE")]
  Evening,
}

impl Period {
  /// The persisted token for this period.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Morning => "MORNING",
      Self::Evening => "EVENING",
    }
  }

  /// Parse a persisted token, legacy spellings included.
  pub fn parse(token: &str) -> Result<Self> {
    token
      .parse()
      .map_err(|_| Error::UnknownPeriod(token.to_owned()))
  }
}

// ─── Slot ────────────────────────────────────────────────────────────────────

/// One of the two positions in an assignment. Serialised as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
  First,
  Second,
}

impl Slot {
  pub const BOTH: [Slot; 2] = [Slot::First, Slot::Second];

  pub fn other(self) -> Self {
    match self {
      Self::First => Self::Second,
      Self::Second => Self::First,
    }
  }
}

impl TryFrom<u8> for Slot {
  type Error = Error;

  fn try_from(n: u8) -> Result<Self> {
    match n {
      1 => Ok(Self::First),
      2 => Ok(Self::Second),
      other => Err(Error::InvalidSlot(other)),
    }
  }
}

impl From<Slot> for u8 {
  fn from(slot: Slot) -> Self {
    match slot {
      Slot::First => 1,
      Slot::Second => 2,
    }
  }
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// The occupants of both slots for one (date, period).
///
/// At most one assignment exists per (date, period) within a scope. An empty
/// slot is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
  pub date:   NaiveDate,
  pub period: Period,
  pub slot1:  Option<PersonId>,
  pub slot2:  Option<PersonId>,
}

impl Assignment {
  /// An assignment with both slots empty.
  pub fn empty(date: NaiveDate, period: Period) -> Self {
    Self { date, period, slot1: None, slot2: None }
  }

  /// A new assignment holding only the change's occupant.
  pub fn from_change(change: &AssignmentChange) -> Self {
    let mut assignment = Self::empty(change.date, change.period);
    assignment.set_occupant(change.slot, change.occupant);
    assignment
  }

  pub fn occupant(&self, slot: Slot) -> Option<PersonId> {
    match slot {
      Slot::First => self.slot1,
      Slot::Second => self.slot2,
    }
  }

  pub fn set_occupant(&mut self, slot: Slot, occupant: Option<PersonId>) {
    match slot {
      Slot::First => self.slot1 = occupant,
      Slot::Second => self.slot2 = occupant,
    }
  }

  /// Whether this assignment is keyed by `(date, period)`.
  pub fn is_for(&self, date: NaiveDate, period: Period) -> bool {
    self.date == date && self.period == period
  }

  /// Whether `person` occupies either slot.
  pub fn holds(&self, person: PersonId) -> bool {
    self.slot1 == Some(person) || self.slot2 == Some(person)
  }
}

// ─── AssignmentChange ────────────────────────────────────────────────────────

/// A request to set (or clear, with `occupant: None`) one slot of one
/// (date, period). Stores apply it as a partial upsert: the other slot is
/// never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentChange {
  pub date:     NaiveDate,
  pub period:   Period,
  pub slot:     Slot,
  #[serde(default)]
  pub occupant: Option<PersonId>,
}
