//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` built from their components, timestamps
//! as RFC 3339 strings, UUIDs as hyphenated lowercase strings and periods as
//! their persisted tokens.

use chrono::{DateTime, NaiveDate, Utc};
use rota_core::{
  assignment::{Assignment, Period},
  calendar::{date_to_id, parse_date_id},
  person::Person,
  store::Scope,
};
use uuid::Uuid;

use crate::Result;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_date(date: NaiveDate) -> String { date_to_id(date) }

pub fn decode_date(s: &str) -> Result<NaiveDate> { Ok(parse_date_id(s)?) }

// ─── Scope ───────────────────────────────────────────────────────────────────

/// The `owner` column value for `scope`; the shared scope is `''`.
pub fn encode_owner(scope: &Scope) -> String {
  scope.owner().unwrap_or_default().to_owned()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub person_id: String,
  pub name:      String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:   decode_uuid(&self.person_id)?,
      name: self.name,
    })
  }
}

/// Raw strings read directly from an `assignments` row.
pub struct RawAssignment {
  pub date:   String,
  pub period: String,
  pub slot1:  Option<String>,
  pub slot2:  Option<String>,
}

impl RawAssignment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      date:   row.get(0)?,
      period: row.get(1)?,
      slot1:  row.get(2)?,
      slot2:  row.get(3)?,
    })
  }

  pub fn into_assignment(self) -> Result<Assignment> {
    Ok(Assignment {
      date:   decode_date(&self.date)?,
      period: Period::parse(&self.period)?,
      slot1:  self.slot1.as_deref().map(decode_uuid).transpose()?,
      slot2:  self.slot2.as_deref().map(decode_uuid).transpose()?,
    })
  }
}
