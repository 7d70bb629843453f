//! [`SqliteStore`]: the SQLite implementation of [`RosterStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rota_core::{
  assignment::{Assignment, AssignmentChange, Slot},
  calendar::YearMonth,
  person::Person,
  store::{RosterStore, Scope},
};

use crate::{
  Error, Result,
  encode::{RawAssignment, RawPerson, encode_date, encode_dt, encode_owner, encode_uuid},
  schema::{SCHEMA, SCHEMA_VERSION},
};

const UPSERT_SLOT1: &str = "
  INSERT INTO assignments (owner, date, period, slot1, slot2, updated_at)
  VALUES (?1, ?2, ?3, ?4, NULL, ?5)
  ON CONFLICT (owner, date, period)
  DO UPDATE SET slot1 = excluded.slot1, updated_at = excluded.updated_at";

const UPSERT_SLOT2: &str = "
  INSERT INTO assignments (owner, date, period, slot1, slot2, updated_at)
  VALUES (?1, ?2, ?3, NULL, ?4, ?5)
  ON CONFLICT (owner, date, period)
  DO UPDATE SET slot2 = excluded.slot2, updated_at = excluded.updated_at";

const SELECT_ASSIGNMENT: &str = "
  SELECT date, period, slot1, slot2 FROM assignments
  WHERE owner = ?1 AND date = ?2 AND period = ?3";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let found: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
      })
      .await?;

    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, expected: SCHEMA_VERSION });
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
      })
      .await?;

    tracing::debug!(previous_version = found, "schema initialised");
    Ok(())
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn list_people(&self, scope: Scope) -> Result<Vec<Person>> {
    let owner = encode_owner(&scope);

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT person_id, name FROM people
           WHERE owner = ?1
           ORDER BY name COLLATE NOCASE, person_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner], |row| {
            Ok(RawPerson {
              person_id: row.get(0)?,
              name:      row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn insert_person(&self, scope: Scope, person: Person) -> Result<Person> {
    let id_str = encode_uuid(person.id);
    let owner  = encode_owner(&scope);
    let name   = person.name.clone();
    let at_str = encode_dt(Utc::now());

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM people WHERE person_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if taken {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO people (person_id, owner, name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, owner, name, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(rota_core::Error::DuplicatePerson(person.id).into());
    }
    Ok(person)
  }

  async fn delete_person(&self, scope: Scope, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let owner  = encode_owner(&scope);

    // `ON DELETE SET NULL` on both slot columns empties the person's slots.
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM people WHERE person_id = ?1 AND owner = ?2",
          rusqlite::params![id_str, owner],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn list_assignments(
    &self,
    scope: Scope,
    month: Option<YearMonth>,
  ) -> Result<Vec<Assignment>> {
    let owner = encode_owner(&scope);
    // Ids within one month share a prefix, so a text range selects it.
    let range = month
      .and_then(|m| Some((m.first_day()?, m.last_day()?)))
      .map(|(from, to)| (encode_date(from), encode_date(to)));

    let raws: Vec<RawAssignment> = self
      .conn
      .call(move |conn| {
        let order = "ORDER BY date, CASE period WHEN 'MORNING' THEN 0 ELSE 1 END";
        let rows = if let Some((from, to)) = range {
          let mut stmt = conn.prepare(&format!(
            "SELECT date, period, slot1, slot2 FROM assignments
             WHERE owner = ?1 AND date BETWEEN ?2 AND ?3
             {order}"
          ))?;
          stmt
            .query_map(rusqlite::params![owner, from, to], RawAssignment::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT date, period, slot1, slot2 FROM assignments
             WHERE owner = ?1
             {order}"
          ))?;
          stmt
            .query_map(rusqlite::params![owner], RawAssignment::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    // Signed years (`+10000-..`) sort before `0000-..` as text.
    let mut assignments = raws
      .into_iter()
      .map(RawAssignment::into_assignment)
      .collect::<Result<Vec<_>>>()?;
    assignments.sort_by_key(|a| (a.date, a.period));
    Ok(assignments)
  }

  async fn upsert_assignment(
    &self,
    scope: Scope,
    change: AssignmentChange,
  ) -> Result<Assignment> {
    let owner    = encode_owner(&scope);
    let date_str = encode_date(change.date);
    let period   = change.period.as_str();
    let occupant = change.occupant.map(encode_uuid);
    let at_str   = encode_dt(Utc::now());
    let sql      = match change.slot {
      Slot::First => UPSERT_SLOT1,
      Slot::Second => UPSERT_SLOT2,
    };

    // A row that does not decode is rolled back when `tx` drops uncommitted.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          sql,
          rusqlite::params![owner, date_str, period, occupant, at_str],
        )?;
        let raw = tx.query_row(
          SELECT_ASSIGNMENT,
          rusqlite::params![owner, date_str, period],
          RawAssignment::from_row,
        )?;
        let assignment = match raw.into_assignment() {
          Ok(assignment) => assignment,
          Err(err) => return Ok(Err(err)),
        };
        tx.commit()?;
        Ok(Ok(assignment))
      })
      .await?
  }
}
