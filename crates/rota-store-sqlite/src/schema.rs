//! SQL schema for the Rota SQLite store.
//!
//! Executed once at connection startup, after which the store stamps
//! [`SCHEMA_VERSION`] into `PRAGMA user_version`; a file with a newer version
//! is refused.

pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- owner is '' for the shared scope, otherwise the owning account's username.
CREATE TABLE IF NOT EXISTS people (
    person_id   TEXT PRIMARY KEY,
    owner       TEXT NOT NULL DEFAULT '',
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- One row per (owner, date, period). Removing a person empties their slots.
CREATE TABLE IF NOT EXISTS assignments (
    owner       TEXT NOT NULL DEFAULT '',
    date        TEXT NOT NULL,   -- YYYY-MM-DD
    period      TEXT NOT NULL CHECK (period IN ('MORNING', 'EVENING')),
    slot1       TEXT REFERENCES people(person_id) ON DELETE SET NULL,
    slot2       TEXT REFERENCES people(person_id) ON DELETE SET NULL,
    updated_at  TEXT NOT NULL,   -- ISO 8601 UTC
    PRIMARY KEY (owner, date, period)
);

CREATE INDEX IF NOT EXISTS people_owner_idx ON people(owner, name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS assignments_slot1_idx ON assignments(slot1);
CREATE INDEX IF NOT EXISTS assignments_slot2_idx ON assignments(slot2);
";
