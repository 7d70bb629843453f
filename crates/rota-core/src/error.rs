//! Error types for `rota-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("person name must not be blank")]
  EmptyName,

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("person {0} already exists")]
  DuplicatePerson(Uuid),

  #[error("no account is signed in")]
  SignedOut,

  #[error("{0} is not allowed to change the roster")]
  Forbidden(String),

  #[error("invalid date {0:?}: expected YYYY-MM-DD")]
  InvalidDate(String),

  #[error("unknown period {0:?}")]
  UnknownPeriod(String),

  #[error("slot must be 1 or 2, got {0}")]
  InvalidSlot(u8),

  #[error("month index must be between 0 and 11, got {0}")]
  InvalidMonth(u32),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Find the first roster [`Error`] in `err`'s source chain, including `err`
/// itself. Backends wrap core errors in their own types, so callers that
/// need to tell a rule violation from a storage failure walk the chain.
pub fn core_cause<'a>(
  err: &'a (dyn std::error::Error + 'static),
) -> Option<&'a Error> {
  let mut current = Some(err);
  while let Some(err) = current {
    if let Some(core) = err.downcast_ref::<Error>() {
      return Some(core);
    }
    current = err.source();
  }
  None
}

/// Remediation shown to an administrator when a backend error looks like the
/// storage schema is missing a table or column.
pub const SCHEMA_REMEDIATION: &str = "the roster database is missing tables \
   or columns; restart the server against a fresh store file or run it once \
   with write access so the schema can be created";

/// Recognise schema-mismatch wording in a backend error message.
///
/// Backends do not report this condition in a structured way, so the match is
/// done on the message text.
pub fn schema_hint(message: &str) -> Option<&'static str> {
  let lower = message.to_lowercase();
  let looks_missing = lower.contains("no such table")
    || lower.contains("no such column")
    || lower.contains("has no column named")
    || lower.contains("schema version")
    || (lower.contains("relation") && lower.contains("does not exist"))
    || (lower.contains("column") && lower.contains("does not exist"));
  looks_missing.then_some(SCHEMA_REMEDIATION)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sqlite_missing_table_is_recognised() {
    assert_eq!(
      schema_hint("database error: no such table: assignments"),
      Some(SCHEMA_REMEDIATION)
    );
    assert!(schema_hint("table people has no column named owner").is_some());
  }

  #[test]
  fn postgres_wording_is_recognised() {
    assert!(
      schema_hint("relation \"public.people\" does not exist").is_some()
    );
    assert!(schema_hint("column \"slot2\" does not exist").is_some());
  }

  #[derive(Debug, thiserror::Error)]
  #[error("backend: {0}")]
  struct Backend(#[source] Error);

  #[test]
  fn core_cause_walks_wrapped_errors() {
    let id = Uuid::nil();
    let wrapped = Backend(Error::DuplicatePerson(id));
    assert!(matches!(
      core_cause(&wrapped),
      Some(Error::DuplicatePerson(found)) if *found == id
    ));
    assert!(matches!(core_cause(&Error::EmptyName), Some(Error::EmptyName)));

    let io = std::io::Error::other("disk full");
    assert!(core_cause(&io).is_none());
  }

  #[test]
  fn unrelated_errors_have_no_hint() {
    assert_eq!(schema_hint("connection refused"), None);
    assert_eq!(schema_hint("UNIQUE constraint failed: people.person_id"), None);
  }
}
