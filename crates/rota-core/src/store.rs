//! The `RosterStore` trait and the [`Scope`] that partitions stored data.
//!
//! The trait is implemented by storage backends (e.g. `rota-store-sqlite`) and
//! by remote clients (the `rota` terminal client speaks to the JSON API
//! through it). [`RosterSession`](crate::session::RosterSession) depends on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  assignment::{Assignment, AssignmentChange},
  calendar::YearMonth,
  person::Person,
};

// ─── Scope ───────────────────────────────────────────────────────────────────

/// The owner key that people and assignments are stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "owner", rename_all = "snake_case")]
pub enum Scope {
  /// Data visible to every account.
  #[default]
  Shared,
  /// Data owned by one account.
  Owner(String),
}

impl Scope {
  pub fn owner(&self) -> Option<&str> {
    match self {
      Self::Shared => None,
      Self::Owner(name) => Some(name),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a roster backend.
///
/// Backends enforce that at most one assignment exists per
/// (scope, date, period) and apply [`RosterStore::upsert_assignment`]
/// atomically. Concurrent writers are last-write-wins; there is no
/// concurrency token.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// All people in `scope`, ordered by name (case-insensitive).
  fn list_people(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Persist a person under `scope`. Returns an error if the id is taken.
  fn insert_person(
    &self,
    scope: Scope,
    person: Person,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Delete a person by id and clear them from every assignment slot in
  /// `scope`. Returns `false` if no such person existed.
  fn delete_person(
    &self,
    scope: Scope,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Assignments ───────────────────────────────────────────────────────

  /// All assignments in `scope`, optionally restricted to one month, ordered
  /// by date then period.
  fn list_assignments(
    &self,
    scope: Scope,
    month: Option<YearMonth>,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  /// Insert the (date, period) assignment if absent, otherwise update only
  /// the requested slot. Returns the stored record after the write.
  fn upsert_assignment(
    &self,
    scope: Scope,
    change: AssignmentChange,
  ) -> impl Future<Output = Result<Assignment, Self::Error>> + Send + '_;
}
