//! Client-side roster state with optimistic writes.
//!
//! A [`RosterSession`] owns the people and assignments a client is showing.
//! Every mutation is applied to that local state first and then sent to the
//! [`RosterStore`]. The mutation reports an [`Outcome`]: either the write was
//! confirmed, or local state may have diverged and must be reconciled.
//! [`RosterSession::settle`] performs the only recovery there is: re-fetch
//! everything from the store and overwrite local state. There is no retry and
//! no queued replay.
//!
//! The session lives between an [`AuthEvent::SignedIn`] and the next
//! [`AuthEvent::SignedOut`]; while signed out it holds no data and rejects
//! every operation with [`Error::SignedOut`].

use uuid::Uuid;

use crate::{
  Error, Result,
  assignment::{Assignment, AssignmentChange},
  error::schema_hint,
  identity::{AuthEvent, Identity, Tenancy},
  person::Person,
  reconcile::{apply_assignment, clear_occupant, merge_confirmed},
  store::{RosterStore, Scope},
};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The result of sending an optimistic change to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "pass the outcome to `RosterSession::settle`"]
pub enum Outcome {
  /// The store accepted the write; local state matches it.
  Confirmed,
  /// The store rejected the write or could not be reached. Local state shows
  /// a change that may not exist remotely.
  Reconcile {
    reason: String,
    /// Remediation for the administrator when the failure looks like a
    /// schema mismatch.
    hint:   Option<&'static str>,
  },
}

impl Outcome {
  fn from_error(err: &dyn std::error::Error) -> Self {
    let reason = err.to_string();
    let hint = schema_hint(&reason);
    Self::Reconcile { reason, hint }
  }

  pub fn is_confirmed(&self) -> bool { matches!(self, Self::Confirmed) }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Explicit application state for one signed-in client.
pub struct RosterSession<S> {
  store:       S,
  tenancy:     Tenancy,
  identity:    Option<Identity>,
  people:      Vec<Person>,
  assignments: Vec<Assignment>,
}

impl<S: RosterStore> RosterSession<S> {
  /// A signed-out session over `store`.
  pub fn new(store: S, tenancy: Tenancy) -> Self {
    Self {
      store,
      tenancy,
      identity: None,
      people: Vec::new(),
      assignments: Vec::new(),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn identity(&self) -> Option<&Identity> { self.identity.as_ref() }

  pub fn people(&self) -> &[Person] { &self.people }

  pub fn assignments(&self) -> &[Assignment] { &self.assignments }

  pub fn person(&self, id: Uuid) -> Option<&Person> {
    self.people.iter().find(|p| p.id == id)
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// React to a session-change notification. Signing in loads the scope's
  /// data; signing out discards all local state.
  pub async fn handle_auth_event(&mut self, event: AuthEvent) -> Result<()> {
    match event {
      AuthEvent::SignedIn(identity) => {
        tracing::info!(user = %identity.username, "session started");
        self.identity = Some(identity);
        self.people.clear();
        self.assignments.clear();
        self.refresh().await
      }
      AuthEvent::SignedOut => {
        if let Some(identity) = self.identity.take() {
          tracing::info!(user = %identity.username, "session ended");
        }
        self.people.clear();
        self.assignments.clear();
        Ok(())
      }
    }
  }

  fn scope(&self) -> Result<Scope> {
    self
      .identity
      .as_ref()
      .map(|identity| self.tenancy.scope_for(identity))
      .ok_or(Error::SignedOut)
  }

  /// The scope for a roster mutation; only administrators get one.
  fn roster_scope(&self) -> Result<Scope> {
    let identity = self.identity.as_ref().ok_or(Error::SignedOut)?;
    if !identity.can_edit_roster() {
      return Err(Error::Forbidden(identity.username.clone()));
    }
    Ok(self.tenancy.scope_for(identity))
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Replace local state with the store's. On failure local state is left
  /// as it was and the error is returned; nothing is retried.
  pub async fn refresh(&mut self) -> Result<()> {
    let scope = self.scope()?;

    let people = self
      .store
      .list_people(scope.clone())
      .await
      .map_err(|e| {
        tracing::error!(error = %e, "failed to load people");
        Error::store(e)
      })?;

    let assignments = self
      .store
      .list_assignments(scope, None)
      .await
      .map_err(|e| {
        tracing::error!(error = %e, "failed to load assignments");
        Error::store(e)
      })?;

    tracing::debug!(
      people = people.len(),
      assignments = assignments.len(),
      "roster refreshed"
    );
    self.people = people;
    self.assignments = assignments;
    Ok(())
  }

  /// Re-fetch authoritative state if `outcome` asks for it.
  pub async fn settle(&mut self, outcome: Outcome) -> Result<()> {
    match outcome {
      Outcome::Confirmed => Ok(()),
      Outcome::Reconcile { reason, .. } => {
        tracing::info!(%reason, "reconciling with store");
        self.refresh().await
      }
    }
  }

  // ── Roster ────────────────────────────────────────────────────────────

  /// Add a person named `name` (trimmed; blank names are rejected).
  pub async fn add_person(&mut self, name: &str) -> Result<(Person, Outcome)> {
    let scope = self.roster_scope()?;
    let person = Person::new(name)?;

    self.people.push(person.clone());

    let outcome = match self.store.insert_person(scope, person.clone()).await {
      Ok(_) => Outcome::Confirmed,
      Err(e) => {
        tracing::warn!(error = %e, person = %person.id, "failed to save person");
        Outcome::from_error(&e)
      }
    };
    Ok((person, outcome))
  }

  /// Remove a person and clear every slot they occupy.
  pub async fn remove_person(&mut self, id: Uuid) -> Result<Outcome> {
    let scope = self.roster_scope()?;

    self.people.retain(|p| p.id != id);
    self.assignments = clear_occupant(&self.assignments, id);

    let outcome = match self.store.delete_person(scope, id).await {
      Ok(existed) => {
        if !existed {
          tracing::debug!(person = %id, "person was already gone");
        }
        Outcome::Confirmed
      }
      Err(e) => {
        tracing::warn!(error = %e, person = %id, "failed to delete person");
        Outcome::from_error(&e)
      }
    };
    Ok(outcome)
  }

  // ── Assignments ───────────────────────────────────────────────────────

  /// Set (or clear) one slot of one (date, period).
  pub async fn assign(&mut self, change: AssignmentChange) -> Result<Outcome> {
    let scope = self.scope()?;

    self.assignments = apply_assignment(&self.assignments, &change);

    let outcome = match self.store.upsert_assignment(scope, change.clone()).await
    {
      Ok(stored) => {
        self.assignments = merge_confirmed(&self.assignments, stored);
        Outcome::Confirmed
      }
      Err(e) => {
        tracing::warn!(
          error = %e,
          date = %change.date,
          period = %change.period,
          "failed to save assignment"
        );
        Outcome::from_error(&e)
      }
    };
    Ok(outcome)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  };

  use chrono::NaiveDate;

  use super::*;
  use crate::{
    assignment::{Period, Slot},
    calendar::YearMonth,
  };

  // ─── In-memory store with injectable write failures ───────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("{0}")]
  struct Injected(&'static str);

  #[derive(Default)]
  struct MemoryStore {
    people:      Mutex<Vec<(Scope, Person)>>,
    assignments: Mutex<Vec<(Scope, Assignment)>>,
    fail_writes: AtomicBool,
    fail_reads:  AtomicBool,
  }

  impl MemoryStore {
    fn check_write(&self) -> Result<(), Injected> {
      if self.fail_writes.load(Ordering::SeqCst) {
        return Err(Injected("no such table: assignments"));
      }
      Ok(())
    }

    fn check_read(&self) -> Result<(), Injected> {
      if self.fail_reads.load(Ordering::SeqCst) {
        return Err(Injected("connection reset"));
      }
      Ok(())
    }
  }

  impl RosterStore for MemoryStore {
    type Error = Injected;

    async fn list_people(&self, scope: Scope) -> Result<Vec<Person>, Injected> {
      self.check_read()?;
      let mut people: Vec<Person> = self
        .people
        .lock()
        .unwrap()
        .iter()
        .filter(|(s, _)| *s == scope)
        .map(|(_, p)| p.clone())
        .collect();
      people.sort_by_key(|p| p.name.to_lowercase());
      Ok(people)
    }

    async fn insert_person(
      &self,
      scope: Scope,
      person: Person,
    ) -> Result<Person, Injected> {
      self.check_write()?;
      self.people.lock().unwrap().push((scope, person.clone()));
      Ok(person)
    }

    async fn delete_person(&self, scope: Scope, id: Uuid) -> Result<bool, Injected> {
      self.check_write()?;
      let mut people = self.people.lock().unwrap();
      let before = people.len();
      people.retain(|(s, p)| !(*s == scope && p.id == id));
      let existed = people.len() != before;
      for (s, a) in self.assignments.lock().unwrap().iter_mut() {
        if *s == scope {
          *a = clear_occupant(std::slice::from_ref(a), id).remove(0);
        }
      }
      Ok(existed)
    }

    async fn list_assignments(
      &self,
      scope: Scope,
      month: Option<YearMonth>,
    ) -> Result<Vec<Assignment>, Injected> {
      self.check_read()?;
      Ok(
        self
          .assignments
          .lock()
          .unwrap()
          .iter()
          .filter(|(s, a)| *s == scope && month.is_none_or(|m| m.contains(a.date)))
          .map(|(_, a)| a.clone())
          .collect(),
      )
    }

    async fn upsert_assignment(
      &self,
      scope: Scope,
      change: AssignmentChange,
    ) -> Result<Assignment, Injected> {
      self.check_write()?;
      let mut rows = self.assignments.lock().unwrap();
      if let Some((_, a)) = rows
        .iter_mut()
        .find(|(s, a)| *s == scope && a.is_for(change.date, change.period))
      {
        a.set_occupant(change.slot, change.occupant);
        return Ok(a.clone());
      }
      let created = Assignment::from_change(&change);
      rows.push((scope, created.clone()));
      Ok(created)
    }
  }

  fn admin() -> Identity {
    Identity { username: "admin".into(), admin: true }
  }

  fn jan4() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 1, 4).unwrap() }

  async fn signed_in() -> RosterSession<MemoryStore> {
    let mut session = RosterSession::new(MemoryStore::default(), Tenancy::Shared);
    session
      .handle_auth_event(AuthEvent::SignedIn(admin()))
      .await
      .unwrap();
    session
  }

  // ─── Lifecycle ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn signed_out_session_rejects_everything() {
    let mut session = RosterSession::new(MemoryStore::default(), Tenancy::Shared);
    assert!(matches!(session.refresh().await, Err(Error::SignedOut)));
    assert!(matches!(session.add_person("Ana").await, Err(Error::SignedOut)));
    let change = AssignmentChange {
      date:     jan4(),
      period:   Period::Morning,
      slot:     Slot::First,
      occupant: None,
    };
    assert!(matches!(session.assign(change).await, Err(Error::SignedOut)));
  }

  #[tokio::test]
  async fn sign_out_discards_state() {
    let mut session = signed_in().await;
    let (_, outcome) = session.add_person("Ana").await.unwrap();
    assert!(outcome.is_confirmed());

    session.handle_auth_event(AuthEvent::SignedOut).await.unwrap();
    assert!(session.identity().is_none());
    assert!(session.people().is_empty());

    session
      .handle_auth_event(AuthEvent::SignedIn(admin()))
      .await
      .unwrap();
    assert_eq!(session.people().len(), 1);
  }

  #[tokio::test]
  async fn per_account_tenancy_isolates_rosters() {
    let mut session =
      RosterSession::new(MemoryStore::default(), Tenancy::PerAccount);
    session
      .handle_auth_event(AuthEvent::SignedIn(admin()))
      .await
      .unwrap();
    let _ = session.add_person("Ana").await.unwrap();

    let other = Identity { username: "other".into(), admin: true };
    session
      .handle_auth_event(AuthEvent::SignedIn(other))
      .await
      .unwrap();
    assert!(session.people().is_empty());
  }

  // ─── Roster ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_person_is_visible_immediately() {
    let mut session = signed_in().await;
    let (person, outcome) = session.add_person("  Ana  ").await.unwrap();
    assert_eq!(outcome, Outcome::Confirmed);
    assert_eq!(person.name, "Ana");
    assert_eq!(session.people(), &[person]);
  }

  #[tokio::test]
  async fn blank_name_changes_nothing() {
    let mut session = signed_in().await;
    assert!(matches!(session.add_person("  ").await, Err(Error::EmptyName)));
    assert!(session.people().is_empty());
  }

  #[tokio::test]
  async fn non_admin_cannot_edit_roster() {
    let mut session = RosterSession::new(MemoryStore::default(), Tenancy::Shared);
    let viewer = Identity { username: "viewer".into(), admin: false };
    session
      .handle_auth_event(AuthEvent::SignedIn(viewer))
      .await
      .unwrap();
    assert!(matches!(
      session.add_person("Ana").await,
      Err(Error::Forbidden(u)) if u == "viewer"
    ));
    assert!(matches!(
      session.remove_person(Uuid::new_v4()).await,
      Err(Error::Forbidden(_))
    ));
  }

  #[tokio::test]
  async fn failed_insert_is_rolled_back_by_refetch() {
    let mut session = signed_in().await;
    session.store().fail_writes.store(true, Ordering::SeqCst);

    let (_, outcome) = session.add_person("Ana").await.unwrap();
    assert_eq!(session.people().len(), 1, "optimistic entry is visible");
    let Outcome::Reconcile { hint, .. } = &outcome else {
      panic!("expected reconcile, got {outcome:?}");
    };
    assert!(hint.is_some(), "missing-table failures carry a hint");

    session.settle(outcome).await.unwrap();
    assert!(session.people().is_empty());
  }

  #[tokio::test]
  async fn remove_person_clears_their_slots() {
    let mut session = signed_in().await;
    let (ana, _) = session.add_person("Ana").await.unwrap();
    let (bia, _) = session.add_person("Bia").await.unwrap();
    for (slot, who) in [(Slot::First, ana.id), (Slot::Second, bia.id)] {
      let outcome = session
        .assign(AssignmentChange {
          date: jan4(),
          period: Period::Morning,
          slot,
          occupant: Some(who),
        })
        .await
        .unwrap();
      assert!(outcome.is_confirmed());
    }

    let outcome = session.remove_person(ana.id).await.unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(session.people(), &[bia.clone()]);
    assert_eq!(session.assignments()[0].slot1, None);
    assert_eq!(session.assignments()[0].slot2, Some(bia.id));

    session.refresh().await.unwrap();
    assert_eq!(session.assignments()[0].slot1, None);
  }

  #[tokio::test]
  async fn failed_delete_restores_person() {
    let mut session = signed_in().await;
    let (ana, _) = session.add_person("Ana").await.unwrap();
    session.store().fail_writes.store(true, Ordering::SeqCst);

    let outcome = session.remove_person(ana.id).await.unwrap();
    assert!(session.people().is_empty());
    session.settle(outcome).await.unwrap();
    assert_eq!(session.people(), &[ana]);
  }

  // ─── Assignments ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn two_slots_make_one_record() {
    let mut session = signed_in().await;
    let (alice, _) = session.add_person("Alice").await.unwrap();
    let (bob, _) = session.add_person("Bob").await.unwrap();

    let first = session
      .assign(AssignmentChange {
        date:     jan4(),
        period:   Period::Morning,
        slot:     Slot::First,
        occupant: Some(alice.id),
      })
      .await
      .unwrap();
    let second = session
      .assign(AssignmentChange {
        date:     jan4(),
        period:   Period::Morning,
        slot:     Slot::Second,
        occupant: Some(bob.id),
      })
      .await
      .unwrap();
    assert!(first.is_confirmed() && second.is_confirmed());

    let expected = Assignment {
      date:   jan4(),
      period: Period::Morning,
      slot1:  Some(alice.id),
      slot2:  Some(bob.id),
    };
    assert_eq!(session.assignments(), &[expected.clone()]);

    session.refresh().await.unwrap();
    assert_eq!(session.assignments(), &[expected]);
  }

  #[tokio::test]
  async fn failed_upsert_reverts_to_store_state() {
    let mut session = signed_in().await;
    let (alice, _) = session.add_person("Alice").await.unwrap();
    session.store().fail_writes.store(true, Ordering::SeqCst);

    let outcome = session
      .assign(AssignmentChange {
        date:     jan4(),
        period:   Period::Evening,
        slot:     Slot::First,
        occupant: Some(alice.id),
      })
      .await
      .unwrap();
    assert_eq!(session.assignments().len(), 1);
    assert!(!outcome.is_confirmed());

    session.settle(outcome).await.unwrap();
    assert!(session.assignments().is_empty());
  }

  #[tokio::test]
  async fn failed_refetch_keeps_local_state() {
    let mut session = signed_in().await;
    let (_, _) = session.add_person("Ana").await.unwrap();
    session.store().fail_reads.store(true, Ordering::SeqCst);

    assert!(matches!(session.refresh().await, Err(Error::Store(_))));
    assert_eq!(session.people().len(), 1);
  }
}
