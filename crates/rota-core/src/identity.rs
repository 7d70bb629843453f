//! Signed-in accounts and the tenancy rule that maps them to a [`Scope`].

use serde::{Deserialize, Serialize};

use crate::store::Scope;

/// The account a client or request acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub username: String,
  /// Administrators may add and remove people; everyone may assign.
  #[serde(default)]
  pub admin:    bool,
}

impl Identity {
  pub fn can_edit_roster(&self) -> bool { self.admin }
}

/// How stored data is partitioned between accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenancy {
  /// All accounts read and write one roster.
  #[default]
  Shared,
  /// Every account owns a separate roster and schedule.
  PerAccount,
}

impl Tenancy {
  pub fn scope_for(self, identity: &Identity) -> Scope {
    match self {
      Self::Shared => Scope::Shared,
      Self::PerAccount => Scope::Owner(identity.username.clone()),
    }
  }
}

/// Session-change notification that drives a
/// [`RosterSession`](crate::session::RosterSession)'s lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
  SignedIn(Identity),
  SignedOut,
}
