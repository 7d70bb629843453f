//! Person: a volunteer on the roster.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Identifier of a [`Person`]. Assignment slots refer to people by this id,
/// never by display name.
pub type PersonId = Uuid;

/// A volunteer eligible for assignment. The id never changes once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:   PersonId,
  pub name: String,
}

impl Person {
  /// Create a person with a freshly generated id from a raw, user-typed name.
  pub fn new(raw_name: &str) -> Result<Self> {
    Self::with_id(Uuid::new_v4(), raw_name)
  }

  /// Create a person with a caller-supplied id.
  pub fn with_id(id: PersonId, raw_name: &str) -> Result<Self> {
    Ok(Self { id, name: normalize_name(raw_name)? })
  }
}

/// Trim surrounding whitespace; blank names are rejected.
pub fn normalize_name(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::EmptyName);
  }
  Ok(trimmed.to_owned())
}
