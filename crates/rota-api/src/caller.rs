//! The [`Caller`] extractor: who is making the request, and which scope the
//! request reads and writes.

use axum::{extract::FromRequestParts, http::request::Parts};
use rota_core::{identity::Identity, store::Scope};

use crate::{ApiState, error::ApiError};

/// The authenticated account behind a request.
#[derive(Debug, Clone)]
pub struct Caller {
  pub identity: Identity,
  pub scope:    Scope,
}

impl Caller {
  /// Only administrators may add or remove people.
  pub fn require_admin(&self) -> Result<(), ApiError> {
    if self.identity.can_edit_roster() {
      Ok(())
    } else {
      Err(ApiError::Forbidden(format!(
        "{} is not allowed to change the roster",
        self.identity.username
      )))
    }
  }
}

impl<S> FromRequestParts<ApiState<S>> for Caller
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let identity = parts
      .extensions
      .get::<Identity>()
      .cloned()
      .ok_or(ApiError::Unauthorized)?;
    let scope = state.tenancy.scope_for(&identity);
    Ok(Self { identity, scope })
  }
}
