//! Handlers for `/assignments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/assignments` | Optional `?year=2026&month=0` (zero-based month) |
//! | `PUT`  | `/assignments` | Body: [`AssignmentChange`]; returns the stored record |

use axum::{
  Json,
  extract::{Query, State},
};
use rota_core::{
  assignment::{Assignment, AssignmentChange},
  calendar::{YearMonth, periods_for},
  store::RosterStore,
};
use serde::Deserialize;

use crate::{ApiState, caller::Caller, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
  pub year:  Option<i32>,
  /// Zero-based: `0` is January.
  pub month: Option<u32>,
}

impl MonthParams {
  /// `None` when neither part is given; both must be given together.
  pub fn into_month(self) -> Result<Option<YearMonth>, ApiError> {
    match (self.year, self.month) {
      (Some(year), Some(month)) => Ok(Some(YearMonth::new(year, month)?)),
      (None, None) => Ok(None),
      _ => Err(ApiError::BadRequest(
        "year and month must be given together".into(),
      )),
    }
  }
}

/// `GET /assignments[?year=<y>&month=<m>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
  Query(params): Query<MonthParams>,
) -> Result<Json<Vec<Assignment>>, ApiError>
where
  S: RosterStore,
{
  let month = params.into_month()?;
  let assignments = state
    .store
    .list_assignments(caller.scope, month)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(assignments))
}

// ─── Upsert ───────────────────────────────────────────────────────────────────

/// `PUT /assignments`: sets or clears one slot, leaving the other untouched.
pub async fn upsert<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
  Json(change): Json<AssignmentChange>,
) -> Result<Json<Assignment>, ApiError>
where
  S: RosterStore,
{
  if !periods_for(change.date).contains(&change.period) {
    return Err(ApiError::BadRequest(format!(
      "{} has no {} shift",
      change.date, change.period
    )));
  }

  if let Some(occupant) = change.occupant {
    let people = state
      .store
      .list_people(caller.scope.clone())
      .await
      .map_err(ApiError::store)?;
    if !people.iter().any(|p| p.id == occupant) {
      return Err(ApiError::BadRequest(format!(
        "person {occupant} is not on the roster"
      )));
    }
  }

  let stored = state
    .store
    .upsert_assignment(caller.scope, change)
    .await
    .map_err(ApiError::store)?;

  tracing::debug!(
    by = %caller.identity.username,
    date = %stored.date,
    period = %stored.period,
    "assignment stored"
  );
  Ok(Json(stored))
}
