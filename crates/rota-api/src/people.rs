//! Handlers for `/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people` | Ordered by name |
//! | `POST`   | `/people` | Body: `{"name":"Ana"}`, optional `"id"`; admin only |
//! | `DELETE` | `/people/{id}` | 404 if absent; admin only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rota_core::{person::Person, store::RosterStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, caller::Caller, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /people`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: RosterStore,
{
  let people = state
    .store
    .list_people(caller.scope)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(people))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
  /// Client-chosen id; generated when absent.
  #[serde(default)]
  pub id:   Option<Uuid>,
}

/// `POST /people`: body: `{"name":"Ana"}`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  caller.require_admin()?;

  let person = match body.id {
    Some(id) => Person::with_id(id, &body.name)?,
    None => Person::new(&body.name)?,
  };

  let person = state
    .store
    .insert_person(caller.scope, person)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(by = %caller.identity.username, person = %person.id, "person added");
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /people/{id}`: also clears the person from every slot.
pub async fn remove<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore,
{
  caller.require_admin()?;

  let deleted = state
    .store
    .delete_person(caller.scope, id)
    .await
    .map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound(format!("person {id} not found")));
  }

  tracing::info!(by = %caller.identity.username, person = %id, "person removed");
  Ok(StatusCode::NO_CONTENT)
}
