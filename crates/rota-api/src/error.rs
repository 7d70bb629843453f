//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rota_core::error::schema_hint;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error, surfacing a duplicate person id as a conflict.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match rota_core::core_cause(&err) {
      Some(dup @ rota_core::Error::DuplicatePerson(_)) => {
        ApiError::Conflict(dup.to_string())
      }
      _ => ApiError::Store(Box::new(err)),
    }
  }
}

impl From<rota_core::Error> for ApiError {
  fn from(err: rota_core::Error) -> Self {
    use rota_core::Error as E;
    match err {
      E::PersonNotFound(id) => ApiError::NotFound(format!("person {id} not found")),
      E::DuplicatePerson(_) => ApiError::Conflict(err.to_string()),
      E::SignedOut => ApiError::Unauthorized,
      E::Forbidden(_) => ApiError::Forbidden(err.to_string()),
      E::Store(inner) => ApiError::Store(inner),
      E::EmptyName
      | E::InvalidDate(_)
      | E::UnknownPeriod(_)
      | E::InvalidSlot(_)
      | E::InvalidMonth(_) => ApiError::BadRequest(err.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };

    let body = match schema_hint(&message) {
      Some(hint) => json!({ "error": message, "hint": hint }),
      None => json!({ "error": message }),
    };
    (status, Json(body)).into_response()
  }
}
