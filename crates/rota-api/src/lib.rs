//! JSON REST API for the roster.
//!
//! Exposes an axum [`Router`] backed by any [`rota_core::store::RosterStore`].
//! Authentication, TLS and transport are the caller's responsibility: the
//! router expects an
//! [`Identity`](rota_core::identity::Identity) in the request extensions and answers `401`
//! without one.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rota_api::api_router(store.clone(), Tenancy::Shared))
//! ```

pub mod assignments;
pub mod calendar;
pub mod caller;
pub mod error;
pub mod people;
pub mod session;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get},
};
use rota_core::{identity::Tenancy, store::RosterStore};

pub use caller::Caller;
pub use error::ApiError;

/// Shared handler state: the backend and the rule mapping callers to scopes.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub tenancy: Tenancy,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), tenancy: self.tenancy }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, tenancy: Tenancy) -> Router<()>
where
  S: RosterStore + 'static,
{
  Router::new()
    .route("/session", get(session::get::<S>))
    // People
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route("/people/{id}", delete(people::remove::<S>))
    // Assignments
    .route(
      "/assignments",
      get(assignments::list::<S>).put(assignments::upsert::<S>),
    )
    // Calendar
    .route("/shift-days", get(calendar::shift_days))
    .with_state(ApiState { store, tenancy })
}
