//! HTTP server for the roster: Basic authentication in front of the JSON API.
//!
//! | Path | Auth | Notes |
//! |------|------|-------|
//! | `/health` | none | Liveness probe |
//! | `/api/…` | Basic | [`rota_api::api_router`] |

pub mod auth;
pub mod error;

pub use error::Error;

use std::{collections::HashSet, path::PathBuf, sync::Arc};

use argon2::PasswordHash;
use axum::{Router, middleware, routing::get};
use rota_core::{identity::Tenancy, store::RosterStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{Account, AuthConfig, require_identity};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROTA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub tenancy:    Tenancy,
  #[serde(default)]
  pub accounts:   Vec<Account>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("rota.db") }

impl ServerConfig {
  /// Reject configurations nobody could sign in to.
  pub fn validate(&self) -> Result<(), Error> {
    if self.accounts.is_empty() {
      return Err(Error::Config("no accounts configured".into()));
    }

    let mut seen = HashSet::new();
    for account in &self.accounts {
      if !seen.insert(account.username.as_str()) {
        return Err(Error::Config(format!(
          "duplicate account {:?}",
          account.username
        )));
      }
      if account.username.contains(':') {
        return Err(Error::Config(format!(
          "account name {:?} must not contain ':'",
          account.username
        )));
      }
      PasswordHash::new(&account.password_hash).map_err(|e| {
        Error::Config(format!(
          "password hash for {:?} is not a PHC string: {e}",
          account.username
        ))
      })?;
    }
    Ok(())
  }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig { accounts: self.accounts.clone() }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router is built from.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
      auth:   Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RosterStore + 'static,
{
  let api = rota_api::api_router(Arc::clone(&state.store), state.config.tenancy)
    .layer(middleware::from_fn_with_state(
      Arc::clone(&state.auth),
      require_identity,
    ));

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }
