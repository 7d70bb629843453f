//! HTTP Basic-auth verification and the middleware that turns valid
//! credentials into an [`Identity`] for the API.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rota_core::identity::Identity;
use serde::Deserialize;

use crate::error::Error;

/// One account allowed to sign in.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  #[serde(default)]
  pub admin:         bool,
}

/// Credentials accepted as valid for this server instance.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  pub accounts: Vec<Account>,
}

impl AuthConfig {
  fn account(&self, username: &str) -> Option<&Account> {
    self.accounts.iter().find(|a| a.username == username)
  }
}

/// Verify credentials from headers and return the matching identity.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Identity, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let account = config.account(username).ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&account.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(Identity { username: account.username.clone(), admin: account.admin })
}

/// Reject unauthenticated requests; otherwise attach the caller's
/// [`Identity`] to the request extensions.
pub async fn require_identity(
  State(auth): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let identity = verify_auth(req.headers(), &auth).inspect_err(|_| {
    tracing::debug!(path = %req.uri().path(), "rejected credentials");
  })?;
  req.extensions_mut().insert(identity);
  Ok(next.run(req).await)
}
