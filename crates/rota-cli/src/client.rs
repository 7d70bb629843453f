//! Async HTTP client wrapping the roster JSON API.
//!
//! [`ApiClient`] implements [`RosterStore`] so a
//! [`RosterSession`](rota_core::session::RosterSession) can drive the server
//! directly. The server derives the scope from the signed-in account, so the
//! `scope` argument of every trait method is ignored here.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rota_core::{
  assignment::{Assignment, AssignmentChange},
  calendar::YearMonth,
  identity::{Identity, Tenancy},
  person::Person,
  store::{RosterStore, Scope},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

/// Errors talking to the roster server.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("server answered {status}: {message}")]
  Status {
    status:  StatusCode,
    message: String,
  },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Connection settings for the roster API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// `GET /api/session` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
  #[serde(flatten)]
  pub identity: Identity,
  #[serde(default)]
  pub tenancy:  Tenancy,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Serialize)]
struct NewPerson<'a> {
  id:   Uuid,
  name: &'a str,
}

/// Async HTTP client for the roster JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Turn a non-success response into [`ClientError::Status`], keeping the
  /// server's error message so schema-mismatch wording survives the trip.
  async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body: Option<ErrorBody> = resp.json().await.ok();
    let message = match body {
      Some(b) => b.error,
      None => status.canonical_reason().unwrap_or("error").to_string(),
    };
    Err(ClientError::Status { status, message })
  }

  async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let resp = self.auth(req).send().await?;
    Ok(Self::check(resp).await?.json().await?)
  }

  /// `GET /api/session`: who the configured credentials sign in as.
  pub async fn session(&self) -> Result<SessionInfo> {
    self.fetch(self.client.get(self.url("/session"))).await
  }
}

impl RosterStore for ApiClient {
  type Error = ClientError;

  /// `GET /api/people`
  async fn list_people(&self, _scope: Scope) -> Result<Vec<Person>> {
    self.fetch(self.client.get(self.url("/people"))).await
  }

  /// `POST /api/people`
  async fn insert_person(&self, _scope: Scope, person: Person) -> Result<Person> {
    let body = NewPerson { id: person.id, name: &person.name };
    self
      .fetch(self.client.post(self.url("/people")).json(&body))
      .await
  }

  /// `DELETE /api/people/{id}`
  async fn delete_person(&self, _scope: Scope, id: Uuid) -> Result<bool> {
    let resp = self
      .auth(self.client.delete(self.url(&format!("/people/{id}"))))
      .send()
      .await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    Self::check(resp).await?;
    Ok(true)
  }

  /// `GET /api/assignments[?year=&month=]`
  async fn list_assignments(
    &self,
    _scope: Scope,
    month: Option<YearMonth>,
  ) -> Result<Vec<Assignment>> {
    let mut req = self.client.get(self.url("/assignments"));
    if let Some(m) = month {
      req = req.query(&[("year", m.year.to_string()), ("month", m.month.to_string())]);
    }
    self.fetch(req).await
  }

  /// `PUT /api/assignments`
  async fn upsert_assignment(
    &self,
    _scope: Scope,
    change: AssignmentChange,
  ) -> Result<Assignment> {
    self
      .fetch(self.client.put(self.url("/assignments")).json(&change))
      .await
  }
}
