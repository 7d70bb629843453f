//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Extension, Router,
  body::Body,
  http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use rota_core::identity::{Identity, Tenancy};
use rota_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

fn admin() -> Identity { Identity { username: "ana".into(), admin: true } }

fn member(name: &str) -> Identity {
  Identity { username: name.into(), admin: false }
}

async fn app(tenancy: Tenancy) -> (Arc<SqliteStore>, Router<()>) {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  (Arc::clone(&store), api_router(store, tenancy))
}

async fn send(
  app: &Router<()>,
  who: Option<Identity>,
  method: Method,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let app = match who {
    Some(identity) => app.clone().layer(Extension(identity)),
    None => app.clone(),
  };

  let builder = Request::builder().method(method).uri(uri);
  let request = match body {
    Some(v) => builder
      .header(CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string())),
    None => builder.body(Body::empty()),
  }
  .unwrap();

  let response = app.oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn add_person(app: &Router<()>, name: &str) -> String {
  let (status, body) = send(
    app,
    Some(admin()),
    Method::POST,
    "/people",
    Some(json!({ "name": name })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body["id"].as_str().unwrap().to_owned()
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_identity_is_unauthorized() {
  let (_, app) = app(Tenancy::Shared).await;
  let (status, body) = send(&app, None, Method::GET, "/people", None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn session_echoes_identity_and_tenancy() {
  let (_, app) = app(Tenancy::PerAccount).await;
  let (status, body) =
    send(&app, Some(member("bia")), Method::GET, "/session", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body,
    json!({ "username": "bia", "admin": false, "tenancy": "per_account" })
  );
}

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_adds_and_lists_people() {
  let (_, app) = app(Tenancy::Shared).await;
  add_person(&app, "  Bruno  ").await;
  add_person(&app, "ana").await;

  let (status, body) =
    send(&app, Some(member("bia")), Method::GET, "/people", None).await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<&str> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["ana", "Bruno"]);
}

#[tokio::test]
async fn blank_name_is_a_bad_request() {
  let (_, app) = app(Tenancy::Shared).await;
  let (status, _) = send(
    &app,
    Some(admin()),
    Method::POST,
    "/people",
    Some(json!({ "name": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_id_is_a_conflict() {
  let (_, app) = app(Tenancy::Shared).await;
  let id = add_person(&app, "Ana").await;
  let (status, _) = send(
    &app,
    Some(admin()),
    Method::POST,
    "/people",
    Some(json!({ "name": "Ana again", "id": id })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn non_admin_cannot_change_the_roster() {
  let (_, app) = app(Tenancy::Shared).await;
  let id = add_person(&app, "Ana").await;

  let (status, _) = send(
    &app,
    Some(member("bia")),
    Method::POST,
    "/people",
    Some(json!({ "name": "Caio" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &app,
    Some(member("bia")),
    Method::DELETE,
    &format!("/people/{id}"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn removing_a_person_clears_their_slots() {
  let (_, app) = app(Tenancy::Shared).await;
  let id = add_person(&app, "Ana").await;
  send(
    &app,
    Some(admin()),
    Method::PUT,
    "/assignments",
    Some(json!({ "date": "2026-01-04", "period": "MORNING", "slot": 1, "occupant": id })),
  )
  .await;

  let (status, _) = send(
    &app,
    Some(admin()),
    Method::DELETE,
    &format!("/people/{id}"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, body) =
    send(&app, Some(admin()), Method::GET, "/assignments", None).await;
  assert_eq!(body[0]["slot1"], Value::Null);

  let (status, _) = send(
    &app,
    Some(admin()),
    Method::DELETE,
    &format!("/people/{id}"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Assignments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn members_fill_both_slots_of_one_record() {
  let (_, app) = app(Tenancy::Shared).await;
  let alice = add_person(&app, "Alice").await;
  let bob = add_person(&app, "Bob").await;
  let who = Some(member("bia"));

  for (slot, id) in [(1, &alice), (2, &bob)] {
    let (status, _) = send(
      &app,
      who.clone(),
      Method::PUT,
      "/assignments",
      Some(json!({ "date": "2026-01-04", "period": "MORNING", "slot": slot, "occupant": id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  let (_, body) =
    send(&app, who, Method::GET, "/assignments?year=2026&month=0", None).await;
  assert_eq!(
    body,
    json!([{ "date": "2026-01-04", "period": "MORNING", "slot1": alice, "slot2": bob }])
  );
}

#[tokio::test]
async fn five_digit_year_assignment_stays_readable() {
  let (_, app) = app(Tenancy::Shared).await;
  let alice = add_person(&app, "Alice").await;

  // A Sunday, so the morning shift applies.
  let (status, body) = send(
    &app,
    Some(admin()),
    Method::PUT,
    "/assignments",
    Some(json!({ "date": "+10000-01-02", "period": "MORNING", "slot": 1, "occupant": alice })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["date"], "+10000-01-02");

  for uri in ["/assignments", "/assignments?year=10000&month=0"] {
    let (status, body) = send(&app, Some(admin()), Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK, "{uri}");
    assert_eq!(body[0]["slot1"], alice.as_str(), "{uri}");
  }
}

#[tokio::test]
async fn period_must_apply_on_the_date() {
  let (_, app) = app(Tenancy::Shared).await;
  for (date, period) in [("2026-01-07", "MORNING"), ("2026-01-05", "EVENING")] {
    let (status, _) = send(
      &app,
      Some(admin()),
      Method::PUT,
      "/assignments",
      Some(json!({ "date": date, "period": period, "slot": 1, "occupant": null })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{date} {period}");
  }
}

#[tokio::test]
async fn occupant_must_be_on_the_roster() {
  let (_, app) = app(Tenancy::Shared).await;
  let (status, body) = send(
    &app,
    Some(admin()),
    Method::PUT,
    "/assignments",
    Some(json!({
      "date": "2026-01-07",
      "period": "EVENING",
      "slot": 2,
      "occupant": "00000000-0000-4000-8000-000000000000"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("not on the roster"));
}

#[tokio::test]
async fn half_a_month_filter_is_rejected() {
  let (_, app) = app(Tenancy::Shared).await;
  let (status, _) =
    send(&app, Some(admin()), Method::GET, "/assignments?year=2026", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &app,
    Some(admin()),
    Method::GET,
    "/assignments?year=2026&month=12",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn per_account_tenancy_separates_rosters() {
  let (_, app) = app(Tenancy::PerAccount).await;
  let ana = Identity { username: "ana".into(), admin: true };
  let caio = Identity { username: "caio".into(), admin: true };

  send(
    &app,
    Some(ana.clone()),
    Method::POST,
    "/people",
    Some(json!({ "name": "Alice" })),
  )
  .await;

  let (_, mine) = send(&app, Some(ana), Method::GET, "/people", None).await;
  let (_, theirs) = send(&app, Some(caio), Method::GET, "/people", None).await;
  assert_eq!(mine.as_array().unwrap().len(), 1);
  assert!(theirs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn person_id_taken_by_another_account_is_a_conflict() {
  let (_, app) = app(Tenancy::PerAccount).await;
  let ana = Identity { username: "ana".into(), admin: true };
  let caio = Identity { username: "caio".into(), admin: true };
  let id = uuid::Uuid::new_v4();

  let (status, _) = send(
    &app,
    Some(ana),
    Method::POST,
    "/people",
    Some(json!({ "name": "Alice", "id": id })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) = send(
    &app,
    Some(caio.clone()),
    Method::POST,
    "/people",
    Some(json!({ "name": "Alice", "id": id })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("already exists"));

  let (_, theirs) = send(&app, Some(caio), Method::GET, "/people", None).await;
  assert!(theirs.as_array().unwrap().is_empty());
}

// ─── Calendar ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn shift_days_for_january_2026() {
  let (_, app) = app(Tenancy::Shared).await;
  let (status, body) = send(
    &app,
    Some(member("bia")),
    Method::GET,
    "/shift-days?year=2026&month=0",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "January");
  assert_eq!(body["transitioned"], false);

  let dates: Vec<&str> = body["days"]
    .as_array()
    .unwrap()
    .iter()
    .map(|d| d["date"].as_str().unwrap())
    .collect();
  assert_eq!(
    dates,
    vec![
      "2026-01-04", "2026-01-07", "2026-01-11", "2026-01-14", "2026-01-18",
      "2026-01-21", "2026-01-25", "2026-01-28",
    ]
  );
  assert_eq!(body["days"][0]["periods"], json!(["MORNING", "EVENING"]));
  assert_eq!(body["days"][1]["periods"], json!(["EVENING"]));
}

#[tokio::test]
async fn shift_days_default_to_a_target_month() {
  let (_, app) = app(Tenancy::Shared).await;
  let (status, body) =
    send(&app, Some(member("bia")), Method::GET, "/shift-days", None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["month"].as_u64().unwrap() <= 11);
}
