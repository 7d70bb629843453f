//! Application state machine and event dispatcher.

use chrono::{NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use rota_core::{
  assignment::{Assignment, AssignmentChange, Period, Slot},
  calendar::{ServiceDay, YearMonth, target_month},
  error::schema_hint,
  identity::AuthEvent,
  person::Person,
  reconcile::find,
  session::{Outcome, RosterSession},
  store::RosterStore,
};
use uuid::Uuid;

// ─── Tabs and modes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  /// The month's shifts and who fills them.
  Schedule,
  /// The roster of people.
  Team,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  /// Choosing an occupant for the selected slot.
  Picking { filter: String, cursor: usize },
  /// Typing a new person's name.
  Adding { name: String },
  /// Waiting for `y` before removing a person.
  ConfirmRemove(Uuid),
}

// ─── Schedule rows ────────────────────────────────────────────────────────────

/// One line of the schedule: a service day and one of its periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRow {
  pub date:    NaiveDate,
  pub weekday: ServiceDay,
  pub period:  Period,
}

/// Every (day, period) of `month`, in calendar order.
pub fn schedule_rows(month: YearMonth) -> Vec<ScheduleRow> {
  month
    .shift_days()
    .into_iter()
    .flat_map(|day| {
      let (date, weekday) = (day.date, day.weekday);
      day
        .periods
        .into_iter()
        .map(move |period| ScheduleRow { date, weekday, period })
    })
    .collect()
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S> {
  /// Roster data and the optimistic write path.
  pub session: RosterSession<S>,

  pub tab:  Tab,
  pub mode: Mode,

  /// The month shown on the schedule tab.
  pub month: YearMonth,

  /// The month the schedule opened on; `t` jumps back to it.
  home: YearMonth,

  /// Rows for `month`, derived once per month change.
  pub rows: Vec<ScheduleRow>,

  /// Cursor within `rows`.
  pub row_cursor: usize,

  /// Which of the two slots the cursor is on.
  pub slot: Slot,

  /// Cursor within the name-ordered roster.
  pub team_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl<S: RosterStore> App<S> {
  /// Open on the month the schedule should show at `now`.
  pub fn new(session: RosterSession<S>, now: NaiveDateTime) -> Self {
    let target = target_month(now);
    let status_msg = if target.transitioned {
      format!("{} has closed; showing {}", target.month.offset(-1), target.month)
    } else {
      String::new()
    };

    Self {
      session,
      tab: Tab::Schedule,
      mode: Mode::Normal,
      month: target.month,
      home: target.month,
      rows: schedule_rows(target.month),
      row_cursor: 0,
      slot: Slot::First,
      team_cursor: 0,
      status_msg,
    }
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  /// The roster ordered by name, case-insensitively.
  pub fn people(&self) -> Vec<&Person> {
    let mut people: Vec<&Person> = self.session.people().iter().collect();
    people.sort_by_cached_key(|p| p.name.to_lowercase());
    people
  }

  pub fn assignment(&self, row: &ScheduleRow) -> Option<&Assignment> {
    find(self.session.assignments(), row.date, row.period)
  }

  /// Display name of whoever fills `slot` on `row`.
  pub fn occupant_name(&self, row: &ScheduleRow, slot: Slot) -> Option<&str> {
    let id = self.assignment(row)?.occupant(slot)?;
    Some(
      self
        .session
        .person(id)
        .map(|p| p.name.as_str())
        .unwrap_or("(removed)"),
    )
  }

  pub fn cursor_row(&self) -> Option<ScheduleRow> {
    self.rows.get(self.row_cursor).copied()
  }

  pub fn cursor_person(&self) -> Option<&Person> {
    self.people().get(self.team_cursor).copied()
  }

  /// People matching the picker's filter.
  pub fn picker_matches(&self, filter: &str) -> Vec<&Person> {
    let people = self.people();
    if filter.is_empty() {
      return people;
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &Person)> = people
      .into_iter()
      .filter_map(|p| matcher.fuzzy_match(&p.name, filter).map(|s| (s, p)))
      .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, p)| p).collect()
  }

  pub fn is_admin(&self) -> bool {
    self
      .session
      .identity()
      .is_some_and(|identity| identity.can_edit_roster())
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.mode.clone() {
      Mode::Picking { filter, cursor } => self.handle_picker_key(key, filter, cursor).await,
      Mode::Adding { name } => self.handle_adding_key(key, name).await,
      Mode::ConfirmRemove(id) => self.handle_confirm_key(key, id).await,
      Mode::Normal => self.handle_normal_key(key).await,
    }
  }

  async fn handle_normal_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Char('O') => {
        self.session.handle_auth_event(AuthEvent::SignedOut).await?;
        return Ok(false);
      }
      KeyCode::Tab => {
        self.tab = match self.tab {
          Tab::Schedule => Tab::Team,
          Tab::Team => Tab::Schedule,
        };
      }
      KeyCode::Char('1') => self.tab = Tab::Schedule,
      KeyCode::Char('2') => self.tab = Tab::Team,
      KeyCode::Char('r') => self.refresh().await,
      _ => match self.tab {
        Tab::Schedule => self.handle_schedule_key(key).await,
        Tab::Team => self.handle_team_key(key),
      },
    }
    Ok(true)
  }

  async fn handle_schedule_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.row_cursor + 1 < self.rows.len() {
          self.row_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.row_cursor = self.row_cursor.saturating_sub(1);
      }
      KeyCode::Left | KeyCode::Char('h') => self.slot = Slot::First,
      KeyCode::Right | KeyCode::Char('l') => self.slot = Slot::Second,
      KeyCode::Char(']') | KeyCode::PageDown => self.show_month(self.month.offset(1)),
      KeyCode::Char('[') | KeyCode::PageUp => self.show_month(self.month.offset(-1)),
      KeyCode::Char('t') => self.show_month(self.home),
      KeyCode::Enter => {
        if self.cursor_row().is_some() {
          self.mode = Mode::Picking { filter: String::new(), cursor: 0 };
        }
      }
      KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
        self.assign_cursor(None).await;
      }
      _ => {}
    }
  }

  fn handle_team_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.team_cursor + 1 < self.session.people().len() {
          self.team_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.team_cursor = self.team_cursor.saturating_sub(1);
      }
      KeyCode::Char('a') => self.mode = Mode::Adding { name: String::new() },
      KeyCode::Char('d') | KeyCode::Delete => {
        if let Some(id) = self.cursor_person().map(|p| p.id) {
          self.mode = Mode::ConfirmRemove(id);
        }
      }
      _ => {}
    }
  }

  async fn handle_picker_key(
    &mut self,
    key: KeyEvent,
    mut filter: String,
    mut cursor: usize,
  ) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        return Ok(true);
      }
      KeyCode::Enter => {
        let picked = self.picker_matches(&filter).get(cursor).map(|p| p.id);
        self.mode = Mode::Normal;
        if picked.is_some() {
          self.assign_cursor(picked).await;
        }
        return Ok(true);
      }
      KeyCode::Down => {
        if cursor + 1 < self.picker_matches(&filter).len() {
          cursor += 1;
        }
      }
      KeyCode::Up => cursor = cursor.saturating_sub(1),
      KeyCode::Backspace => {
        filter.pop();
        cursor = 0;
      }
      KeyCode::Char(c) => {
        filter.push(c);
        cursor = 0;
      }
      _ => {}
    }
    self.mode = Mode::Picking { filter, cursor };
    Ok(true)
  }

  async fn handle_adding_key(
    &mut self,
    key: KeyEvent,
    mut name: String,
  ) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        return Ok(true);
      }
      KeyCode::Enter => {
        self.mode = Mode::Normal;
        self.add_person(&name).await;
        return Ok(true);
      }
      KeyCode::Backspace => {
        name.pop();
      }
      KeyCode::Char(c) => name.push(c),
      _ => {}
    }
    self.mode = Mode::Adding { name };
    Ok(true)
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent, id: Uuid) -> anyhow::Result<bool> {
    self.mode = Mode::Normal;
    if key.code == KeyCode::Char('y') {
      self.remove_person(id).await;
    } else {
      self.status_msg = "Removal cancelled".into();
    }
    Ok(true)
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  fn show_month(&mut self, month: YearMonth) {
    self.month = month;
    self.rows = schedule_rows(month);
    self.row_cursor = 0;
  }

  /// Reload everything from the server.
  pub async fn refresh(&mut self) {
    self.status_msg = match self.session.refresh().await {
      Ok(()) => "Refreshed".into(),
      Err(e) => error_status(&e),
    };
    self.clamp_team_cursor();
  }

  async fn assign_cursor(&mut self, occupant: Option<Uuid>) {
    let Some(row) = self.cursor_row() else { return };
    let change = AssignmentChange {
      date: row.date,
      period: row.period,
      slot: self.slot,
      occupant,
    };
    let done = match occupant.and_then(|id| self.session.person(id)) {
      Some(p) => format!("{} assigned to {} {}", p.name, row.date, row.period),
      None => format!("Cleared {} {} slot {}", row.date, row.period, u8::from(self.slot)),
    };
    let result = self.session.assign(change).await;
    self.report(result, done).await;
  }

  async fn add_person(&mut self, name: &str) {
    match self.session.add_person(name).await {
      Ok((person, outcome)) => {
        self.report(Ok(outcome), format!("Added {}", person.name)).await;
      }
      Err(e) => self.status_msg = error_status(&e),
    }
  }

  async fn remove_person(&mut self, id: Uuid) {
    let name = self
      .session
      .person(id)
      .map(|p| p.name.clone())
      .unwrap_or_else(|| id.to_string());
    let result = self.session.remove_person(id).await;
    self.report(result, format!("Removed {name}")).await;
    self.clamp_team_cursor();
  }

  /// Show how a mutation ended, re-fetching when the server may disagree.
  async fn report(&mut self, result: rota_core::Result<Outcome>, done: String) {
    match result {
      Ok(Outcome::Confirmed) => self.status_msg = done,
      Ok(outcome) => {
        let failure = describe(&outcome);
        self.status_msg = match self.session.settle(outcome).await {
          Ok(()) => format!("{failure}; reloaded from server"),
          Err(e) => format!("{failure}; reload failed: {e}"),
        };
      }
      Err(e) => self.status_msg = error_status(&e),
    }
  }

  fn clamp_team_cursor(&mut self) {
    let len = self.session.people().len();
    self.team_cursor = self.team_cursor.min(len.saturating_sub(1));
  }
}

fn describe(outcome: &Outcome) -> String {
  match outcome {
    Outcome::Confirmed => "Saved".into(),
    Outcome::Reconcile { reason, hint: Some(hint) } => {
      format!("Not saved: {reason} ({hint})")
    }
    Outcome::Reconcile { reason, hint: None } => format!("Not saved: {reason}"),
  }
}

fn error_status(err: &rota_core::Error) -> String {
  let message = err.to_string();
  match schema_hint(&message) {
    Some(hint) => format!("Error: {message} ({hint})"),
    None => format!("Error: {message}"),
  }
}

#[cfg(test)]
mod tests {
  use rota_core::identity::{Identity, Tenancy};
  use rota_store_sqlite::SqliteStore;

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn noon(d: NaiveDate) -> NaiveDateTime { d.and_hms_opt(12, 0, 0).unwrap() }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  async fn app_as(admin: bool) -> App<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut session = RosterSession::new(store, Tenancy::Shared);
    session
      .handle_auth_event(AuthEvent::SignedIn(Identity {
        username: "ana".into(),
        admin,
      }))
      .await
      .unwrap();
    App::new(session, noon(date(2026, 1, 10)))
  }

  async fn press(app: &mut App<SqliteStore>, codes: &[KeyCode]) -> bool {
    let mut running = true;
    for code in codes {
      running = app.handle_key(key(*code)).await.unwrap();
    }
    running
  }

  async fn type_text(app: &mut App<SqliteStore>, text: &str) {
    for c in text.chars() {
      app.handle_key(key(KeyCode::Char(c))).await.unwrap();
    }
  }

  async fn add(app: &mut App<SqliteStore>, name: &str) -> Uuid {
    let (person, outcome) = app.session.add_person(name).await.unwrap();
    assert!(outcome.is_confirmed());
    person.id
  }

  #[test]
  fn january_2026_has_twelve_rows() {
    let rows = schedule_rows(YearMonth::new(2026, 0).unwrap());
    assert_eq!(rows.len(), 12);
    assert_eq!(
      rows[..3]
        .iter()
        .map(|r| (r.date, r.period))
        .collect::<Vec<_>>(),
      vec![
        (date(2026, 1, 4), Period::Morning),
        (date(2026, 1, 4), Period::Evening),
        (date(2026, 1, 7), Period::Evening),
      ]
    );
    assert_eq!(rows[2].weekday, ServiceDay::Wednesday);
  }

  #[tokio::test]
  async fn opens_on_the_next_month_after_rollover() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let session = RosterSession::new(store, Tenancy::Shared);
    let late = date(2026, 1, 31).and_hms_opt(19, 0, 0).unwrap();
    let app = App::new(session, late);
    assert_eq!(app.month, YearMonth::new(2026, 1).unwrap());
    assert!(app.status_msg.contains("February 2026"));
  }

  #[tokio::test]
  async fn month_navigation_rolls_years() {
    let mut app = app_as(false).await;
    press(&mut app, &[KeyCode::Char(']')]).await;
    assert_eq!(app.month, YearMonth::new(2026, 1).unwrap());
    press(&mut app, &[KeyCode::Char('['), KeyCode::Char('['), KeyCode::Char('[')]).await;
    assert_eq!(app.month, YearMonth::new(2025, 10).unwrap());
    press(&mut app, &[KeyCode::Char('t')]).await;
    assert_eq!(app.month, YearMonth::new(2026, 0).unwrap());
    assert_eq!(app.row_cursor, 0);
  }

  #[tokio::test]
  async fn picking_fills_both_slots_of_one_record() {
    let mut app = app_as(true).await;
    let alice = add(&mut app, "Alice").await;
    let bob = add(&mut app, "Bob").await;

    press(&mut app, &[KeyCode::Enter]).await;
    type_text(&mut app, "bo").await;
    press(&mut app, &[KeyCode::Enter]).await;

    press(&mut app, &[KeyCode::Right, KeyCode::Enter]).await;
    type_text(&mut app, "ali").await;
    press(&mut app, &[KeyCode::Enter]).await;

    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(
      app.session.assignments(),
      &[Assignment {
        date:   date(2026, 1, 4),
        period: Period::Morning,
        slot1:  Some(bob),
        slot2:  Some(alice),
      }]
    );
    let row = app.rows[0];
    assert_eq!(app.occupant_name(&row, Slot::First), Some("Bob"));
  }

  #[tokio::test]
  async fn picker_escape_changes_nothing() {
    let mut app = app_as(true).await;
    add(&mut app, "Alice").await;
    press(&mut app, &[KeyCode::Enter, KeyCode::Char('a'), KeyCode::Esc]).await;
    assert_eq!(app.mode, Mode::Normal);
    assert!(app.session.assignments().is_empty());
  }

  #[tokio::test]
  async fn clearing_a_slot_keeps_the_other() {
    let mut app = app_as(true).await;
    let alice = add(&mut app, "Alice").await;
    let bob = add(&mut app, "Bob").await;
    for (slot, id) in [(Slot::First, alice), (Slot::Second, bob)] {
      let outcome = app
        .session
        .assign(AssignmentChange {
          date: date(2026, 1, 4),
          period: Period::Morning,
          slot,
          occupant: Some(id),
        })
        .await
        .unwrap();
      assert!(outcome.is_confirmed());
    }

    press(&mut app, &[KeyCode::Char('x')]).await;
    let a = &app.session.assignments()[0];
    assert_eq!((a.slot1, a.slot2), (None, Some(bob)));
  }

  #[tokio::test]
  async fn team_tab_adds_and_removes_people() {
    let mut app = app_as(true).await;
    press(&mut app, &[KeyCode::Char('2'), KeyCode::Char('a')]).await;
    type_text(&mut app, "  Carla ").await;
    press(&mut app, &[KeyCode::Enter]).await;
    assert_eq!(app.status_msg, "Added Carla");
    assert_eq!(app.people()[0].name, "Carla");

    press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('n')]).await;
    assert_eq!(app.session.people().len(), 1);

    press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]).await;
    assert!(app.session.people().is_empty());
    assert_eq!(app.status_msg, "Removed Carla");
  }

  #[tokio::test]
  async fn non_admins_see_an_error_when_adding() {
    let mut app = app_as(false).await;
    press(&mut app, &[KeyCode::Char('2'), KeyCode::Char('a')]).await;
    type_text(&mut app, "Dora").await;
    press(&mut app, &[KeyCode::Enter]).await;
    assert!(app.status_msg.starts_with("Error:"));
    assert!(app.session.people().is_empty());
  }

  #[tokio::test]
  async fn sign_out_clears_the_session_and_quits() {
    let mut app = app_as(true).await;
    add(&mut app, "Alice").await;
    let running = press(&mut app, &[KeyCode::Char('O')]).await;
    assert!(!running);
    assert!(app.session.identity().is_none());
    assert!(app.session.people().is_empty());
  }
}
