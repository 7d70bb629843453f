//! TUI rendering: orchestrates all panes.

pub mod schedule;
pub mod team;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph, Tabs},
};
use rota_core::store::RosterStore;

use crate::app::{App, Mode, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: RosterStore>(f: &mut Frame, app: &App<S>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.tab {
    Tab::Schedule => schedule::draw(f, rows[1], app),
    Tab::Team => team::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S: RosterStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(0), Constraint::Length(40)])
    .split(inner);

  let selected = match app.tab {
    Tab::Schedule => 0,
    Tab::Team => 1,
  };
  let tabs = Tabs::new(vec![" 1 Schedule ", " 2 Team "])
    .select(selected)
    .style(Style::default().fg(Color::Gray))
    .highlight_style(
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    )
    .divider("");
  f.render_widget(tabs, cols[0]);

  let user = app
    .session
    .identity()
    .map(|i| {
      if i.admin {
        format!("{} (admin)", i.username)
      } else {
        i.username.clone()
      }
    })
    .unwrap_or_else(|| "signed out".into());
  let date = Local::now().format("%Y-%m-%d");
  let right = Line::from(Span::styled(
    format!("{user}  {date} "),
    Style::default().fg(Color::Gray),
  ))
  .right_aligned();
  f.render_widget(Paragraph::new(right), cols[1]);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: RosterStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = match (&app.mode, app.tab) {
    (Mode::Picking { .. }, _) => ("PICK", "Type to filter  ↑↓ choose  Enter assign  Esc cancel"),
    (Mode::Adding { .. }, _) => ("ADD", "Type a name  Enter save  Esc cancel"),
    (Mode::ConfirmRemove(_), _) => ("REMOVE", "y confirm  any other key cancels"),
    (Mode::Normal, Tab::Schedule) => (
      "SCHEDULE",
      "↑↓/jk row  ←→/hl slot  [ ] month  t today  Enter pick  x clear  r refresh  O sign out  q quit",
    ),
    (Mode::Normal, Tab::Team) => (
      "TEAM",
      "↑↓/jk move  a add  d remove  r refresh  Tab schedule  O sign out  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

/// A centred rectangle `width` columns wide and `height` rows tall.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}
