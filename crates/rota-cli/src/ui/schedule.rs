//! Schedule tab: one row per (day, period) of the shown month, plus the
//! person picker overlay.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState},
};
use rota_core::{assignment::Slot, calendar::ServiceDay, store::RosterStore};

use crate::app::{App, Mode};

/// Render the schedule into `area`.
pub fn draw<S: RosterStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let block = Block::default()
    .title(format!(" {} ", app.month))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let cursor = Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD);

  let rows: Vec<Row> = app
    .rows
    .iter()
    .enumerate()
    .map(|(i, row)| {
      let day = match row.weekday {
        ServiceDay::Sunday => "Sun",
        ServiceDay::Wednesday => "Wed",
      };
      let slot_cell = |slot: Slot| {
        let text = app.occupant_name(row, slot).unwrap_or("—").to_string();
        let style = if i == app.row_cursor && app.slot == slot {
          cursor
        } else {
          Style::default()
        };
        Cell::from(text).style(style)
      };
      Row::new(vec![
        Cell::from(format!("{day} {}", row.date.format("%d/%m"))),
        Cell::from(row.period.to_string()).style(Style::default().fg(Color::Cyan)),
        slot_cell(Slot::First),
        slot_cell(Slot::Second),
      ])
    })
    .collect();

  if rows.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No service days this month.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let header = Row::new(vec!["Day", "Period", "Slot 1", "Slot 2"])
    .style(Style::default().add_modifier(Modifier::BOLD));
  let table = Table::new(rows, [
    Constraint::Length(10),
    Constraint::Length(9),
    Constraint::Percentage(40),
    Constraint::Percentage(40),
  ])
  .header(header)
  .block(block);

  let mut state = TableState::default();
  state.select(Some(app.row_cursor));
  f.render_stateful_widget(table, area, &mut state);

  if let Mode::Picking { filter, cursor } = &app.mode {
    draw_picker(f, area, app, filter, *cursor);
  }
}

fn draw_picker<S: RosterStore>(
  f: &mut Frame,
  area: Rect,
  app: &App<S>,
  filter: &str,
  cursor: usize,
) {
  let popup = super::centered(area, 40, 14);
  f.render_widget(Clear, popup);

  let title = match app.cursor_row() {
    Some(row) => format!(
      " {} {} · slot {} ",
      row.date.format("%d/%m"),
      row.period,
      u8::from(app.slot)
    ),
    None => " Pick ".into(),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));
  let mut inner = block.inner(popup);
  f.render_widget(block, popup);

  let matches = app.picker_matches(filter);
  let filter_area = Rect { height: 1, ..inner };
  inner.y += 1;
  inner.height = inner.height.saturating_sub(1);
  f.render_widget(
    Paragraph::new(Line::from(vec![
      Span::raw("/"),
      Span::styled(format!("{filter}_"), Style::default().fg(Color::Yellow)),
    ])),
    filter_area,
  );

  let items: Vec<ListItem> = matches
    .iter()
    .map(|p| ListItem::new(p.name.clone()))
    .collect();
  let mut state = ListState::default();
  state.select((!matches.is_empty()).then_some(cursor));
  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}
