//! Team tab: the roster.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use rota_core::store::RosterStore;

use crate::app::{App, Mode};

/// Render the roster into `area`.
pub fn draw<S: RosterStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let people = app.people();

  let block = Block::default()
    .title(format!(" Team ({}) ", people.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if people.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    let hint = if app.is_admin() {
      "Nobody on the roster yet. Press a to add someone."
    } else {
      "Nobody on the roster yet."
    };
    f.render_widget(
      Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
  } else {
    // Shifts each person holds across every loaded month.
    let items: Vec<ListItem> = people
      .iter()
      .map(|p| {
        let shifts = app
          .session
          .assignments()
          .iter()
          .filter(|a| a.holds(p.id))
          .count();
        ListItem::new(Line::from(vec![
          Span::raw(p.name.clone()),
          Span::styled(
            format!("  {shifts} shift{}", if shifts == 1 { "" } else { "s" }),
            Style::default().fg(Color::DarkGray),
          ),
        ]))
      })
      .collect();

    let mut state = ListState::default();
    state.select(Some(app.team_cursor));
    f.render_stateful_widget(
      List::new(items).block(block).highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
      area,
      &mut state,
    );
  }

  match &app.mode {
    Mode::Adding { name } => {
      draw_prompt(f, area, " Add person ", &format!("{name}_"), Color::Yellow);
    }
    Mode::ConfirmRemove(id) => {
      let name = app.session.person(*id).map(|p| p.name.as_str()).unwrap_or("?");
      draw_prompt(
        f,
        area,
        " Remove person ",
        &format!("Remove {name} and clear their shifts? (y/n)"),
        Color::Red,
      );
    }
    _ => {}
  }
}

fn draw_prompt(f: &mut Frame, area: Rect, title: &str, text: &str, color: Color) {
  let popup = super::centered(area, 50, 3);
  f.render_widget(Clear, popup);
  f.render_widget(
    Paragraph::new(text.to_string()).block(
      Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color)),
    ),
    popup,
  );
}
