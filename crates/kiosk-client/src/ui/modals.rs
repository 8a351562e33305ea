//! Overlays: submission progress and result, the branch prompt and the idle
//! countdown. At most one is drawn; the countdown wins.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{
  app::App,
  i18n::{message, t},
  idle::IdleState,
  submit::Modal,
};

pub fn draw(f: &mut Frame, app: &App) {
  if let IdleState::Warning { remaining } = app.idle.state() {
    draw_idle(f, app, remaining);
  } else if app.pairing.is_prompting() {
    draw_branch_prompt(f, app);
  } else {
    draw_submission(f, app);
  }
}

/// A rectangle of at most `width` x `height` centred in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(height.min(area.height))])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Length(width.min(area.width))])
    .flex(Flex::Center)
    .areas(row);
  cell
}

fn dialog(f: &mut Frame, width: u16, height: u16, title: &str, colour: Color) -> Rect {
  let area = centered(f.area(), width, height);
  let block = Block::default()
    .title(Span::styled(
      format!(" {title} "),
      Style::default().fg(colour).add_modifier(Modifier::BOLD),
    ))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(colour));
  let inner = block.inner(area);
  f.render_widget(Clear, area);
  f.render_widget(block, area);
  inner
}

// ─── Idle ─────────────────────────────────────────────────────────────────────

fn draw_idle(f: &mut Frame, app: &App, remaining: u32) {
  let locale = app.locale;
  let inner = dialog(f, 50, 7, t(locale, "idle.title"), Color::Yellow);
  let lines = vec![
    Line::from(format!(
      "{} {remaining} {}",
      t(locale, "idle.message"),
      t(locale, "idle.seconds")
    )),
    Line::from(""),
    Line::from(Span::styled(
      format!("[ {} ]", t(locale, "idle.continue")),
      Style::default().add_modifier(Modifier::BOLD),
    )),
  ];
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

// ─── Branch prompt ────────────────────────────────────────────────────────────

fn draw_branch_prompt(f: &mut Frame, app: &App) {
  let locale = app.locale;
  let inner = dialog(f, 60, 16, t(locale, "branch.title"), Color::Cyan);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(2), // prompt
      Constraint::Length(1), // filter
      Constraint::Min(0),    // list
    ])
    .split(inner);

  f.render_widget(
    Paragraph::new(t(locale, "branch.prompt")).wrap(Wrap { trim: true }),
    rows[0],
  );
  f.render_widget(
    Paragraph::new(format!("{}: {}_", t(locale, "branch.filter"), app.pairing.filter()))
      .style(Style::default().fg(Color::Yellow)),
    rows[1],
  );

  let filtered = app.pairing.filtered();
  if filtered.is_empty() {
    f.render_widget(
      Paragraph::new(t(locale, "branch.none")).style(Style::default().fg(Color::DarkGray)),
      rows[2],
    );
    return;
  }

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|b| {
      ListItem::new(Line::from(vec![
        Span::styled(format!("{:<6}", b.code), Style::default().fg(Color::Cyan)),
        Span::raw(b.name.clone()),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.pairing.cursor()));
  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    rows[2],
    &mut state,
  );
}

// ─── Submission ───────────────────────────────────────────────────────────────

fn draw_submission(f: &mut Frame, app: &App) {
  let locale = app.locale;
  match app.submit.modal() {
    Modal::Closed => {}
    Modal::Loading => {
      let inner = dialog(f, 44, 6, t(locale, "modal.subscribing"), Color::Cyan);
      let lines = vec![
        Line::from(t(locale, "modal.processing")),
        Line::from(Span::styled(t(locale, "modal.pleaseWait"), Style::default().fg(Color::DarkGray))),
      ];
      f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }
    Modal::Success { .. } => {
      let inner = dialog(f, 44, 6, t(locale, "modal.success"), Color::Green);
      let lines = vec![
        Line::from(t(locale, "modal.successMessage")),
        Line::from(""),
        Line::from(format!("[ {} ]", t(locale, "modal.close"))),
      ];
      f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }
    Modal::Error(keys) => {
      let height = u16::try_from(keys.len()).unwrap_or(u16::MAX).saturating_add(5);
      let inner = dialog(f, 56, height, t(locale, "modal.error"), Color::Red);
      let mut lines: Vec<Line> = keys
        .iter()
        .map(|k| Line::from(format!("• {}", message(locale, *k))))
        .collect();
      lines.push(Line::from(""));
      lines.push(Line::from(format!("[ {} ]", t(locale, "modal.close"))));
      f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }
  }
}
