//! TUI rendering. Orchestrates the form, the signature pad and the overlays.

pub mod form;
pub mod modals;
pub mod signature;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::{app::App, i18n::t};

// ─── Regions ──────────────────────────────────────────────────────────────────

/// Screen regions for a terminal of a given size.
#[derive(Debug, Clone, Copy)]
pub struct Regions {
  pub header: Rect,
  pub form:   Rect,
  pub pad:    Rect,
  pub help:   Rect,
  pub status: Rect,
}

impl Regions {
  pub fn new(area: Rect) -> Self {
    // Vertical stack: header, body, status bar.
    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // header
        Constraint::Min(0),    // body
        Constraint::Length(1), // status bar
      ])
      .split(area);

    // Form on the left, signature pad and help on the right.
    let cols = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
      .split(rows[1]);

    let right = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(6), Constraint::Length(7)])
      .split(cols[1]);

    Self {
      header: rows[0],
      form:   cols[0],
      pad:    right[0],
      help:   right[1],
      status: rows[2],
    }
  }
}

/// Drawable cells of the signature pad for a terminal of `size`.
pub fn pad_area(size: Rect) -> Rect { pad_block().inner(Regions::new(size).pad) }

pub(crate) fn pad_block() -> Block<'static> {
  Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let regions = Regions::new(f.area());

  draw_header(f, regions.header, app);
  form::draw(f, regions.form, app);
  signature::draw(f, regions.pad, app);
  draw_help(f, regions.help, app);
  draw_status(f, regions.status, app);

  modals::draw(f, app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let left = Span::styled(
    format!(" {}", t(app.locale, "form.title")),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let branch = app
    .client_branch()
    .map(|code| format!("{code} · "))
    .unwrap_or_default();
  let right = Span::styled(
    format!("{branch}{} ", app.locale.code().to_uppercase()),
    Style::default().fg(Color::Gray),
  );

  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Help ─────────────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines: Vec<Line> = ["hint.navigate", "hint.toggle", "hint.submit", "hint.locale", "hint.quit"]
    .into_iter()
    .map(|k| Line::from(Span::styled(t(app.locale, k), Style::default().fg(Color::DarkGray))))
    .collect();
  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let error_count = app.form.errors().to_paths().len();
  let (mode_label, colour) = if error_count > 0 {
    (format!(" {error_count} ! "), Color::Red)
  } else {
    (format!(" {} ", app.locale.code().to_uppercase()), Color::Cyan)
  };

  let status = if app.status_msg.is_empty() {
    format!("{}  {}", t(app.locale, "hint.navigate"), t(app.locale, "hint.submit"))
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    mode_label,
    Style::default()
      .fg(Color::Black)
      .bg(colour)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pad_sits_inside_the_right_column() {
    let size = Rect::new(0, 0, 100, 40);
    let regions = Regions::new(size);
    let pad = pad_area(size);
    assert!(pad.x > regions.form.x + regions.form.width - 1);
    assert!(pad.width > 0 && pad.height > 0);
    assert_eq!(regions.header.height, 1);
    assert_eq!(regions.status.y, 39);
  }
}
