//! Form pane: one list row per focusable element, with inline errors.

use kiosk_core::{
  draft::{ChildField, Field},
  message::MessageKey,
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span, Text},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::{
  app::{App, Focus},
  i18n::{message, t},
};

const LABEL_WIDTH: usize = 28;

/// Render the form into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(format!(" {} ", t(app.locale, "form.title")))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let focused = app.focused();
  let items: Vec<ListItem> = app
    .focus_order()
    .into_iter()
    .map(|row| ListItem::new(row_text(app, row, row == focused)))
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.focus));

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
      .highlight_symbol("▸ "),
    area,
    &mut state,
  );
}

fn row_text(app: &App, row: Focus, focused: bool) -> Text<'static> {
  let locale = app.locale;
  let draft = app.form.draft();
  let errors = app.form.errors();

  let mut lines = Vec::new();
  let (label, value, error) = match row {
    Focus::Field(field) => (
      t(locale, &format!("form.{}", field.as_str())).to_owned(),
      input(draft.text(field).unwrap_or_default(), focused),
      errors.get(field),
    ),
    Focus::AddressToggle => {
      let key = if app.form.address_open() { "form.removeAddress" } else { "form.addAddress" };
      (format!("[ {} ]", t(locale, key)), String::new(), None)
    }
    Focus::AddressSearch => (
      t(locale, "form.addressSearch").to_owned(),
      input(&app.address_query, focused),
      None,
    ),
    Focus::Child(i, field) => {
      if field == ChildField::FirstName {
        lines.push(Line::from(Span::styled(
          format!("{} {}", t(locale, "form.child"), i + 1),
          Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        )));
      }
      let child = &draft.children[i];
      let value = if field == ChildField::Gender {
        format!("‹ {} ›", t(locale, &format!("gender.{}", child.gender.as_str())))
      } else {
        input(child.get(field), focused)
      };
      (
        format!("  {}", t(locale, &format!("form.{}", field.as_str()))),
        value,
        errors.child(i, field),
      )
    }
    Focus::RemoveChild(_) => (format!("  [ {} ]", t(locale, "form.removeChild")), String::new(), None),
    Focus::AddChild => (
      format!("[ {} ] {}/{}", t(locale, "form.addChild"), draft.children.len(), kiosk_core::draft::MAX_CHILDREN),
      String::new(),
      errors.get(Field::Children),
    ),
    Focus::Agree => {
      let mark = if draft.agree { "x" } else { " " };
      (format!("[{mark}] {}", t(locale, "form.agree")), String::new(), errors.get(Field::Agree))
    }
    Focus::ClearSignature => (
      format!("[ {} ]", t(locale, "form.clearSignature")),
      String::new(),
      errors.get(Field::Signature),
    ),
    Focus::Submit => (
      format!("[ {} ]", t(locale, "form.submit")),
      String::new(),
      errors.get(Field::BranchCode),
    ),
  };

  let label_style = if error.is_some() {
    Style::default().fg(Color::Red)
  } else {
    Style::default()
  };
  lines.push(Line::from(vec![
    Span::styled(format!("{label:<LABEL_WIDTH$}"), label_style),
    Span::raw(value),
  ]));
  if let Some(key) = error {
    lines.push(error_line(app, key));
  }
  Text::from(lines)
}

/// A text input's contents, with a cursor block while focused.
fn input(value: &str, focused: bool) -> String {
  if focused { format!("{value}▏") } else { value.to_owned() }
}

fn error_line(app: &App, key: MessageKey) -> Line<'static> {
  Line::from(Span::styled(
    format!("  {}", message(app.locale, key)),
    Style::default().fg(Color::Red),
  ))
}
