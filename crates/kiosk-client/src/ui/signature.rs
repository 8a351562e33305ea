//! Signature pane: the drawing surface fed by mouse strokes.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  text::Span,
  widgets::Paragraph,
};

use super::pad_block;
use crate::{app::App, i18n::t, signature::{Point, to_cell}};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let title_style = if app.form.errors().get(kiosk_core::draft::Field::Signature).is_some() {
    Style::default().fg(Color::Red)
  } else {
    Style::default()
  };
  let block = pad_block().title(Span::styled(
    format!(" {} ", t(app.locale, "form.signature")),
    title_style,
  ));
  let inner = block.inner(area);
  f.render_widget(block, area);

  if app.form.pad().is_empty() {
    f.render_widget(
      Paragraph::new(t(app.locale, "form.signatureHint")).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let buf = f.buffer_mut();
  for stroke in app.form.pad().strokes() {
    let mut prev: Option<Point> = None;
    for &p in stroke {
      let from = prev.unwrap_or(p);
      for (x, y) in segment(inner, from, p) {
        if let Some(cell) = buf.cell_mut((x, y)) {
          cell.set_symbol("•").set_fg(Color::White);
        }
      }
      prev = Some(p);
    }
  }
}

/// Cells covered by the straight segment from `a` to `b`.
fn segment(area: Rect, a: Point, b: Point) -> Vec<(u16, u16)> {
  let (ax, ay) = to_cell(area, a);
  let (bx, by) = to_cell(area, b);
  let steps = ax.abs_diff(bx).max(ay.abs_diff(by)).max(1);
  (0..=steps)
    .map(|i| {
      let s = f32::from(i) / f32::from(steps);
      let p = Point { x: a.x + (b.x - a.x) * s, y: a.y + (b.y - a.y) * s };
      to_cell(area, p)
    })
    .collect()
}
