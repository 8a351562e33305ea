//! The on-screen signature pad.
//!
//! Strokes are kept in pad-relative coordinates (`0.0..=1.0` on both axes) so
//! a resize never distorts what was already drawn. The pad renders to an SVG
//! image and is stored on the draft as a base64 `data:` URL.

use std::io::{self, Cursor};

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use quick_xml::{
  Writer,
  events::{BytesEnd, BytesStart, Event},
};
use ratatui::layout::Rect;

/// Logical size of the exported image.
const EXPORT_WIDTH: f32 = 600.0;
const EXPORT_HEIGHT: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  pub x: f32,
  pub y: f32,
}

// ─── Pad ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SignaturePad {
  strokes: Vec<Vec<Point>>,
  drawing: bool,
}

impl SignaturePad {
  pub fn begin(&mut self, p: Point) {
    self.strokes.push(vec![p]);
    self.drawing = true;
  }

  pub fn extend(&mut self, p: Point) {
    if !self.drawing {
      return;
    }
    if let Some(stroke) = self.strokes.last_mut()
      && stroke.last() != Some(&p)
    {
      stroke.push(p);
    }
  }

  pub fn end(&mut self) { self.drawing = false; }

  pub fn clear(&mut self) {
    self.strokes.clear();
    self.drawing = false;
  }

  pub fn is_empty(&self) -> bool { self.strokes.is_empty() }

  pub fn is_drawing(&self) -> bool { self.drawing }

  pub fn strokes(&self) -> &[Vec<Point>] { &self.strokes }

  /// The pad as an SVG document.
  pub fn to_svg(&self) -> io::Result<Vec<u8>> {
    let mut w = Writer::new(Cursor::new(Vec::new()));

    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    let view_box = format!("0 0 {EXPORT_WIDTH} {EXPORT_HEIGHT}");
    svg.push_attribute(("viewBox", view_box.as_str()));
    w.write_event(Event::Start(svg))?;

    for stroke in &self.strokes {
      let mut path = BytesStart::new("path");
      let d = path_data(stroke);
      path.push_attribute(("d", d.as_str()));
      path.push_attribute(("fill", "none"));
      path.push_attribute(("stroke", "black"));
      path.push_attribute(("stroke-width", "2"));
      path.push_attribute(("stroke-linecap", "round"));
      w.write_event(Event::Empty(path))?;
    }

    w.write_event(Event::End(BytesEnd::new("svg")))?;
    Ok(w.into_inner().into_inner())
  }

  /// The pad as a `data:` URL, or an empty string when nothing is drawn.
  pub fn to_data_url(&self) -> io::Result<String> {
    if self.is_empty() {
      return Ok(String::new());
    }
    Ok(format!("data:image/svg+xml;base64,{}", B64.encode(self.to_svg()?)))
  }
}

fn path_data(stroke: &[Point]) -> String {
  let mut d = String::new();
  for (i, p) in stroke.iter().enumerate() {
    let cmd = if i == 0 { 'M' } else { 'L' };
    d.push_str(&format!(
      "{cmd}{:.1} {:.1} ",
      p.x * EXPORT_WIDTH,
      p.y * EXPORT_HEIGHT
    ));
  }
  // A single tap still leaves a visible dot.
  if stroke.len() == 1 {
    d.push_str("l0.1 0");
  }
  d.trim_end().to_owned()
}

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Map a terminal cell inside `area` to pad coordinates. Cells outside the
/// area give `None`.
pub fn normalize(area: Rect, column: u16, row: u16) -> Option<Point> {
  if area.width == 0
    || area.height == 0
    || column < area.x
    || row < area.y
    || column >= area.x + area.width
    || row >= area.y + area.height
  {
    return None;
  }
  // Cell centres, so the first and last cells are not glued to the edges.
  Some(Point {
    x: (f32::from(column - area.x) + 0.5) / f32::from(area.width),
    y: (f32::from(row - area.y) + 0.5) / f32::from(area.height),
  })
}

/// Map a pad point back to a cell in `area`.
pub fn to_cell(area: Rect, p: Point) -> (u16, u16) {
  let col = (p.x * f32::from(area.width)).floor() as u16;
  let row = (p.y * f32::from(area.height)).floor() as u16;
  (
    area.x + col.min(area.width.saturating_sub(1)),
    area.y + row.min(area.height.saturating_sub(1)),
  )
}

// ─── Resize throttle ─────────────────────────────────────────────────────────

/// Coalesces resize notifications so the pad is re-measured at most once per
/// rendered frame.
#[derive(Debug)]
pub struct ResizeThrottle {
  pending: bool,
}

impl Default for ResizeThrottle {
  fn default() -> Self { Self::new() }
}

impl ResizeThrottle {
  /// Start out pending so the first frame measures the pad.
  pub fn new() -> Self { Self { pending: true } }

  pub fn request(&mut self) { self.pending = true; }

  /// Called once per frame; `true` means re-measure now.
  pub fn take(&mut self) -> bool { std::mem::take(&mut self.pending) }
}
