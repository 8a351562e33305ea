//! Application state and event dispatcher.
//!
//! All mutation happens here, on the event loop: key and mouse input, clock
//! ticks, and [`NetEvent`]s delivered by spawned network tasks over a channel.

use std::{sync::Arc, time::Instant};

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use kiosk_core::{
  api::KioskCheck,
  branch::BranchSummary,
  draft::{ChildField, Field, Gender},
  message::MessageKey,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::{
  client::ApiClient,
  form::FormController,
  geocode::{Geocoder, Place},
  i18n::{Locale, t},
  idle::{IdleMonitor, IdleState, IdleTick},
  pairing::{PairingFlow, PairingState, PairingStep},
  signature::{ResizeThrottle, normalize},
  submit::{Modal, SubmitPipeline, SubmitReply},
};

// ─── Focus ────────────────────────────────────────────────────────────────────

/// One focusable row of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Field(Field),
  AddressToggle,
  AddressSearch,
  Child(usize, ChildField),
  RemoveChild(usize),
  AddChild,
  Agree,
  ClearSignature,
  Submit,
}

// ─── Network events ──────────────────────────────────────────────────────────

/// Completion of a spawned network task.
#[derive(Debug)]
pub enum NetEvent {
  Branches(anyhow::Result<Vec<BranchSummary>>),
  Checked(anyhow::Result<KioskCheck>),
  Submitted(anyhow::Result<SubmitReply>),
  Geocoded(anyhow::Result<Option<Place>>),
}

// ─── App ──────────────────────────────────────────────────────────────────────

pub struct App {
  pub form:          FormController,
  pub idle:          IdleMonitor,
  pub pairing:       PairingFlow,
  pub submit:        SubmitPipeline,
  pub locale:        Locale,
  /// Index into [`App::focus_order`].
  pub focus:         usize,
  /// Free-text address search input.
  pub address_query: String,
  /// Screen cells of the signature pad, re-measured after resizes.
  pub pad_area:      Rect,
  pub resize:        ResizeThrottle,
  /// One-line status message shown in the status bar.
  pub status_msg:    String,
  client:            Arc<ApiClient>,
  geocoder:          Option<Geocoder>,
  tx:                mpsc::UnboundedSender<NetEvent>,
}

impl App {
  pub fn new(
    client: ApiClient,
    geocoder: Option<Geocoder>,
    locale: Locale,
    tx: mpsc::UnboundedSender<NetEvent>,
  ) -> Self {
    Self {
      form: FormController::new(),
      idle: IdleMonitor::new(),
      pairing: PairingFlow::new(),
      submit: SubmitPipeline::new(),
      locale,
      focus: 0,
      address_query: String::new(),
      pad_area: Rect::default(),
      resize: ResizeThrottle::new(),
      status_msg: String::new(),
      client: Arc::new(client),
      geocoder,
      tx,
    }
  }

  fn today() -> NaiveDate { Local::now().date_naive() }

  /// Branch this kiosk is paired with, as held in the cookie jar.
  pub fn client_branch(&self) -> Option<String> { self.client.paired_branch() }

  // ── Focus ─────────────────────────────────────────────────────────────────

  /// Focusable rows, top to bottom, for the current shape of the form.
  pub fn focus_order(&self) -> Vec<Focus> {
    let mut order = vec![
      Focus::Field(Field::FirstName),
      Focus::Field(Field::LastName),
      Focus::Field(Field::Email),
      Focus::Field(Field::Dob),
      Focus::Field(Field::Phone),
      Focus::AddressToggle,
    ];
    if self.form.address_open() {
      if self.geocoder.is_some() {
        order.push(Focus::AddressSearch);
      }
      order.extend(Field::ADDRESS.map(Focus::Field));
    }
    for i in 0..self.form.draft().children.len() {
      order.extend([
        Focus::Child(i, ChildField::FirstName),
        Focus::Child(i, ChildField::LastName),
        Focus::Child(i, ChildField::Gender),
        Focus::Child(i, ChildField::Dob),
        Focus::RemoveChild(i),
      ]);
    }
    order.extend([Focus::AddChild, Focus::Agree, Focus::ClearSignature, Focus::Submit]);
    order
  }

  pub fn focused(&self) -> Focus {
    let order = self.focus_order();
    order[self.focus.min(order.len() - 1)]
  }

  fn move_focus(&mut self, delta: isize) {
    let len = self.focus_order().len();
    self.focus = self.focus.saturating_add_signed(delta).min(len - 1);
  }

  fn focus_on(&mut self, target: Focus) {
    if let Some(i) = self.focus_order().iter().position(|f| *f == target) {
      self.focus = i;
    }
  }

  // ── Startup ───────────────────────────────────────────────────────────────

  /// Fetch the branch list in the background.
  pub fn load_branches(&self) {
    let client = Arc::clone(&self.client);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let _ = tx.send(NetEvent::Branches(client.branches().await));
    });
  }

  // ── Input ─────────────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    // An interaction while the countdown is up only dismisses it.
    let warning = matches!(self.idle.state(), IdleState::Warning { .. });
    self.idle.on_activity(now);
    if warning {
      return true;
    }

    if key.code == KeyCode::F(2) {
      self.locale = self.locale.next();
      return true;
    }

    if self.submit.is_busy() {
      return true;
    }
    if *self.submit.modal() != Modal::Closed {
      if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        self.submit.dismiss();
      }
      return true;
    }

    if self.pairing.is_prompting() {
      self.handle_prompt_key(key);
      return true;
    }

    self.handle_form_key(key);
    self.idle.set_dirty(self.form.is_dirty(), now);
    true
  }

  fn handle_prompt_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => self.pairing.cancel(),
      KeyCode::Up => self.pairing.move_cursor(-1),
      KeyCode::Down => self.pairing.move_cursor(1),
      KeyCode::Backspace => self.pairing.pop_filter(),
      KeyCode::Char(c) => self.pairing.push_filter(c),
      KeyCode::Enter => {
        if let Some(code) = self.pairing.confirm() {
          if let Err(e) = self.client.remember_branch(&code) {
            tracing::error!(error = %e, "failed to persist kiosk pairing");
          }
          tracing::info!(branch = %code, "kiosk paired from prompt");
          if !self.post_if_valid() {
            self.pairing.reset();
          }
        }
      }
      _ => {}
    }
  }

  fn handle_form_key(&mut self, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
      self.request_submit();
      return;
    }

    let focus = self.focused();
    match key.code {
      KeyCode::Tab | KeyCode::Down => self.move_focus(1),
      KeyCode::BackTab | KeyCode::Up => self.move_focus(-1),
      KeyCode::Enter => self.activate(focus),
      KeyCode::Char(' ') if !is_text(focus) => self.activate(focus),
      KeyCode::Left | KeyCode::Right if matches!(focus, Focus::Child(_, ChildField::Gender)) => {
        self.activate(focus)
      }
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.edit_text(focus, |v| v.push(c))
      }
      KeyCode::Backspace => self.edit_text(focus, |v| {
        v.pop();
      }),
      _ => {}
    }
  }

  fn activate(&mut self, focus: Focus) {
    let today = Self::today();
    match focus {
      Focus::AddressToggle => {
        if self.form.address_open() {
          self.form.close_address();
          self.address_query.clear();
        } else {
          self.form.open_address();
        }
      }
      Focus::AddressSearch => self.geocode(),
      Focus::Child(i, ChildField::Gender) => {
        let next = match self.form.draft().children[i].gender {
          Gender::Male => Gender::Female,
          Gender::Female => Gender::Other,
          Gender::Other => Gender::Male,
        };
        self.form.update_child(i, ChildField::Gender, next.as_str(), today);
      }
      Focus::RemoveChild(i) => {
        self.form.remove_child(i);
        self.move_focus(0);
      }
      Focus::AddChild => {
        if self.form.add_child() {
          let i = self.form.draft().children.len() - 1;
          self.focus_on(Focus::Child(i, ChildField::FirstName));
        }
      }
      Focus::Agree => {
        let agree = !self.form.draft().agree;
        self.form.set_agree(agree);
      }
      Focus::ClearSignature => self.form.clear_signature(),
      Focus::Submit => self.request_submit(),
      Focus::Field(_) | Focus::Child(..) => self.move_focus(1),
    }
  }

  fn edit_text(&mut self, focus: Focus, edit: impl FnOnce(&mut String)) {
    let today = Self::today();
    match focus {
      Focus::Field(field) => {
        let mut value = self.form.draft().text(field).unwrap_or_default().to_owned();
        edit(&mut value);
        self.form.update_field(field, &value, today);
      }
      Focus::Child(i, field) if field != ChildField::Gender => {
        let mut value = self.form.draft().children[i].get(field).to_owned();
        edit(&mut value);
        self.form.update_child(i, field, &value, today);
      }
      Focus::AddressSearch => edit(&mut self.address_query),
      _ => {}
    }
  }

  pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
    self.idle.on_activity(now);
    if *self.submit.modal() != Modal::Closed || self.pairing.is_prompting() {
      return;
    }

    let point = normalize(self.pad_area, mouse.column, mouse.row);
    match (mouse.kind, point) {
      (MouseEventKind::Down(MouseButton::Left), Some(p)) => self.form.begin_stroke(p),
      (MouseEventKind::Drag(MouseButton::Left), Some(p)) => self.form.extend_stroke(p),
      (MouseEventKind::Up(MouseButton::Left), _) if self.form.pad().is_drawing() => {
        self.form.end_stroke()
      }
      _ => {}
    }
    self.idle.set_dirty(self.form.is_dirty(), now);
  }

  // ── Clock ─────────────────────────────────────────────────────────────────

  pub fn on_tick(&mut self, now: Instant) {
    if self.idle.tick(now) == IdleTick::Expired {
      tracing::info!("idle timeout, clearing form");
      self.form.reset();
      self.pairing.reset();
      self.address_query.clear();
      self.focus = 0;
    }
    self.submit.tick(now);
  }

  // ── Submission ────────────────────────────────────────────────────────────

  fn request_submit(&mut self) {
    if self.submit.preflight(&mut self.form, Self::today()).is_none() {
      return;
    }
    match self.pairing.on_submit() {
      PairingStep::Check => {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
          let _ = tx.send(NetEvent::Checked(client.check().await));
        });
      }
      PairingStep::Submit => self.send_submission(),
      PairingStep::Prompt | PairingStep::Wait => {}
    }
  }

  /// Post the form if a fresh validation pass accepts it.
  fn post_if_valid(&mut self) -> bool {
    if self.submit.preflight(&mut self.form, Self::today()).is_none() {
      return false;
    }
    self.send_submission();
    true
  }

  fn send_submission(&mut self) {
    self.submit.start();
    let draft = self.form.draft().clone();
    let client = Arc::clone(&self.client);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let _ = tx.send(NetEvent::Submitted(client.subscribe(&draft).await));
    });
  }

  fn geocode(&mut self) {
    let query = self.address_query.trim().to_owned();
    let Some(geocoder) = self.geocoder.clone() else {
      return;
    };
    if query.is_empty() {
      return;
    }
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let _ = tx.send(NetEvent::Geocoded(geocoder.lookup(&query).await));
    });
  }

  // ── Network results ───────────────────────────────────────────────────────

  pub fn handle_net(&mut self, event: NetEvent, now: Instant) {
    match event {
      NetEvent::Branches(Ok(branches)) => {
        tracing::info!(count = branches.len(), "branches loaded");
        self.pairing.set_branches(branches);
      }
      NetEvent::Branches(Err(e)) => {
        tracing::warn!(error = %e, "failed to load branches");
      }
      NetEvent::Checked(_) if *self.pairing.state() != PairingState::Checking => {
        tracing::debug!("ignoring kiosk check for an abandoned submission");
      }
      NetEvent::Checked(result) => {
        let result = result.map(|c| c.kiosk_branch_cookie);
        if let Err(e) = &result {
          tracing::warn!(error = %e, "kiosk check failed; submitting anyway");
        }
        match self.pairing.on_check(result) {
          PairingStep::Submit => {
            if !self.post_if_valid() {
              self.pairing.reset();
            }
          }
          PairingStep::Prompt if self.pairing.branches().is_empty() => self.load_branches(),
          _ => {}
        }
      }
      NetEvent::Submitted(result) => {
        self.submit.finish(&mut self.form, result, now);
        self.pairing.reset();
        if self.form.errors().get(Field::BranchCode) == Some(MessageKey::BranchNotFound) {
          tracing::warn!("server no longer knows this kiosk's branch; forgetting pairing");
          if let Err(e) = self.client.forget_branch() {
            tracing::error!(error = %e, "failed to forget kiosk pairing");
          }
        }
        if !self.form.is_dirty() {
          self.address_query.clear();
          self.focus = 0;
        }
      }
      NetEvent::Geocoded(Ok(Some(place))) => {
        self.status_msg.clear();
        self.form.apply_place(&place);
      }
      NetEvent::Geocoded(Ok(None)) => {
        self.status_msg = t(self.locale, "form.addressNotFound").to_owned();
      }
      NetEvent::Geocoded(Err(e)) => {
        tracing::warn!(error = %e, "geocoding failed");
      }
    }
    self.idle.set_dirty(self.form.is_dirty(), now);
  }
}

fn is_text(focus: Focus) -> bool {
  matches!(focus, Focus::Field(_) | Focus::AddressSearch)
    || matches!(focus, Focus::Child(_, f) if f != ChildField::Gender)
}
