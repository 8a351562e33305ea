//! The kiosk side of branch pairing.
//!
//! Before a submission leaves the kiosk, the flow makes sure the device is
//! bound to a branch:
//!
//! ```text
//! Unchecked ──submit──▶ Checking ──cookie──────────▶ Paired
//!                          │
//!                          ├──no cookie──▶ PromptPending ──confirm──▶ Paired
//!                          └──check failed──▶ Unchecked (submit anyway)
//! ```
//!
//! Every finished submission drops back to `Unchecked`, so each one is
//! preceded by its own check.

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use kiosk_core::branch::BranchSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingState {
  Unchecked,
  Checking,
  PromptPending,
  Paired(String),
}

/// What the event loop should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingStep {
  /// Ask the server for the device cookie.
  Check,
  /// Go ahead and post the draft.
  Submit,
  /// Show the branch prompt.
  Prompt,
  /// A check is already in flight.
  Wait,
}

#[derive(Debug, Clone)]
pub struct PairingFlow {
  state:    PairingState,
  branches: Vec<BranchSummary>,
  filter:   String,
  cursor:   usize,
}

impl Default for PairingFlow {
  fn default() -> Self { Self::new() }
}

impl PairingFlow {
  pub fn new() -> Self {
    Self {
      state:    PairingState::Unchecked,
      branches: Vec::new(),
      filter:   String::new(),
      cursor:   0,
    }
  }

  pub fn state(&self) -> &PairingState { &self.state }

  pub fn is_prompting(&self) -> bool { self.state == PairingState::PromptPending }

  pub fn branches(&self) -> &[BranchSummary] { &self.branches }

  pub fn set_branches(&mut self, branches: Vec<BranchSummary>) {
    self.branches = branches;
    self.clamp_cursor();
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  /// The user confirmed a valid form.
  pub fn on_submit(&mut self) -> PairingStep {
    match self.state {
      PairingState::Paired(_) => PairingStep::Submit,
      PairingState::Checking => PairingStep::Wait,
      PairingState::PromptPending => PairingStep::Prompt,
      PairingState::Unchecked => {
        self.state = PairingState::Checking;
        PairingStep::Check
      }
    }
  }

  /// The server answered the cookie check. `Err` means the check itself
  /// failed; the submission goes ahead regardless.
  pub fn on_check<E>(&mut self, result: Result<Option<String>, E>) -> PairingStep {
    match result {
      Ok(Some(code)) => {
        self.state = PairingState::Paired(code);
        PairingStep::Submit
      }
      Ok(None) => {
        self.state = PairingState::PromptPending;
        self.filter.clear();
        self.cursor = 0;
        PairingStep::Prompt
      }
      Err(_) => {
        self.state = PairingState::Unchecked;
        PairingStep::Submit
      }
    }
  }

  /// Accept the highlighted branch. Returns its code; the caller persists the
  /// cookie and resubmits.
  pub fn confirm(&mut self) -> Option<String> {
    if !self.is_prompting() {
      return None;
    }
    let code = self.selected()?.code.clone();
    self.state = PairingState::Paired(code.clone());
    Some(code)
  }

  pub fn cancel(&mut self) {
    if self.is_prompting() {
      self.state = PairingState::Unchecked;
    }
  }

  /// A submission finished. The next one starts with a fresh check.
  pub fn reset(&mut self) { self.state = PairingState::Unchecked; }

  // ── Prompt ────────────────────────────────────────────────────────────────

  pub fn filter(&self) -> &str { &self.filter }

  pub fn cursor(&self) -> usize { self.cursor }

  pub fn push_filter(&mut self, c: char) {
    self.filter.push(c);
    self.cursor = 0;
  }

  pub fn pop_filter(&mut self) {
    self.filter.pop();
    self.cursor = 0;
  }

  /// Branches matching the filter, best match first.
  pub fn filtered(&self) -> Vec<&BranchSummary> {
    if self.filter.is_empty() {
      return self.branches.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<_> = self
      .branches
      .iter()
      .filter_map(|b| {
        let by_name = matcher.fuzzy_match(&b.name, &self.filter);
        let by_code = matcher.fuzzy_match(&b.code, &self.filter);
        by_name.max(by_code).map(|score| (score, b))
      })
      .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, b)| b).collect()
  }

  pub fn selected(&self) -> Option<&BranchSummary> {
    self.filtered().get(self.cursor).copied()
  }

  pub fn move_cursor(&mut self, delta: isize) {
    let len = self.filtered().len();
    if len == 0 {
      self.cursor = 0;
      return;
    }
    self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
  }

  fn clamp_cursor(&mut self) {
    let len = self.filtered().len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }
}
