//! The idle monitor: clears an abandoned, dirty form.
//!
//! Driven by an explicit clock. The event loop reports activity and dirtiness
//! and calls [`IdleMonitor::tick`] with the current instant; the monitor never
//! schedules callbacks of its own. Its two timers (the inactivity deadline and
//! the countdown interval) are plain deadlines stored on the monitor, so
//! cancelling one is just dropping it.

use std::time::{Duration, Instant};

pub const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(30);
pub const COUNTDOWN_START: u32 = 20;
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
  /// Form is clean; no timer.
  Idle,
  /// Form is dirty; waiting out the inactivity timeout.
  Armed,
  /// Countdown visible.
  Warning { remaining: u32 },
}

/// What a [`tick`](IdleMonitor::tick) observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTick {
  Quiet,
  /// The countdown started or moved; redraw.
  Countdown(u32),
  /// The countdown reached zero. The caller resets the form; the monitor is
  /// already back to [`IdleState::Idle`].
  Expired,
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
  remaining: u32,
  next_tick: Instant,
}

#[derive(Debug, Clone)]
pub struct IdleMonitor {
  dirty:         bool,
  last_activity: Option<Instant>,
  warning_at:    Option<Instant>,
  countdown:     Option<Countdown>,
}

impl Default for IdleMonitor {
  fn default() -> Self { Self::new() }
}

impl IdleMonitor {
  pub fn new() -> Self {
    Self { dirty: false, last_activity: None, warning_at: None, countdown: None }
  }

  pub fn state(&self) -> IdleState {
    match (self.countdown, self.warning_at) {
      (Some(c), _) => IdleState::Warning { remaining: c.remaining },
      (None, Some(_)) => IdleState::Armed,
      (None, None) => IdleState::Idle,
    }
  }

  pub fn last_activity(&self) -> Option<Instant> { self.last_activity }

  /// Report the draft's current dirtiness. Becoming clean cancels everything;
  /// becoming dirty from idle arms.
  pub fn set_dirty(&mut self, dirty: bool, now: Instant) {
    let was = self.dirty;
    self.dirty = dirty;
    if !dirty {
      self.cancel();
    } else if !was || self.state() == IdleState::Idle {
      self.arm(now);
    }
  }

  /// Any user interaction. Restarts the inactivity timeout and dismisses a
  /// visible countdown.
  pub fn on_activity(&mut self, now: Instant) {
    self.last_activity = Some(now);
    if self.dirty {
      self.arm(now);
    } else {
      self.cancel();
    }
  }

  pub fn tick(&mut self, now: Instant) -> IdleTick {
    let mut outcome = IdleTick::Quiet;

    if self.countdown.is_none()
      && let Some(at) = self.warning_at
      && now >= at
    {
      self.countdown = Some(Countdown {
        remaining: COUNTDOWN_START,
        next_tick: at + COUNTDOWN_INTERVAL,
      });
      outcome = IdleTick::Countdown(COUNTDOWN_START);
    }

    while let Some(c) = self.countdown.as_mut() {
      if now < c.next_tick {
        break;
      }
      c.remaining = c.remaining.saturating_sub(1);
      c.next_tick += COUNTDOWN_INTERVAL;
      if c.remaining == 0 {
        self.cancel();
        self.dirty = false;
        return IdleTick::Expired;
      }
      outcome = IdleTick::Countdown(c.remaining);
    }

    outcome
  }

  /// The next instant at which [`tick`](Self::tick) can change anything.
  pub fn next_deadline(&self) -> Option<Instant> {
    self.countdown.map(|c| c.next_tick).or(self.warning_at)
  }

  fn arm(&mut self, now: Instant) {
    self.countdown = None;
    self.warning_at = Some(now + INACTIVITY_TIMEOUT);
  }

  fn cancel(&mut self) {
    self.countdown = None;
    self.warning_at = None;
  }
}
