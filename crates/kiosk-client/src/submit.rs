//! The submission pipeline and its status modal.
//!
//! ```text
//! Closed ──preflight ok──▶ Loading ──accepted──▶ Success ──5 s / dismiss──▶ Closed
//!                             └──rejected / offline──▶ Error ──dismiss──▶ Closed
//! ```
//!
//! The network round trip itself lives in the event loop; this module only
//! decides what to send and what a reply does to the form.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use kiosk_core::{api::ErrorBody, draft::Draft, message::MessageKey};

use crate::form::FormController;

pub const SUCCESS_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// How the server answered a submission.
#[derive(Debug, Clone)]
pub enum SubmitReply {
  Accepted,
  /// A non-2xx status; `body` is `None` when it was not the usual JSON error.
  Rejected { status: u16, body: Option<ErrorBody> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
  Closed,
  Loading,
  Success { dismiss_at: Instant },
  /// Messages to show, in field order, without duplicates.
  Error(Vec<MessageKey>),
}

#[derive(Debug, Clone)]
pub struct SubmitPipeline {
  modal: Modal,
}

impl Default for SubmitPipeline {
  fn default() -> Self { Self::new() }
}

impl SubmitPipeline {
  pub fn new() -> Self { Self { modal: Modal::Closed } }

  pub fn modal(&self) -> &Modal { &self.modal }

  pub fn is_busy(&self) -> bool { self.modal == Modal::Loading }

  /// Run the full local validation pass. Returns the payload to post when the
  /// form is clean; otherwise the errors are on the form and nothing is sent.
  ///
  /// While a submission is in flight the loading modal blocks any other.
  pub fn preflight(&self, form: &mut FormController, today: NaiveDate) -> Option<Draft> {
    if self.is_busy() {
      return None;
    }
    form.validate_for_submit(today).then(|| form.draft().clone())
  }

  pub fn start(&mut self) { self.modal = Modal::Loading; }

  /// Apply the outcome of a post. Transport failures arrive as `Err`.
  pub fn finish<E: std::fmt::Display>(
    &mut self,
    form: &mut FormController,
    outcome: Result<SubmitReply, E>,
    now: Instant,
  ) {
    self.modal = match outcome {
      Ok(SubmitReply::Accepted) => {
        form.reset();
        Modal::Success { dismiss_at: now + SUCCESS_DISMISS_AFTER }
      }
      Ok(SubmitReply::Rejected { status, body }) => {
        tracing::warn!(status, error = ?body.as_ref().map(|b| &b.error), "submission rejected");
        match body.as_ref().and_then(ErrorBody::field_errors) {
          Some(fields) if !fields.is_empty() => {
            form.merge_server_errors(fields);
            let mut keys: Vec<MessageKey> = Vec::new();
            for key in fields.values() {
              if !keys.contains(key) {
                keys.push(*key);
              }
            }
            Modal::Error(keys)
          }
          _ => Modal::Error(vec![MessageKey::ServerError]),
        }
      }
      Err(e) => {
        tracing::error!(error = %e, "submission failed");
        Modal::Error(vec![MessageKey::NetworkError])
      }
    };
  }

  /// Auto-dismiss the success modal once its time is up.
  pub fn tick(&mut self, now: Instant) -> bool {
    if let Modal::Success { dismiss_at } = self.modal
      && now >= dismiss_at
    {
      self.modal = Modal::Closed;
      return true;
    }
    false
  }

  /// Close the modal by hand. The loading modal cannot be dismissed.
  pub fn dismiss(&mut self) {
    if !self.is_busy() {
      self.modal = Modal::Closed;
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use kiosk_core::{api::ErrorDetails, draft::Field};

  use super::*;
  use crate::signature::Point;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 6, 15).unwrap() }

  fn anna() -> FormController {
    let mut form = FormController::new();
    for (f, v) in [
      (Field::FirstName, "Anna"),
      (Field::LastName, "Muster"),
      (Field::Email, "anna@example.com"),
      (Field::Dob, "1990-01-01"),
    ] {
      form.update_field(f, v, today());
    }
    form.set_agree(true);
    form.begin_stroke(Point { x: 0.2, y: 0.5 });
    form.extend_stroke(Point { x: 0.8, y: 0.5 });
    form.end_stroke();
    form
  }

  #[test]
  fn clean_form_yields_payload() {
    let p = SubmitPipeline::new();
    let mut form = anna();
    let draft = p.preflight(&mut form, today()).expect("valid");
    assert_eq!(draft.first_name, "Anna");
    assert!(draft.signature.starts_with("data:image/svg+xml;base64,"));
  }

  #[test]
  fn invalid_form_sends_nothing() {
    let p = SubmitPipeline::new();
    let mut form = FormController::new();
    assert!(p.preflight(&mut form, today()).is_none());
    assert!(!form.errors().is_empty());
  }

  #[test]
  fn loading_blocks_a_second_submit() {
    let mut p = SubmitPipeline::new();
    let mut form = anna();
    p.start();
    assert!(p.preflight(&mut form, today()).is_none());
    p.dismiss();
    assert!(p.is_busy());
  }

  #[test]
  fn success_resets_and_auto_dismisses() {
    let mut p = SubmitPipeline::new();
    let mut form = anna();
    let t0 = Instant::now();
    p.start();
    p.finish::<String>(&mut form, Ok(SubmitReply::Accepted), t0);

    assert!(!form.is_dirty());
    assert_eq!(form.draft(), &Draft::default());
    assert!(matches!(p.modal(), Modal::Success { .. }));
    assert!(!p.tick(t0 + Duration::from_secs(4)));
    assert!(p.tick(t0 + Duration::from_secs(5)));
    assert_eq!(p.modal(), &Modal::Closed);
  }

  #[test]
  fn field_errors_are_merged_into_the_form() {
    let mut p = SubmitPipeline::new();
    let mut form = anna();
    p.start();
    let body = ErrorBody::new("Validation failed").with_details(ErrorDetails::Fields(
      BTreeMap::from([
        ("city".to_owned(), MessageKey::Required),
        ("street".to_owned(), MessageKey::Required),
        ("dob".to_owned(), MessageKey::InvalidDate),
      ]),
    ));
    p.finish::<String>(
      &mut form,
      Ok(SubmitReply::Rejected { status: 400, body: Some(body) }),
      Instant::now(),
    );

    assert_eq!(form.errors().get(Field::City), Some(MessageKey::Required));
    assert_eq!(form.errors().get(Field::Dob), Some(MessageKey::InvalidDate));
    assert_eq!(form.draft().first_name, "Anna");
    assert_eq!(
      p.modal(),
      &Modal::Error(vec![MessageKey::Required, MessageKey::InvalidDate])
    );
  }

  #[test]
  fn unstructured_rejection_is_a_server_error() {
    let mut p = SubmitPipeline::new();
    let mut form = anna();
    p.start();
    p.finish::<String>(
      &mut form,
      Ok(SubmitReply::Rejected { status: 500, body: Some(ErrorBody::new("Internal error")) }),
      Instant::now(),
    );
    assert_eq!(p.modal(), &Modal::Error(vec![MessageKey::ServerError]));
    assert!(form.errors().is_empty());
  }

  #[test]
  fn transport_failure_is_a_network_error() {
    let mut p = SubmitPipeline::new();
    let mut form = anna();
    p.start();
    p.finish(&mut form, Err("connection refused"), Instant::now());
    assert_eq!(p.modal(), &Modal::Error(vec![MessageKey::NetworkError]));
    assert!(form.is_dirty());
    p.dismiss();
    assert_eq!(p.modal(), &Modal::Closed);
  }
}
