//! The form state controller.
//!
//! [`FormController`] owns the draft, its error set, the address toggle and
//! the signature pad. Every mutation goes through a method here; the UI only
//! reads.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use kiosk_core::{
  draft::{Child, ChildField, Draft, Field, MAX_CHILDREN, is_dirty},
  message::MessageKey,
  validate::{ValidationErrors, check_child_field, check_field, is_future_date, validate_for_submit},
};

use crate::{
  geocode::Place,
  signature::{Point, SignaturePad},
};

#[derive(Debug, Clone, Default)]
pub struct FormController {
  draft:        Draft,
  errors:       ValidationErrors,
  address_open: bool,
  pad:          SignaturePad,
}

impl FormController {
  pub fn new() -> Self { Self::default() }

  pub fn draft(&self) -> &Draft { &self.draft }

  pub fn errors(&self) -> &ValidationErrors { &self.errors }

  pub fn address_open(&self) -> bool { self.address_open }

  pub fn pad(&self) -> &SignaturePad { &self.pad }

  pub fn is_dirty(&self) -> bool { is_dirty(&self.draft) }

  // ── Fields ────────────────────────────────────────────────────────────────

  /// Set a text field and drop its error if the new value passes.
  ///
  /// A date after `today` is refused and leaves the draft unchanged; the
  /// return value says whether the edit was applied.
  pub fn update_field(&mut self, field: Field, value: &str, today: NaiveDate) -> bool {
    if field.is_date() && is_future_date(value, today) {
      return false;
    }
    let Some(slot) = self.draft.text_mut(field) else {
      return false;
    };
    value.clone_into(slot);
    if check_field(&self.draft, field).is_none() {
      self.errors.clear(field);
    }
    true
  }

  pub fn set_agree(&mut self, agree: bool) {
    self.draft.agree = agree;
    if check_field(&self.draft, Field::Agree).is_none() {
      self.errors.clear(Field::Agree);
    }
  }

  // ── Children ──────────────────────────────────────────────────────────────

  /// Append a blank child. No-op once [`MAX_CHILDREN`] are present.
  pub fn add_child(&mut self) -> bool {
    if self.draft.children.len() >= MAX_CHILDREN {
      return false;
    }
    self.draft.children.push(Child::default());
    self.errors.ensure_children(self.draft.children.len());
    self.recheck_children();
    true
  }

  /// Remove the child at `index`; later children and their errors shift down.
  pub fn remove_child(&mut self, index: usize) -> bool {
    if index >= self.draft.children.len() {
      return false;
    }
    self.draft.children.remove(index);
    self.errors.remove_child(index);
    self.recheck_children();
    true
  }

  pub fn update_child(
    &mut self,
    index: usize,
    field: ChildField,
    value: &str,
    today: NaiveDate,
  ) -> bool {
    if field == ChildField::Dob && is_future_date(value, today) {
      return false;
    }
    let Some(child) = self.draft.children.get_mut(index) else {
      return false;
    };
    if !child.set(field, value) {
      return false;
    }
    self.errors.ensure_children(index + 1);
    if check_child_field(child, field).is_none() {
      self.errors.clear_child(index, field);
    }
    self.recheck_children();
    true
  }

  fn recheck_children(&mut self) {
    if check_field(&self.draft, Field::Children).is_none() {
      self.errors.clear(Field::Children);
    }
  }

  // ── Signature ─────────────────────────────────────────────────────────────

  pub fn begin_stroke(&mut self, p: Point) {
    self.pad.begin(p);
    self.errors.clear(Field::Signature);
  }

  pub fn extend_stroke(&mut self, p: Point) { self.pad.extend(p); }

  /// Finish the stroke and store the encoded pad on the draft.
  pub fn end_stroke(&mut self) {
    self.pad.end();
    self.draft.signature = match self.pad.to_data_url() {
      Ok(url) => url,
      Err(e) => {
        tracing::error!(error = %e, "failed to encode signature");
        String::new()
      }
    };
    self.errors.clear(Field::Signature);
  }

  pub fn clear_signature(&mut self) {
    self.pad.clear();
    self.draft.signature.clear();
    self.errors.clear(Field::Signature);
  }

  // ── Address ───────────────────────────────────────────────────────────────

  pub fn open_address(&mut self) { self.address_open = true; }

  /// Close the section, emptying all five address fields and their errors.
  pub fn close_address(&mut self) {
    self.address_open = false;
    self.draft.clear_address();
    for f in Field::ADDRESS {
      self.errors.clear(f);
    }
  }

  /// Fill the address from a geocoder result. Filled fields lose their
  /// errors; empty components leave the current value alone.
  pub fn apply_place(&mut self, place: &Place) {
    self.address_open = true;
    for (field, value) in [
      (Field::Street, &place.street),
      (Field::PostalCode, &place.postal_code),
      (Field::City, &place.city),
      (Field::Province, &place.province),
      (Field::Country, &place.country),
    ] {
      if let Some(slot) = self.draft.text_mut(field)
        && !value.is_empty()
      {
        value.clone_into(slot);
        self.errors.clear(field);
      }
    }
  }

  // ── Whole form ────────────────────────────────────────────────────────────

  /// Back to the initial empty state.
  pub fn reset(&mut self) { *self = Self::default(); }

  /// Replace the error set with a full pre-flight pass. `true` when clean.
  pub fn validate_for_submit(&mut self, today: NaiveDate) -> bool {
    self.errors = validate_for_submit(&self.draft, self.address_open, today);
    self.errors.is_empty()
  }

  /// Merge server-reported `path → key` errors into the current set.
  pub fn merge_server_errors(&mut self, details: &BTreeMap<String, MessageKey>) {
    self.errors.ensure_children(self.draft.children.len());
    self
      .errors
      .merge_paths(details.iter().map(|(p, k)| (p.as_str(), *k)));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 6, 15).unwrap() }

  fn with_errors(form: &mut FormController) {
    assert!(!form.validate_for_submit(today()));
  }

  #[test]
  fn update_field_only_clears_errors() {
    let mut form = FormController::new();
    with_errors(&mut form);
    assert_eq!(form.errors().get(Field::FirstName), Some(MessageKey::Required));
    assert_eq!(form.errors().get(Field::Email), Some(MessageKey::Required));

    // Invalid email: the existing error stays, nothing new is added.
    assert!(form.update_field(Field::Email, "anna@", today()));
    assert_eq!(form.errors().get(Field::Email), Some(MessageKey::Required));
    assert!(form.update_field(Field::Email, "anna@example.com", today()));
    assert_eq!(form.errors().get(Field::Email), None);

    assert!(form.update_field(Field::FirstName, "Anna", today()));
    assert_eq!(form.errors().get(Field::FirstName), None);

    // Clearing a field does not bring its error back.
    assert!(form.update_field(Field::FirstName, "", today()));
    assert_eq!(form.errors().get(Field::FirstName), None);
  }

  #[test]
  fn future_dates_are_refused_at_entry() {
    let mut form = FormController::new();
    assert!(!form.update_field(Field::Dob, "2025-06-16", today()));
    assert_eq!(form.draft().dob, "");
    assert!(form.update_field(Field::Dob, "2025-06-15", today()));
    assert_eq!(form.draft().dob, "2025-06-15");
    // Partial input while typing is accepted.
    assert!(form.update_field(Field::Dob, "2030-0", today()));

    form.add_child();
    assert!(!form.update_child(0, ChildField::Dob, "2099-01-01", today()));
    assert_eq!(form.draft().children[0].dob, "");
  }

  #[test]
  fn add_child_stops_at_five() {
    let mut form = FormController::new();
    for _ in 0..MAX_CHILDREN {
      assert!(form.add_child());
    }
    assert!(!form.add_child());
    assert_eq!(form.draft().children.len(), MAX_CHILDREN);
  }

  #[test]
  fn remove_child_shifts_errors_down() {
    let mut form = FormController::new();
    for _ in 0..3 {
      form.add_child();
    }
    form.update_child(1, ChildField::FirstName, "Max", today());
    form.update_child(1, ChildField::LastName, "Muster", today());
    form.update_child(1, ChildField::Dob, "2019-01-01", today());
    with_errors(&mut form);
    assert_eq!(form.errors().child(0, ChildField::FirstName), Some(MessageKey::Required));
    assert_eq!(form.errors().child(1, ChildField::FirstName), None);
    assert_eq!(form.errors().child(2, ChildField::Dob), Some(MessageKey::Required));

    assert!(form.remove_child(0));
    assert_eq!(form.errors().child(0, ChildField::FirstName), None);
    assert_eq!(form.errors().child(1, ChildField::Dob), Some(MessageKey::Required));
    assert_eq!(form.errors().child(2, ChildField::Dob), None);
    assert_eq!(form.draft().children[0].first_name, "Max");

    assert!(!form.remove_child(5));
  }

  #[test]
  fn completing_children_clears_the_group_error() {
    let mut form = FormController::new();
    form.add_child();
    with_errors(&mut form);
    assert_eq!(form.errors().get(Field::Children), Some(MessageKey::IncompleteChildData));

    form.update_child(0, ChildField::FirstName, "Max", today());
    form.update_child(0, ChildField::LastName, "Muster", today());
    assert!(form.errors().get(Field::Children).is_some());
    form.update_child(0, ChildField::Dob, "2019-01-01", today());
    assert_eq!(form.errors().get(Field::Children), None);
  }

  #[test]
  fn signature_lifecycle() {
    let mut form = FormController::new();
    with_errors(&mut form);
    assert!(form.errors().get(Field::Signature).is_some());

    form.begin_stroke(Point { x: 0.1, y: 0.1 });
    assert_eq!(form.errors().get(Field::Signature), None);
    form.extend_stroke(Point { x: 0.4, y: 0.6 });
    form.end_stroke();
    assert!(form.draft().signature.starts_with("data:image/svg+xml;base64,"));
    assert!(form.is_dirty());

    form.clear_signature();
    assert!(form.draft().signature.is_empty());
    assert!(form.pad().is_empty());
  }

  #[test]
  fn closing_address_clears_fields_and_errors() {
    let mut form = FormController::new();
    form.open_address();
    form.update_field(Field::Street, "Hauptstraße 1", today());
    with_errors(&mut form);
    assert_eq!(form.errors().get(Field::City), Some(MessageKey::Required));

    form.close_address();
    assert!(!form.address_open());
    assert_eq!(form.draft().street, "");
    assert_eq!(form.errors().get(Field::City), None);
  }

  #[test]
  fn open_address_with_blank_city_fails_preflight() {
    let mut form = FormController::new();
    form.open_address();
    for (f, v) in [
      (Field::Street, "Hauptstraße 1"),
      (Field::PostalCode, "7111"),
      (Field::Province, "Burgenland"),
      (Field::Country, "Austria"),
    ] {
      form.update_field(f, v, today());
    }
    with_errors(&mut form);
    assert_eq!(form.errors().get(Field::City), Some(MessageKey::Required));
    assert_eq!(form.errors().get(Field::Street), None);
  }

  #[test]
  fn applying_a_place_fills_and_clears() {
    let mut form = FormController::new();
    form.open_address();
    form.update_field(Field::Country, "AT", today());
    with_errors(&mut form);

    form.apply_place(&Place {
      street: "Designer-Outlet-Straße 12".into(),
      city: "Parndorf".into(),
      ..Place::default()
    });
    assert_eq!(form.draft().city, "Parndorf");
    assert_eq!(form.draft().country, "AT");
    assert_eq!(form.errors().get(Field::City), None);
    assert_eq!(form.errors().get(Field::Province), Some(MessageKey::Required));
  }

  #[test]
  fn reset_restores_the_initial_state() {
    let mut form = FormController::new();
    form.update_field(Field::FirstName, "Anna", today());
    form.open_address();
    form.add_child();
    form.begin_stroke(Point { x: 0.5, y: 0.5 });
    form.end_stroke();
    with_errors(&mut form);

    form.reset();
    assert_eq!(form.draft(), &Draft::default());
    assert!(form.errors().is_empty());
    assert!(!form.address_open());
    assert!(form.pad().is_empty());
    assert!(!form.is_dirty());
  }

  #[test]
  fn server_errors_land_on_fields_and_children() {
    let mut form = FormController::new();
    form.add_child();
    let details = BTreeMap::from([
      ("city".to_owned(), MessageKey::Required),
      ("children.0.dob".to_owned(), MessageKey::InvalidDate),
    ]);
    form.merge_server_errors(&details);
    assert_eq!(form.errors().get(Field::City), Some(MessageKey::Required));
    assert_eq!(form.errors().child(0, ChildField::Dob), Some(MessageKey::InvalidDate));
  }
}
