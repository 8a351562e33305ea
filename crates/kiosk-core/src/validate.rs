//! Validation rules for the subscription draft.
//!
//! Three entry points share the same primitive checks:
//!
//! - [`check_field`] / [`check_child_field`] — the permissive per-field rules
//!   the kiosk re-runs on every edit to decide whether an existing error can
//!   be cleared.
//! - [`validate_for_submit`] — the kiosk's full pre-flight before posting.
//! - [`validate_submission`] — the server's authoritative pass, producing a
//!   map from field path (`children.0.dob`) to message key.
//!
//! "Today" is always passed in explicitly so tests are deterministic.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use validator::ValidateEmail;

use crate::{
  draft::{Child, ChildField, Draft, Field, MAX_CHILDREN},
  message::MessageKey,
};

/// Longest accepted guardian or child name, in characters.
pub const MAX_NAME_LEN: usize = 50;
/// Longest accepted explicit branch code.
pub const MAX_BRANCH_CODE_LEN: usize = 10;

// ─── Primitive checks ────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// `true` if `value` is a well-formed date strictly after `today`.
pub fn is_future_date(value: &str, today: NaiveDate) -> bool {
  parse_date(value).is_some_and(|d| d > today)
}

pub fn is_valid_email(value: &str) -> bool { value.trim().validate_email() }

/// An optional leading `+`, then 7–20 characters none of which is a Latin
/// letter.
pub fn is_valid_phone(value: &str) -> bool {
  if value.chars().any(|c| c.is_ascii_alphabetic()) {
    return false;
  }
  let count = value.chars().count();
  let max = if value.starts_with('+') { 21 } else { 20 };
  (7..=max).contains(&count)
}

/// Leading-integer parse of a postal code: optional whitespace and sign, then
/// digits; trailing text is ignored. Only strictly positive values pass.
pub fn parse_postal_code(value: &str) -> Option<u32> {
  let s = value.trim_start();
  let (negative, rest) = match s.as_bytes().first() {
    Some(b'-') => (true, &s[1..]),
    Some(b'+') => (false, &s[1..]),
    _ => (false, s),
  };
  let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
  let n: u32 = digits.parse().ok()?;
  (!negative && n > 0).then_some(n)
}

fn required(value: &str) -> Option<MessageKey> {
  value.trim().is_empty().then_some(MessageKey::Required)
}

fn name_rule(value: &str) -> Option<MessageKey> {
  required(value).or_else(|| {
    (value.chars().count() > MAX_NAME_LEN).then_some(MessageKey::TooLong)
  })
}

fn date_rule(value: &str, today: NaiveDate) -> Option<MessageKey> {
  required(value).or_else(|| match parse_date(value) {
    Some(d) if d <= today => None,
    _ => Some(MessageKey::InvalidDate),
  })
}

// ─── Incremental rules ───────────────────────────────────────────────────────

/// The per-field rule used while typing. Only presence and format are checked;
/// optional fields always pass.
pub fn check_field(draft: &Draft, field: Field) -> Option<MessageKey> {
  match field {
    Field::FirstName | Field::LastName | Field::Dob => {
      let v = draft.text(field).unwrap_or_default();
      v.is_empty().then_some(MessageKey::Required)
    }
    Field::Email => (!is_valid_email(&draft.email)).then_some(MessageKey::InvalidEmail),
    Field::Agree => (!draft.agree).then_some(MessageKey::CheckboxRequired),
    Field::Signature => draft
      .signature
      .is_empty()
      .then_some(MessageKey::SignatureRequired),
    Field::Children => {
      if draft.children.len() > MAX_CHILDREN {
        Some(MessageKey::TooManyChildren)
      } else if !draft.children.iter().all(Child::is_complete) {
        Some(MessageKey::IncompleteChildData)
      } else {
        None
      }
    }
    Field::Phone
    | Field::Street
    | Field::PostalCode
    | Field::City
    | Field::Province
    | Field::Country
    | Field::BranchCode => None,
  }
}

pub fn check_child_field(child: &Child, field: ChildField) -> Option<MessageKey> {
  match field {
    ChildField::Gender => None,
    other => child.get(other).is_empty().then_some(MessageKey::Required),
  }
}

// ─── Error set ───────────────────────────────────────────────────────────────

pub type ChildErrors = BTreeMap<ChildField, MessageKey>;

/// Field errors plus a per-child list kept index-aligned with the draft's
/// children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
  fields:   BTreeMap<Field, MessageKey>,
  children: Vec<ChildErrors>,
}

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty() && self.children.iter().all(BTreeMap::is_empty)
  }

  pub fn get(&self, field: Field) -> Option<MessageKey> {
    self.fields.get(&field).copied()
  }

  pub fn child(&self, index: usize, field: ChildField) -> Option<MessageKey> {
    self.children.get(index)?.get(&field).copied()
  }

  pub fn fields(&self) -> impl Iterator<Item = (Field, MessageKey)> + '_ {
    self.fields.iter().map(|(f, k)| (*f, *k))
  }

  /// Number of per-child slots currently allocated.
  pub fn child_slots(&self) -> usize { self.children.len() }

  pub fn set(&mut self, field: Field, key: MessageKey) {
    self.fields.insert(field, key);
  }

  pub fn set_child(&mut self, index: usize, field: ChildField, key: MessageKey) {
    self.ensure_children(index + 1);
    self.children[index].insert(field, key);
  }

  /// Returns `true` if an error was removed.
  pub fn clear(&mut self, field: Field) -> bool {
    self.fields.remove(&field).is_some()
  }

  pub fn clear_child(&mut self, index: usize, field: ChildField) -> bool {
    self
      .children
      .get_mut(index)
      .is_some_and(|c| c.remove(&field).is_some())
  }

  /// Grow the per-child list to at least `len` slots.
  pub fn ensure_children(&mut self, len: usize) {
    if self.children.len() < len {
      self.children.resize_with(len, ChildErrors::new);
    }
  }

  pub fn push_child(&mut self) { self.children.push(ChildErrors::new()); }

  /// Drop the slot at `index`; later slots shift down by one.
  pub fn remove_child(&mut self, index: usize) {
    if index < self.children.len() {
      self.children.remove(index);
    }
  }

  pub fn clear_all(&mut self) {
    self.fields.clear();
    self.children.clear();
  }

  /// Merge a server `details` map into this set.
  ///
  /// Paths are either a top-level wire name (`city`) or
  /// `children.<index>.<field>`. A path naming no known field lands on
  /// [`Field::Children`] if it starts with `children`, and is otherwise
  /// dropped.
  pub fn merge_paths<'a, I>(&mut self, details: I)
  where
    I: IntoIterator<Item = (&'a str, MessageKey)>,
  {
    for (path, key) in details {
      let mut parts = path.split('.');
      match (parts.next(), parts.next(), parts.next()) {
        (Some("children"), Some(idx), Some(name)) => {
          match (idx.parse::<usize>(), ChildField::parse(name)) {
            (Ok(i), Some(f)) => self.set_child(i, f, key),
            _ => self.set(Field::Children, key),
          }
        }
        (Some("children"), _, _) => self.set(Field::Children, key),
        (Some(name), None, None) => {
          if let Some(f) = Field::parse(name) {
            self.set(f, key);
          }
        }
        _ => {}
      }
    }
  }

  /// Flatten into wire paths, the shape the server reports.
  pub fn to_paths(&self) -> BTreeMap<String, MessageKey> {
    let mut out: BTreeMap<String, MessageKey> = self
      .fields
      .iter()
      .map(|(f, k)| (f.as_str().to_owned(), *k))
      .collect();
    for (i, child) in self.children.iter().enumerate() {
      for (f, k) in child {
        out.insert(format!("children.{i}.{}", f.as_str()), *k);
      }
    }
    out
  }
}

// ─── Submit-time pass (kiosk) ────────────────────────────────────────────────

/// The kiosk's full pre-flight. Address fields are only required when the
/// address section is open.
pub fn validate_for_submit(
  draft: &Draft,
  address_open: bool,
  today: NaiveDate,
) -> ValidationErrors {
  let mut errors = ValidationErrors::new();
  errors.ensure_children(draft.children.len());

  if draft.signature.trim().is_empty() {
    errors.set(Field::Signature, MessageKey::SignatureRequired);
  }

  for field in [Field::FirstName, Field::LastName, Field::Email, Field::Dob] {
    if let Some(key) = required(draft.text(field).unwrap_or_default()) {
      errors.set(field, key);
    }
  }
  if errors.get(Field::Email).is_none() && !is_valid_email(&draft.email) {
    errors.set(Field::Email, MessageKey::InvalidEmail);
  }
  if errors.get(Field::Dob).is_none() && date_rule(&draft.dob, today).is_some() {
    errors.set(Field::Dob, MessageKey::InvalidDate);
  }

  if !draft.agree {
    errors.set(Field::Agree, MessageKey::CheckboxRequired);
  }

  let mut incomplete = false;
  for (i, child) in draft.children.iter().enumerate() {
    for field in [ChildField::FirstName, ChildField::LastName] {
      if let Some(key) = required(child.get(field)) {
        errors.set_child(i, field, key);
        incomplete = true;
      }
    }
    if let Some(key) = date_rule(&child.dob, today) {
      errors.set_child(i, ChildField::Dob, key);
      incomplete = true;
    }
  }
  if draft.children.len() > MAX_CHILDREN {
    errors.set(Field::Children, MessageKey::TooManyChildren);
  } else if incomplete {
    errors.set(Field::Children, MessageKey::IncompleteChildData);
  }

  if address_open {
    for field in Field::ADDRESS {
      if let Some(key) = required(draft.text(field).unwrap_or_default()) {
        errors.set(field, key);
      }
    }
  }

  errors
}

// ─── Authoritative pass (server) ─────────────────────────────────────────────

/// Validate a posted draft. Returns an empty map when the draft is acceptable.
///
/// The server cannot see whether the address section was open, so the address
/// counts as present when any of its fields is non-empty; all five are then
/// required.
pub fn validate_submission(
  draft: &Draft,
  today: NaiveDate,
) -> BTreeMap<String, MessageKey> {
  let mut errors: BTreeMap<String, MessageKey> = BTreeMap::new();
  let mut put = |path: String, key: Option<MessageKey>| {
    if let Some(key) = key {
      errors.entry(path).or_insert(key);
    }
  };

  put("firstName".into(), name_rule(&draft.first_name));
  put("lastName".into(), name_rule(&draft.last_name));
  put(
    "email".into(),
    (!is_valid_email(&draft.email)).then_some(MessageKey::InvalidEmail),
  );
  put("dob".into(), date_rule(&draft.dob, today));
  put(
    "phone".into(),
    (!draft.phone.is_empty() && !is_valid_phone(&draft.phone))
      .then_some(MessageKey::InvalidPhone),
  );

  if draft.has_address() {
    for field in Field::ADDRESS {
      put(
        field.as_str().into(),
        required(draft.text(field).unwrap_or_default()),
      );
    }
  }
  if !draft.postal_code.trim().is_empty() {
    put(
      "postalCode".into(),
      parse_postal_code(&draft.postal_code)
        .is_none()
        .then_some(MessageKey::InvalidPostalCode),
    );
  }

  put(
    "branchCode".into(),
    (draft.branch_code.chars().count() > MAX_BRANCH_CODE_LEN)
      .then_some(MessageKey::TooLong),
  );
  put(
    "agree".into(),
    (!draft.agree).then_some(MessageKey::CheckboxRequired),
  );
  put(
    "signature".into(),
    draft
      .signature
      .trim()
      .is_empty()
      .then_some(MessageKey::SignatureRequired),
  );

  if draft.children.len() > MAX_CHILDREN {
    put("children".into(), Some(MessageKey::TooManyChildren));
  }
  for (i, child) in draft.children.iter().enumerate() {
    put(format!("children.{i}.firstName"), name_rule(&child.first_name));
    put(format!("children.{i}.lastName"), name_rule(&child.last_name));
    put(format!("children.{i}.dob"), date_rule(&child.dob, today));
  }

  errors
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::draft::Gender;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 6, 15).unwrap() }

  fn anna() -> Draft {
    Draft {
      first_name: "Anna".into(),
      last_name: "Muster".into(),
      email: "anna@example.com".into(),
      dob: "1990-01-01".into(),
      agree: true,
      signature: "data:image/svg+xml;base64,PHN2Zy8+".into(),
      ..Draft::default()
    }
  }

  fn child(first: &str, dob: &str) -> Child {
    Child {
      first_name: first.into(),
      last_name:  "Muster".into(),
      gender:     Gender::Female,
      dob:        dob.into(),
    }
  }

  // ── Primitives ────────────────────────────────────────────────────────────

  #[test]
  fn future_dates_are_detected() {
    assert!(is_future_date("2025-06-16", today()));
    assert!(!is_future_date("2025-06-15", today()));
    assert!(!is_future_date("not a date", today()));
  }

  #[test]
  fn phone_rule() {
    assert!(is_valid_phone("+43 664 1234567"));
    assert!(is_valid_phone("0664/123-45"));
    assert!(!is_valid_phone("12345"));
    assert!(!is_valid_phone("call me maybe"));
    assert!(!is_valid_phone("123456789012345678901"));
  }

  #[test]
  fn postal_code_uses_leading_integer() {
    assert_eq!(parse_postal_code("8010"), Some(8010));
    assert_eq!(parse_postal_code(" 811 01"), Some(811));
    assert_eq!(parse_postal_code("0"), None);
    assert_eq!(parse_postal_code("-1010"), None);
    assert_eq!(parse_postal_code("A-1010"), None);
  }

  // ── Incremental rules ─────────────────────────────────────────────────────

  #[test]
  fn optional_fields_always_pass_incremental_check() {
    let d = Draft::default();
    for f in [Field::Phone, Field::City, Field::BranchCode] {
      assert_eq!(check_field(&d, f), None);
    }
    assert_eq!(check_field(&d, Field::FirstName), Some(MessageKey::Required));
    assert_eq!(check_field(&d, Field::Agree), Some(MessageKey::CheckboxRequired));
  }

  // ── Error set ─────────────────────────────────────────────────────────────

  #[test]
  fn removing_a_child_slot_shifts_later_errors_down() {
    let mut e = ValidationErrors::new();
    e.set_child(0, ChildField::FirstName, MessageKey::Required);
    e.set_child(1, ChildField::LastName, MessageKey::Required);
    e.set_child(2, ChildField::Dob, MessageKey::InvalidDate);

    e.remove_child(1);

    assert_eq!(e.child_slots(), 2);
    assert_eq!(e.child(0, ChildField::FirstName), Some(MessageKey::Required));
    assert_eq!(e.child(1, ChildField::Dob), Some(MessageKey::InvalidDate));
    assert_eq!(e.child(1, ChildField::LastName), None);
  }

  #[test]
  fn merge_paths_maps_nested_and_flat_paths() {
    let mut e = ValidationErrors::new();
    e.merge_paths([
      ("city", MessageKey::Required),
      ("children.2.dob", MessageKey::InvalidDate),
      ("children", MessageKey::TooManyChildren),
      ("nonsense", MessageKey::Required),
    ]);
    assert_eq!(e.get(Field::City), Some(MessageKey::Required));
    assert_eq!(e.child(2, ChildField::Dob), Some(MessageKey::InvalidDate));
    assert_eq!(e.child_slots(), 3);
    assert_eq!(e.get(Field::Children), Some(MessageKey::TooManyChildren));
    assert_eq!(e.to_paths().len(), 3);
  }

  // ── Submit-time pass ──────────────────────────────────────────────────────

  #[test]
  fn complete_draft_passes_preflight() {
    assert!(validate_for_submit(&anna(), false, today()).is_empty());
  }

  #[test]
  fn preflight_flags_every_missing_required_field() {
    let e = validate_for_submit(&Draft::default(), false, today());
    assert_eq!(e.get(Field::FirstName), Some(MessageKey::Required));
    assert_eq!(e.get(Field::LastName), Some(MessageKey::Required));
    assert_eq!(e.get(Field::Email), Some(MessageKey::Required));
    assert_eq!(e.get(Field::Dob), Some(MessageKey::Required));
    assert_eq!(e.get(Field::Agree), Some(MessageKey::CheckboxRequired));
    assert_eq!(e.get(Field::Signature), Some(MessageKey::SignatureRequired));
    assert_eq!(e.get(Field::City), None);
  }

  #[test]
  fn open_address_with_blank_city_is_required() {
    let d = Draft {
      street: "Hauptplatz 1".into(),
      postal_code: "8010".into(),
      province: "Steiermark".into(),
      country: "Austria".into(),
      ..anna()
    };
    let e = validate_for_submit(&d, true, today());
    assert_eq!(e.to_paths().get("city"), Some(&MessageKey::Required));
    assert_eq!(e.fields().count(), 1);

    // Closed section: the same draft is fine.
    assert!(validate_for_submit(&d, false, today()).is_empty());
  }

  #[test]
  fn incomplete_child_is_flagged_per_field() {
    let mut d = anna();
    d.children = vec![child("Max", "2019-01-01"), child("", "2030-01-01")];
    let e = validate_for_submit(&d, false, today());
    assert_eq!(e.child(0, ChildField::FirstName), None);
    assert_eq!(e.child(1, ChildField::FirstName), Some(MessageKey::Required));
    assert_eq!(e.child(1, ChildField::Dob), Some(MessageKey::InvalidDate));
    assert_eq!(e.get(Field::Children), Some(MessageKey::IncompleteChildData));
  }

  // ── Server pass ───────────────────────────────────────────────────────────

  #[test]
  fn server_accepts_anna() {
    assert!(validate_submission(&anna(), today()).is_empty());
  }

  #[test]
  fn server_rejects_future_dob() {
    let d = Draft { dob: "2025-06-16".into(), ..anna() };
    let e = validate_submission(&d, today());
    assert_eq!(e.get("dob"), Some(&MessageKey::InvalidDate));
  }

  #[test]
  fn server_reports_nested_child_paths() {
    let mut d = anna();
    d.children = vec![child("Max", "2019-01-01"), child("Lena", "garbage")];
    let e = validate_submission(&d, today());
    assert_eq!(e.len(), 1);
    assert_eq!(e.get("children.1.dob"), Some(&MessageKey::InvalidDate));
  }

  #[test]
  fn server_enforces_length_and_count_limits() {
    let mut d = anna();
    d.first_name = "x".repeat(51);
    d.branch_code = "ABCDEFGHIJK".into();
    d.children = vec![child("Max", "2019-01-01"); 6];
    let e = validate_submission(&d, today());
    assert_eq!(e.get("firstName"), Some(&MessageKey::TooLong));
    assert_eq!(e.get("branchCode"), Some(&MessageKey::TooLong));
    assert_eq!(e.get("children"), Some(&MessageKey::TooManyChildren));
  }

  #[test]
  fn server_requires_whole_address_once_any_part_is_given() {
    let d = Draft { city: "Graz".into(), ..anna() };
    let e = validate_submission(&d, today());
    assert_eq!(e.get("street"), Some(&MessageKey::Required));
    assert_eq!(e.get("postalCode"), Some(&MessageKey::Required));
    assert_eq!(e.get("city"), None);
  }

  #[test]
  fn server_rejects_non_numeric_postal_code() {
    let d = Draft {
      street: "Hauptplatz 1".into(),
      postal_code: "Graz".into(),
      city: "Graz".into(),
      province: "Steiermark".into(),
      country: "Austria".into(),
      ..anna()
    };
    let e = validate_submission(&d, today());
    assert_eq!(e.get("postalCode"), Some(&MessageKey::InvalidPostalCode));
  }

  #[test]
  fn server_rejects_bad_phone_and_email() {
    let d = Draft {
      phone: "ring ring".into(),
      email: "anna.example.com".into(),
      ..anna()
    };
    let e = validate_submission(&d, today());
    assert_eq!(e.get("phone"), Some(&MessageKey::InvalidPhone));
    assert_eq!(e.get("email"), Some(&MessageKey::InvalidEmail));
  }
}
