//! The subscription draft: everything the guardian fills in on the kiosk.
//!
//! The draft is plain data. It is posted to the server verbatim as JSON, so
//! the field names on the wire are the camelCase names below. Dates are kept
//! as `YYYY-MM-DD` strings, the empty string meaning "not entered yet".

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

/// Maximum number of children a single subscription may carry.
pub const MAX_CHILDREN: usize = 5;

// ─── Fields ──────────────────────────────────────────────────────────────────

/// A top-level field of the [`Draft`]. Doubles as the error-map key.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum Field {
  FirstName,
  LastName,
  Email,
  Dob,
  Phone,
  Street,
  PostalCode,
  City,
  Province,
  Country,
  BranchCode,
  Agree,
  Signature,
  /// The children list as a whole (count and completeness errors).
  Children,
}

impl Field {
  /// Address fields, in form order.
  pub const ADDRESS: [Field; 5] = [
    Field::Street,
    Field::PostalCode,
    Field::City,
    Field::Province,
    Field::Country,
  ];

  /// Fields whose content makes the draft dirty.
  pub const TRACKED: [Field; 10] = [
    Field::FirstName,
    Field::LastName,
    Field::Dob,
    Field::Phone,
    Field::Street,
    Field::PostalCode,
    Field::City,
    Field::Province,
    Field::Country,
    Field::Signature,
  ];

  /// The camelCase wire name, e.g. `postalCode`.
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Option<Self> {
    use strum::IntoEnumIterator;
    Field::iter().find(|f| f.as_str() == s)
  }

  pub fn is_date(self) -> bool { self == Field::Dob }
}

/// A field of a [`Child`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum ChildField {
  FirstName,
  LastName,
  Gender,
  Dob,
}

impl ChildField {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Option<Self> {
    use strum::IntoEnumIterator;
    ChildField::iter().find(|f| f.as_str() == s)
  }
}

// ─── Child ───────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
  #[default]
  Male,
  Female,
  Other,
}

impl Gender {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Option<Self> {
    use strum::IntoEnumIterator;
    Gender::iter().find(|g| g.as_str() == s)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Child {
  pub first_name: String,
  pub last_name:  String,
  pub gender:     Gender,
  pub dob:        String,
}

impl Child {
  /// `true` while the child still equals the freshly-added default.
  pub fn is_blank(&self) -> bool { *self == Child::default() }

  pub fn get(&self, field: ChildField) -> &str {
    match field {
      ChildField::FirstName => &self.first_name,
      ChildField::LastName => &self.last_name,
      ChildField::Gender => self.gender.as_str(),
      ChildField::Dob => &self.dob,
    }
  }

  /// Set a field from its text form. Returns `false` for an unknown gender.
  pub fn set(&mut self, field: ChildField, value: &str) -> bool {
    match field {
      ChildField::FirstName => self.first_name = value.to_owned(),
      ChildField::LastName => self.last_name = value.to_owned(),
      ChildField::Dob => self.dob = value.to_owned(),
      ChildField::Gender => match Gender::parse(value) {
        Some(g) => self.gender = g,
        None => return false,
      },
    }
    true
  }

  /// All text fields filled in (after trimming names).
  pub fn is_complete(&self) -> bool {
    !self.first_name.trim().is_empty()
      && !self.last_name.trim().is_empty()
      && !self.dob.is_empty()
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// The in-progress subscription.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
  pub first_name:  String,
  pub last_name:   String,
  pub email:       String,
  pub dob:         String,
  pub phone:       String,
  pub street:      String,
  pub postal_code: String,
  pub city:        String,
  pub province:    String,
  pub country:     String,
  /// Explicit branch override; normally empty and resolved by the server.
  pub branch_code: String,
  pub agree:       bool,
  /// Signature image as a `data:` URL; empty when not signed.
  pub signature:   String,
  pub children:    Vec<Child>,
}

impl Draft {
  /// Text content of `field`, or `None` for the non-text fields
  /// (`agree`, `children`).
  pub fn text(&self, field: Field) -> Option<&str> {
    Some(match field {
      Field::FirstName => &self.first_name,
      Field::LastName => &self.last_name,
      Field::Email => &self.email,
      Field::Dob => &self.dob,
      Field::Phone => &self.phone,
      Field::Street => &self.street,
      Field::PostalCode => &self.postal_code,
      Field::City => &self.city,
      Field::Province => &self.province,
      Field::Country => &self.country,
      Field::BranchCode => &self.branch_code,
      Field::Signature => &self.signature,
      Field::Agree | Field::Children => return None,
    })
  }

  pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
    Some(match field {
      Field::FirstName => &mut self.first_name,
      Field::LastName => &mut self.last_name,
      Field::Email => &mut self.email,
      Field::Dob => &mut self.dob,
      Field::Phone => &mut self.phone,
      Field::Street => &mut self.street,
      Field::PostalCode => &mut self.postal_code,
      Field::City => &mut self.city,
      Field::Province => &mut self.province,
      Field::Country => &mut self.country,
      Field::BranchCode => &mut self.branch_code,
      Field::Signature => &mut self.signature,
      Field::Agree | Field::Children => return None,
    })
  }

  /// Whether any address field carries content.
  pub fn has_address(&self) -> bool {
    Field::ADDRESS
      .iter()
      .any(|f| self.text(*f).is_some_and(|v| !v.trim().is_empty()))
  }

  /// Empty all five address fields.
  pub fn clear_address(&mut self) {
    for f in Field::ADDRESS {
      if let Some(v) = self.text_mut(f) {
        v.clear();
      }
    }
  }
}

/// Whether `draft` differs from the initial empty draft in any tracked way.
///
/// Email and consent are not tracked: a draft holding only those is treated
/// as untouched and never triggers the idle reset.
pub fn is_dirty(draft: &Draft) -> bool {
  Field::TRACKED
    .iter()
    .any(|f| draft.text(*f).is_some_and(|v| !v.is_empty()))
    || draft.children.iter().any(|c| !c.is_blank())
}
