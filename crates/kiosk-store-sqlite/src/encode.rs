//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, and
//! the children list compact JSON.

use chrono::{DateTime, Utc};
use kiosk_core::{
  branch::Branch,
  draft::{Child, Draft},
  subscription::Subscription,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Children ─────────────────────────────────────────────────────────────────

pub fn encode_children(children: &[Child]) -> Result<String> {
  Ok(serde_json::to_string(children)?)
}

pub fn decode_children(s: &str) -> Result<Vec<Child>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw rows ─────────────────────────────────────────────────────────────────

/// Column-for-column image of a `branches` row.
pub struct RawBranch {
  pub branch_id:   String,
  pub code:        String,
  pub name:        String,
  pub description: Option<String>,
  pub is_active:   bool,
  pub created_at:  String,
}

pub const BRANCH_COLUMNS: &str =
  "branch_id, code, name, description, is_active, created_at";

impl RawBranch {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawBranch {
      branch_id:   row.get(0)?,
      code:        row.get(1)?,
      name:        row.get(2)?,
      description: row.get(3)?,
      is_active:   row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_branch(self) -> Result<Branch> {
    Ok(Branch {
      id:          decode_uuid(&self.branch_id)?,
      code:        self.code,
      name:        self.name,
      description: self.description,
      is_active:   self.is_active,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Column-for-column image of a `subscriptions` row.
pub struct RawSubscription {
  pub subscription_id: String,
  pub branch_id:       String,
  pub list_id:         i64,
  pub created_at:      String,
  pub first_name:      String,
  pub last_name:       String,
  pub email:           String,
  pub dob:             String,
  pub phone:           String,
  pub street:          String,
  pub postal_code:     String,
  pub city:            String,
  pub province:        String,
  pub country:         String,
  pub branch_code:     String,
  pub agree:           bool,
  pub signature:       String,
  pub children_json:   String,
}

pub const SUBSCRIPTION_COLUMNS: &str = "subscription_id, branch_id, list_id, \
   created_at, first_name, last_name, email, dob, phone, street, postal_code, \
   city, province, country, branch_code, agree, signature, children_json";

impl RawSubscription {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSubscription {
      subscription_id: row.get(0)?,
      branch_id:       row.get(1)?,
      list_id:         row.get(2)?,
      created_at:      row.get(3)?,
      first_name:      row.get(4)?,
      last_name:       row.get(5)?,
      email:           row.get(6)?,
      dob:             row.get(7)?,
      phone:           row.get(8)?,
      street:          row.get(9)?,
      postal_code:     row.get(10)?,
      city:            row.get(11)?,
      province:        row.get(12)?,
      country:         row.get(13)?,
      branch_code:     row.get(14)?,
      agree:           row.get(15)?,
      signature:       row.get(16)?,
      children_json:   row.get(17)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      subscription_id: decode_uuid(&self.subscription_id)?,
      branch_id:       decode_uuid(&self.branch_id)?,
      list_id:         self.list_id,
      created_at:      decode_dt(&self.created_at)?,
      draft:           Draft {
        first_name:  self.first_name,
        last_name:   self.last_name,
        email:       self.email,
        dob:         self.dob,
        phone:       self.phone,
        street:      self.street,
        postal_code: self.postal_code,
        city:        self.city,
        province:    self.province,
        country:     self.country,
        branch_code: self.branch_code,
        agree:       self.agree,
        signature:   self.signature,
        children:    decode_children(&self.children_json)?,
      },
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_survive_encoding() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn garbage_timestamp_is_a_date_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
