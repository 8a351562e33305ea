//! Branches, the physical locations a kiosk can be paired with.
//!
//! Each branch feeds its own marketing list. Codes are short, case-insensitive
//! identifiers and are always stored upper-case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, validate::MAX_BRANCH_CODE_LEN};

/// Normalise a user- or URL-supplied branch code.
///
/// Trims, upper-cases and checks the code is 1–10 ASCII alphanumerics (`-`
/// and `_` allowed).
pub fn normalize_code(raw: &str) -> Result<String> {
  let code = raw.trim().to_ascii_uppercase();
  let ok = !code.is_empty()
    && code.len() <= MAX_BRANCH_CODE_LEN
    && code
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
  if ok { Ok(code) } else { Err(Error::InvalidBranchCode(raw.to_owned())) }
}

/// A registered branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
  pub id:          Uuid,
  pub code:        String,
  pub name:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub is_active:   bool,
  pub created_at:  DateTime<Utc>,
}

/// The public projection served by `GET /api/branches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
  pub id:          Uuid,
  pub code:        String,
  pub name:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl From<Branch> for BranchSummary {
  fn from(b: Branch) -> Self {
    BranchSummary {
      id:          b.id,
      code:        b.code,
      name:        b.name,
      description: b.description,
    }
  }
}

/// Input for registering a branch.
#[derive(Debug, Clone)]
pub struct NewBranch {
  pub code:        String,
  pub name:        String,
  pub description: Option<String>,
}

impl NewBranch {
  pub fn new(code: &str, name: &str) -> Result<Self> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::EmptyBranchName);
    }
    Ok(Self {
      code:        normalize_code(code)?,
      name:        name.to_owned(),
      description: None,
    })
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }
}
