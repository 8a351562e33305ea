//! JSON bodies exchanged between the kiosk and the server.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{branch::BranchSummary, message::MessageKey};

/// `GET /api/kiosk/check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskCheck {
  pub kiosk_branch_cookie: Option<String>,
}

/// `GET /api/kiosk/pair` on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResponse {
  pub message: String,
  pub branch:  BranchSummary,
}

/// `POST /api/subscribe` on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeResponse {
  pub message: String,
  pub success: bool,
}

/// `details` of an error body: a field-path → message-key map, a free-text
/// explanation, or anything else the server chose to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
  Fields(BTreeMap<String, MessageKey>),
  Text(String),
  Other(serde_json::Value),
}

/// Body of every non-2xx JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error:   String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<ErrorDetails>,
}

impl ErrorBody {
  pub fn new(error: impl Into<String>) -> Self {
    Self { error: error.into(), details: None }
  }

  pub fn with_details(mut self, details: ErrorDetails) -> Self {
    self.details = Some(details);
    self
  }

  /// The structured field errors, if the server sent any.
  pub fn field_errors(&self) -> Option<&BTreeMap<String, MessageKey>> {
    match &self.details {
      Some(ErrorDetails::Fields(map)) => Some(map),
      _ => None,
    }
  }
}
