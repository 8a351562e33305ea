//! Message keys shared between client and server.
//!
//! Validation never produces prose. It produces a key such as
//! `errors.required`, which the client renders through its locale catalog.
//! The server sends the same keys back in its `details` map.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// A translatable message key.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString,
  IntoStaticStr,
)]
pub enum MessageKey {
  #[strum(serialize = "errors.required")]
  Required,
  #[strum(serialize = "errors.invalidEmail")]
  InvalidEmail,
  #[strum(serialize = "errors.invalidDate")]
  InvalidDate,
  #[strum(serialize = "errors.invalidPhone")]
  InvalidPhone,
  #[strum(serialize = "errors.tooLong")]
  TooLong,
  #[strum(serialize = "errors.checkboxRequired")]
  CheckboxRequired,
  #[strum(serialize = "errors.signatureRequired")]
  SignatureRequired,
  #[strum(serialize = "errors.incompleteChildData")]
  IncompleteChildData,
  #[strum(serialize = "errors.tooManyChildren")]
  TooManyChildren,
  #[strum(serialize = "errors.invalidPostalCode")]
  InvalidPostalCode,
  #[strum(serialize = "errors.branchNotFound")]
  BranchNotFound,
  #[strum(serialize = "errors.serverError")]
  ServerError,
  #[strum(serialize = "errors.networkError")]
  NetworkError,
}

impl MessageKey {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse a key received over the wire.
  pub fn parse(s: &str) -> crate::Result<Self> {
    s.parse()
      .map_err(|_| crate::Error::UnknownMessageKey(s.to_owned()))
  }
}

impl std::fmt::Display for MessageKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for MessageKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

impl<'de> Deserialize<'de> for MessageKey {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    MessageKey::parse(&s).map_err(serde::de::Error::custom)
  }
}
