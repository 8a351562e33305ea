//! Error types for `kiosk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid branch code: {0:?}")]
  InvalidBranchCode(String),

  #[error("branch name must not be empty")]
  EmptyBranchName,

  #[error("unknown message key: {0:?}")]
  UnknownMessageKey(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
