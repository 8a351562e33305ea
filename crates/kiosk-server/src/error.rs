//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error leaves the server as a JSON [`ErrorBody`]. Store failures are
//! logged in full and reported to the client only as a generic 500.

use std::collections::BTreeMap;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use kiosk_core::{
  api::{ErrorBody, ErrorDetails},
  draft::Field,
  message::MessageKey,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid JSON body: {0}")]
  InvalidJson(String),

  #[error("validation failed on {} field(s)", .0.len())]
  Validation(BTreeMap<String, MessageKey>),

  #[error("no active branch resolves for this submission")]
  BranchNotFound,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, ErrorBody::new("Unauthorized")),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, ErrorBody::new(m)),
      ApiError::InvalidJson(reason) => {
        tracing::debug!(%reason, "rejected request body");
        (
          StatusCode::BAD_REQUEST,
          ErrorBody::new("Invalid JSON").with_details(ErrorDetails::Text(
            "Request body must be valid JSON".into(),
          )),
        )
      }
      ApiError::Validation(fields) => (
        StatusCode::BAD_REQUEST,
        ErrorBody::new("Validation failed").with_details(ErrorDetails::Fields(fields)),
      ),
      ApiError::BranchNotFound => (
        StatusCode::NOT_FOUND,
        ErrorBody::new("Invalid branch code").with_details(ErrorDetails::Fields(
          BTreeMap::from([(
            Field::BranchCode.as_str().to_owned(),
            MessageKey::BranchNotFound,
          )]),
        )),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("Internal error"))
      }
    };
    (status, Json(body)).into_response()
  }
}
