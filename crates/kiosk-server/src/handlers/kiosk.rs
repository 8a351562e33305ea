//! Kiosk pairing endpoints.
//!
//! A kiosk is paired by an operator opening
//! `/api/kiosk/pair?branch=<code>&key=<setup key>` once; the response sets the
//! long-lived `kiosk-branch` cookie that later submissions fall back to.

use axum::{
  Json,
  extract::{Query, State},
  http::{HeaderMap, header},
  response::IntoResponse,
};
use kiosk_core::{
  api::{KioskCheck, PairResponse},
  branch::BranchSummary,
  mailing::MailingList,
  store::SubscriptionStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  pairing::{SetupAuthorized, kiosk_cookie, pairing_cookie},
};

// ─── Check ────────────────────────────────────────────────────────────────────

/// `GET /api/kiosk/check`: echo the paired branch code, if any.
pub async fn check(headers: HeaderMap) -> Json<KioskCheck> {
  Json(KioskCheck { kiosk_branch_cookie: kiosk_cookie(&headers) })
}

// ─── Pair ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PairParams {
  pub branch: Option<String>,
}

/// `GET /api/kiosk/pair?branch=<code>`. Requires the setup key.
pub async fn pair<S, M>(
  _auth: SetupAuthorized,
  State(state): State<AppState<S, M>>,
  Query(params): Query<PairParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriptionStore + 'static,
  M: MailingList + 'static,
{
  let code = params
    .branch
    .as_deref()
    .map(str::trim)
    .filter(|c| !c.is_empty())
    .ok_or_else(|| ApiError::BadRequest("Branch code is required".into()))?;

  let branch = state
    .store
    .get_branch(code)
    .await
    .map_err(ApiError::store)?
    .filter(|b| b.is_active)
    .ok_or_else(|| ApiError::BadRequest("Invalid or inactive branch code".into()))?;

  let cookie = pairing_cookie(&branch.code, state.config.secure_cookies)?;
  tracing::info!(branch = %branch.code, "kiosk paired");

  Ok((
    [(header::SET_COOKIE, cookie)],
    Json(PairResponse {
      message: "Kiosk paired".into(),
      branch:  BranchSummary::from(branch),
    }),
  ))
}
