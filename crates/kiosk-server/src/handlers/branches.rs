use axum::{Json, extract::State};
use kiosk_core::{branch::BranchSummary, mailing::MailingList, store::SubscriptionStore};

use crate::{AppState, error::ApiError};

/// `GET /api/branches`: active branches ordered by name.
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
) -> Result<Json<Vec<BranchSummary>>, ApiError>
where
  S: SubscriptionStore,
  M: MailingList,
{
  let branches = state
    .store
    .list_branches(true)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(branches.into_iter().map(BranchSummary::from).collect()))
}
