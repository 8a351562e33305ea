//! `POST /api/subscribe` — validate, resolve the branch, persist, forward.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::HeaderMap,
};
use chrono::Local;
use kiosk_core::{
  api::SubscribeResponse,
  branch::Branch,
  draft::Draft,
  mailing::{MailingList, NewContact},
  store::SubscriptionStore,
  subscription::NewSubscription,
  validate::validate_submission,
};

use crate::{AppState, error::ApiError, pairing::kiosk_cookie};

pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  headers: HeaderMap,
  payload: Result<Json<Draft>, JsonRejection>,
) -> Result<Json<SubscribeResponse>, ApiError>
where
  S: SubscriptionStore + 'static,
  M: MailingList + 'static,
{
  let Json(draft) = payload.map_err(|e| ApiError::InvalidJson(e.body_text()))?;

  let errors = validate_submission(&draft, Local::now().date_naive());
  if !errors.is_empty() {
    tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "submission rejected");
    return Err(ApiError::Validation(errors));
  }

  let branch = resolve_branch(&*state.store, &draft, kiosk_cookie(&headers).as_deref()).await?;
  let list_id = state.config.lists.list_for(&branch.code);

  let contact = NewContact::from_draft(&draft, list_id);
  let subscription = state
    .store
    .record_subscription(NewSubscription { branch_id: branch.id, list_id, draft })
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    id = %subscription.subscription_id,
    branch = %branch.code,
    list_id,
    "subscription recorded"
  );

  let mailer = state.mailer.clone();
  tokio::spawn(async move {
    if let Err(e) = mailer.add_contact(contact).await {
      tracing::error!(error = %e, list_id, "failed to forward contact to mailing list");
    }
  });

  Ok(Json(SubscribeResponse {
    message: "Subscription created successfully".into(),
    success: true,
  }))
}

/// Pick the branch a submission belongs to.
///
/// The first non-empty of the posted `branchCode` and the kiosk cookie must
/// name an active branch. With neither, the first active branch by name is
/// used.
pub async fn resolve_branch<S>(
  store: &S,
  draft: &Draft,
  cookie: Option<&str>,
) -> Result<Branch, ApiError>
where
  S: SubscriptionStore,
{
  let candidate = [Some(draft.branch_code.trim()), cookie.map(str::trim)]
    .into_iter()
    .flatten()
    .find(|c| !c.is_empty());

  let branch = match candidate {
    Some(code) => store
      .get_branch(code)
      .await
      .map_err(ApiError::store)?
      .filter(|b| b.is_active),
    None => store
      .list_branches(true)
      .await
      .map_err(ApiError::store)?
      .into_iter()
      .next(),
  };

  branch.ok_or(ApiError::BranchNotFound)
}
