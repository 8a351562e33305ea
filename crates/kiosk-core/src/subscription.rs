//! Accepted subscriptions, as persisted by the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::Draft;

/// Input for [`SubscriptionStore::record_subscription`](crate::store::SubscriptionStore::record_subscription).
/// The draft must already have passed server validation.
#[derive(Debug, Clone)]
pub struct NewSubscription {
  pub branch_id: Uuid,
  pub list_id:   i64,
  pub draft:     Draft,
}

/// A stored subscription. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
  pub subscription_id: Uuid,
  pub branch_id:       Uuid,
  /// Mailing list the contact was routed to.
  pub list_id:         i64,
  pub created_at:      DateTime<Utc>,
  pub draft:           Draft,
}
