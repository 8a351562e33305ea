//! The `SubscriptionStore` trait.
//!
//! Implemented by storage backends (e.g. `kiosk-store-sqlite`). The HTTP layer
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  branch::{Branch, NewBranch},
  subscription::{NewSubscription, Subscription},
};

/// Abstraction over the branch registry and subscription log.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Branches ──────────────────────────────────────────────────────────

  /// Register a new, active branch. Fails if the code is already taken.
  fn add_branch(
    &self,
    input: NewBranch,
  ) -> impl Future<Output = Result<Branch, Self::Error>> + Send + '_;

  /// Look up a branch by its (normalised, upper-case) code, active or not.
  fn get_branch<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Branch>, Self::Error>> + Send + 'a;

  /// List branches ordered by name, optionally only the active ones.
  fn list_branches(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<Branch>, Self::Error>> + Send + '_;

  /// Flip a branch's active flag. Returns the updated branch, or `None` if
  /// no branch has that code.
  fn set_branch_active<'a>(
    &'a self,
    code: &'a str,
    active: bool,
  ) -> impl Future<Output = Result<Option<Branch>, Self::Error>> + Send + 'a;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Persist an accepted subscription. `created_at` is set by the store.
  fn record_subscription(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  fn get_subscription(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// Most recent subscriptions first.
  fn list_subscriptions(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;
}
