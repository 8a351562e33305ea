//! [`SqliteStore`] — the SQLite implementation of [`SubscriptionStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use kiosk_core::{
  branch::{Branch, NewBranch, normalize_code},
  store::SubscriptionStore,
  subscription::{NewSubscription, Subscription},
};

use crate::{
  Error, Result,
  encode::{
    BRANCH_COLUMNS, RawBranch, RawSubscription, SUBSCRIPTION_COLUMNS, encode_children,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A kiosk store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = Error;

  // ── Branches ──────────────────────────────────────────────────────────────

  async fn add_branch(&self, input: NewBranch) -> Result<Branch> {
    let code = normalize_code(&input.code)?;
    if self.get_branch(&code).await?.is_some() {
      return Err(Error::DuplicateBranch(code));
    }

    let branch = Branch {
      id: Uuid::new_v4(),
      code,
      name: input.name,
      description: input.description,
      is_active: true,
      created_at: Utc::now(),
    };

    let id_str      = encode_uuid(branch.id);
    let code        = branch.code.clone();
    let name        = branch.name.clone();
    let description = branch.description.clone();
    let at_str      = encode_dt(branch.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO branches (branch_id, code, name, description, is_active, created_at)
           VALUES (?1, ?2, ?3, ?4, 1, ?5)",
          rusqlite::params![id_str, code, name, description, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(branch)
  }

  async fn get_branch(&self, code: &str) -> Result<Option<Branch>> {
    // An unparseable code cannot name a stored branch.
    let Ok(code) = normalize_code(code) else {
      return Ok(None);
    };

    let raw: Option<RawBranch> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {BRANCH_COLUMNS} FROM branches WHERE code = ?1"),
              rusqlite::params![code],
              RawBranch::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBranch::into_branch).transpose()
  }

  async fn list_branches(&self, active_only: bool) -> Result<Vec<Branch>> {
    let raws: Vec<RawBranch> = self
      .conn
      .call(move |conn| {
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let mut stmt = conn.prepare(&format!(
          "SELECT {BRANCH_COLUMNS} FROM branches {filter} ORDER BY name ASC, code ASC"
        ))?;
        let rows = stmt
          .query_map([], RawBranch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBranch::into_branch).collect()
  }

  async fn set_branch_active(&self, code: &str, active: bool) -> Result<Option<Branch>> {
    let Ok(code) = normalize_code(code) else {
      return Ok(None);
    };

    let lookup = code.clone();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE branches SET is_active = ?1 WHERE code = ?2",
          rusqlite::params![active, code],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_branch(&lookup).await
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn record_subscription(&self, input: NewSubscription) -> Result<Subscription> {
    let subscription = Subscription {
      subscription_id: Uuid::new_v4(),
      branch_id:       input.branch_id,
      list_id:         input.list_id,
      created_at:      Utc::now(),
      draft:           input.draft,
    };

    let id_str        = encode_uuid(subscription.subscription_id);
    let branch_id_str = encode_uuid(subscription.branch_id);
    let list_id       = subscription.list_id;
    let at_str        = encode_dt(subscription.created_at);
    let children_json = encode_children(&subscription.draft.children)?;
    let d             = subscription.draft.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO subscriptions ({SUBSCRIPTION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
          ),
          rusqlite::params![
            id_str,
            branch_id_str,
            list_id,
            at_str,
            d.first_name,
            d.last_name,
            d.email,
            d.dob,
            d.phone,
            d.street,
            d.postal_code,
            d.city,
            d.province,
            d.country,
            d.branch_code,
            d.agree,
            d.signature,
            children_json,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(subscription)
  }

  async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE subscription_id = ?1"
              ),
              rusqlite::params![id_str],
              RawSubscription::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  async fn list_subscriptions(&self, limit: usize) -> Result<Vec<Subscription>> {
    let limit_val = limit as i64;

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
           ORDER BY created_at DESC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawSubscription::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubscription::into_subscription)
      .collect()
  }
}
