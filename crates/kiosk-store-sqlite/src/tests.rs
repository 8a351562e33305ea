//! Integration tests for `SqliteStore` against an in-memory database.

use kiosk_core::{
  branch::NewBranch,
  draft::{Child, Draft, Gender},
  store::SubscriptionStore,
  subscription::NewSubscription,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn branch(code: &str, name: &str) -> NewBranch {
  NewBranch::new(code, name).expect("valid branch")
}

// ─── Branches ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_branch() {
  let s = store().await;

  let added = s
    .add_branch(branch("pd", "Parndorf").with_description("Outlet centre"))
    .await
    .unwrap();
  assert_eq!(added.code, "PD");
  assert!(added.is_active);

  let fetched = s.get_branch("PD").await.unwrap().expect("branch exists");
  assert_eq!(fetched.id, added.id);
  assert_eq!(fetched.description.as_deref(), Some("Outlet centre"));
}

#[tokio::test]
async fn lookup_is_case_insensitive() {
  let s = store().await;
  s.add_branch(branch("GRZ", "Graz")).await.unwrap();
  assert!(s.get_branch("grz").await.unwrap().is_some());
}

#[tokio::test]
async fn get_branch_missing_or_malformed_returns_none() {
  let s = store().await;
  assert!(s.get_branch("NOPE").await.unwrap().is_none());
  assert!(s.get_branch("not a code").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_code_is_rejected() {
  let s = store().await;
  s.add_branch(branch("PD", "Parndorf")).await.unwrap();
  let err = s.add_branch(branch("pd", "Parndorf again")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateBranch(code) if code == "PD"));
}

#[tokio::test]
async fn list_branches_orders_by_name_and_filters_inactive() {
  let s = store().await;
  s.add_branch(branch("VIE", "Wien")).await.unwrap();
  s.add_branch(branch("GRZ", "Graz")).await.unwrap();
  s.add_branch(branch("PD", "Parndorf")).await.unwrap();

  let names: Vec<_> = s
    .list_branches(true)
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.name)
    .collect();
  assert_eq!(names, ["Graz", "Parndorf", "Wien"]);

  s.set_branch_active("GRZ", false).await.unwrap();
  let active = s.list_branches(true).await.unwrap();
  assert_eq!(active.len(), 2);
  assert_eq!(active[0].code, "PD");

  let all = s.list_branches(false).await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn set_branch_active_round_trip() {
  let s = store().await;
  s.add_branch(branch("PD", "Parndorf")).await.unwrap();

  let off = s.set_branch_active("PD", false).await.unwrap().unwrap();
  assert!(!off.is_active);
  let on = s.set_branch_active("pd", true).await.unwrap().unwrap();
  assert!(on.is_active);

  assert!(s.set_branch_active("XX", true).await.unwrap().is_none());
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

fn anna() -> Draft {
  Draft {
    first_name: "Anna".into(),
    last_name: "Muster".into(),
    email: "anna@example.com".into(),
    dob: "1990-01-01".into(),
    agree: true,
    signature: "data:image/svg+xml;base64,PHN2Zy8+".into(),
    children: vec![Child {
      first_name: "Max".into(),
      last_name:  "Muster".into(),
      gender:     Gender::Male,
      dob:        "2019-05-01".into(),
    }],
    ..Draft::default()
  }
}

#[tokio::test]
async fn record_and_get_subscription() {
  let s = store().await;
  let b = s.add_branch(branch("PD", "Parndorf")).await.unwrap();

  let recorded = s
    .record_subscription(NewSubscription { branch_id: b.id, list_id: 5, draft: anna() })
    .await
    .unwrap();
  assert_eq!(recorded.branch_id, b.id);

  let fetched = s
    .get_subscription(recorded.subscription_id)
    .await
    .unwrap()
    .expect("subscription exists");
  assert_eq!(fetched.list_id, 5);
  assert_eq!(fetched.draft, anna());
  assert_eq!(fetched.created_at, recorded.created_at);
}

#[tokio::test]
async fn get_subscription_missing_returns_none() {
  let s = store().await;
  assert!(s.get_subscription(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn subscription_requires_known_branch() {
  let s = store().await;
  let result = s
    .record_subscription(NewSubscription {
      branch_id: Uuid::new_v4(),
      list_id:   6,
      draft:     anna(),
    })
    .await;
  assert!(matches!(result, Err(Error::Database(_))));
}

#[tokio::test]
async fn list_subscriptions_respects_limit() {
  let s = store().await;
  let b = s.add_branch(branch("PD", "Parndorf")).await.unwrap();
  for _ in 0..3 {
    s.record_subscription(NewSubscription { branch_id: b.id, list_id: 5, draft: anna() })
      .await
      .unwrap();
  }
  assert_eq!(s.list_subscriptions(10).await.unwrap().len(), 3);
  assert_eq!(s.list_subscriptions(2).await.unwrap().len(), 2);
}
