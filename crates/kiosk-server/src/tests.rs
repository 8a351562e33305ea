//! Router integration tests against an in-memory store and a recording
//! mailing list.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use kiosk_core::{
  branch::NewBranch,
  mailing::{ListRouting, MailingList, NewContact},
  store::SubscriptionStore,
};
use kiosk_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt as _;

use crate::{AppState, ServerConfig, brevo::BrevoConfig, pairing::hash_setup_key, router};

const SETUP_KEY: &str = "let-me-in";

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// Records every contact it is handed; with `fail` set it then reports an
/// upstream error.
struct RecordingMailer {
  tx:   mpsc::UnboundedSender<NewContact>,
  fail: bool,
}

impl MailingList for RecordingMailer {
  type Error = std::io::Error;

  async fn add_contact(&self, contact: NewContact) -> Result<(), Self::Error> {
    let _ = self.tx.send(contact);
    if self.fail {
      return Err(std::io::Error::other("provider unavailable"));
    }
    Ok(())
  }
}

struct Harness {
  state:    AppState<SqliteStore, RecordingMailer>,
  contacts: mpsc::UnboundedReceiver<NewContact>,
}

impl Harness {
  async fn new() -> Self { Self::with_mailer(false).await }

  async fn with_mailer(fail: bool) -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (tx, contacts) = mpsc::unbounded_channel();
    let state = AppState {
      store:  Arc::new(store),
      mailer: Arc::new(RecordingMailer { tx, fail }),
      config: Arc::new(ServerConfig {
        host:           "127.0.0.1".to_string(),
        port:           3000,
        store_path:     PathBuf::from(":memory:"),
        setup_key_hash: Some(hash_setup_key(SETUP_KEY).unwrap()),
        secure_cookies: false,
        brevo:          BrevoConfig::default(),
        lists:          ListRouting::default(),
      }),
    };
    Self { state, contacts }
  }

  async fn with_branches() -> Self { Self::seeded(Self::new().await).await }

  async fn seeded(h: Self) -> Self {
    for (code, name) in [("PD", "Parndorf"), ("GRZ", "Graz")] {
      h.state
        .store
        .add_branch(NewBranch::new(code, name).unwrap())
        .await
        .unwrap();
    }
    h
  }

  async fn send(&self, req: Request<Body>) -> Response {
    router(self.state.clone()).oneshot(req).await.unwrap()
  }

  async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
      builder = builder.header(header::COOKIE, c);
    }
    self.send(builder.body(Body::empty()).unwrap()).await
  }

  async fn subscribe(&self, body: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder()
      .method("POST")
      .uri("/api/subscribe")
      .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
      builder = builder.header(header::COOKIE, c);
    }
    self.send(builder.body(Body::from(body.to_owned())).unwrap()).await
  }

  async fn next_contact(&mut self) -> NewContact {
    tokio::time::timeout(Duration::from_secs(5), self.contacts.recv())
      .await
      .expect("contact forwarded in time")
      .expect("mailer channel open")
  }
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn anna() -> Value {
  json!({
    "firstName": "Anna",
    "lastName": "Muster",
    "email": "anna@example.com",
    "dob": "1990-01-01",
    "agree": true,
    "signature": "data:image/svg+xml;base64,PHN2Zy8+",
    "children": [],
  })
}

// ─── Branches ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn branches_lists_active_by_name() {
  let h = Harness::with_branches().await;
  h.state.store.set_branch_active("PD", false).await.unwrap();

  let resp = h.get("/api/branches", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  let codes: Vec<_> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|b| b["code"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(codes, ["GRZ"]);
}

// ─── Subscribe ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn minimal_subscription_succeeds() {
  let mut h = Harness::with_branches().await;

  let resp = h.subscribe(&anna().to_string(), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    json_body(resp).await,
    json!({ "message": "Subscription created successfully", "success": true })
  );

  // No code and no cookie: first active branch by name is Graz.
  let contact = h.next_contact().await;
  assert_eq!(contact.email, "anna@example.com");
  assert_eq!(contact.list_ids, vec![6]);
  assert_eq!(h.state.store.list_subscriptions(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn mailing_list_failure_keeps_the_submission() {
  let mut h = Harness::seeded(Harness::with_mailer(true).await).await;

  let resp = h.subscribe(&anna().to_string(), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["success"], true);

  // The forward was attempted and failed; the record stays.
  assert_eq!(h.next_contact().await.email, "anna@example.com");
  let stored = h.state.store.list_subscriptions(10).await.unwrap();
  assert_eq!(stored.len(), 1);
  assert_eq!(stored[0].draft.first_name, "Anna");
}

#[tokio::test]
async fn partial_address_requires_city() {
  let h = Harness::with_branches().await;
  let mut body = anna();
  body["street"] = json!("Hauptstraße 1");
  body["postalCode"] = json!("7111");
  body["province"] = json!("Burgenland");
  body["country"] = json!("Austria");

  let resp = h.subscribe(&body.to_string(), None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body = json_body(resp).await;
  assert_eq!(body["error"], "Validation failed");
  assert_eq!(body["details"], json!({ "city": "errors.required" }));
}

#[tokio::test]
async fn future_birth_date_is_rejected() {
  let h = Harness::with_branches().await;
  let mut body = anna();
  body["dob"] = json!("2999-01-01");
  body["children"] = json!([
    { "firstName": "Max", "lastName": "Muster", "gender": "male", "dob": "2999-01-01" }
  ]);

  let resp = h.subscribe(&body.to_string(), None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let details = json_body(resp).await["details"].clone();
  assert_eq!(details["dob"], "errors.invalidDate");
  assert_eq!(details["children.0.dob"], "errors.invalidDate");
}

#[tokio::test]
async fn malformed_body_is_invalid_json() {
  let h = Harness::with_branches().await;
  let resp = h.subscribe("{ not json", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(
    json_body(resp).await,
    json!({ "error": "Invalid JSON", "details": "Request body must be valid JSON" })
  );
}

#[tokio::test]
async fn no_active_branch_is_not_found() {
  let h = Harness::new().await;
  let resp = h.subscribe(&anna().to_string(), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert_eq!(
    json_body(resp).await,
    json!({
      "error": "Invalid branch code",
      "details": { "branchCode": "errors.branchNotFound" },
    })
  );
}

#[tokio::test]
async fn unknown_explicit_branch_is_not_found() {
  let h = Harness::with_branches().await;
  let mut body = anna();
  body["branchCode"] = json!("XYZ");
  let resp = h.subscribe(&body.to_string(), Some("kiosk-branch=PD")).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn explicit_branch_code_beats_cookie() {
  let mut h = Harness::with_branches().await;
  let mut body = anna();
  body["branchCode"] = json!("pd");
  let resp = h.subscribe(&body.to_string(), Some("kiosk-branch=GRZ")).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(h.next_contact().await.list_ids, vec![5]);
}

// ─── Pairing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unpaired_kiosk_pairs_then_submits_to_branch_list() {
  let mut h = Harness::with_branches().await;

  let resp = h.get("/api/kiosk/check", None).await;
  assert_eq!(json_body(resp).await, json!({ "kioskBranchCookie": null }));

  let resp = h
    .get(&format!("/api/kiosk/pair?branch=pd&key={SETUP_KEY}"), None)
    .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let set_cookie = resp
    .headers()
    .get(header::SET_COOKIE)
    .expect("cookie set")
    .to_str()
    .unwrap()
    .to_owned();
  assert!(set_cookie.starts_with("kiosk-branch=PD;"), "{set_cookie}");
  let body = json_body(resp).await;
  assert_eq!(body["message"], "Kiosk paired");
  assert_eq!(body["branch"]["code"], "PD");

  let cookie = "kiosk-branch=PD";
  let resp = h.get("/api/kiosk/check", Some(cookie)).await;
  assert_eq!(json_body(resp).await, json!({ "kioskBranchCookie": "PD" }));

  let resp = h.subscribe(&anna().to_string(), Some(cookie)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(h.next_contact().await.list_ids, vec![5]);

  let stored = h.state.store.list_subscriptions(1).await.unwrap();
  assert_eq!(stored[0].list_id, 5);
}

#[tokio::test]
async fn wrong_setup_key_is_unauthorized_without_cookie() {
  let h = Harness::with_branches().await;
  let resp = h.get("/api/kiosk/pair?branch=PD&key=nope", None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().get(header::SET_COOKIE).is_none());
  assert_eq!(json_body(resp).await, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn setup_key_is_checked_before_branch() {
  let h = Harness::with_branches().await;
  let resp = h.get("/api/kiosk/pair", None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn setup_key_header_is_accepted() {
  let h = Harness::with_branches().await;
  let req = Request::builder()
    .uri("/api/kiosk/pair?branch=GRZ")
    .header("x-setup-key", SETUP_KEY)
    .body(Body::empty())
    .unwrap();
  assert_eq!(h.send(req).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn pairing_needs_an_active_known_branch() {
  let h = Harness::with_branches().await;
  h.state.store.set_branch_active("GRZ", false).await.unwrap();

  for uri in [
    format!("/api/kiosk/pair?key={SETUP_KEY}"),
    format!("/api/kiosk/pair?branch=XYZ&key={SETUP_KEY}"),
    format!("/api/kiosk/pair?branch=GRZ&key={SETUP_KEY}"),
  ] {
    let resp = h.get(&uri, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
  }
}

#[tokio::test]
async fn empty_key_param_falls_back_to_header() {
  let h = Harness::with_branches().await;
  let req = Request::builder()
    .uri("/api/kiosk/pair?branch=GRZ&key=")
    .header("x-setup-key", SETUP_KEY)
    .body(Body::empty())
    .unwrap();
  let resp = h.send(req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().get(header::SET_COOKIE).is_some());
}
