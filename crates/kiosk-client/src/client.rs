//! Async HTTP client for the kiosk server.
//!
//! Owns the device's cookie jar. The `kiosk-branch` cookie is mirrored to a
//! file in the state directory so pairing survives restarts.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result, anyhow};
use kiosk_core::{
  api::{ErrorBody, KioskCheck, PairResponse},
  branch::BranchSummary,
  draft::Draft,
};
use reqwest::{
  Client, Url,
  cookie::{CookieStore as _, Jar},
};

use crate::submit::SubmitReply;

const KIOSK_COOKIE: &str = "kiosk-branch";
const COOKIE_FILE: &str = "kiosk-branch";
/// Roughly a century, matching the server-minted cookie.
const COOKIE_MAX_AGE_SECS: u64 = 3_153_600_000;

/// Connection settings for the kiosk API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:  String,
  /// Where the pairing cookie is persisted. `None` keeps it in memory only.
  pub state_dir: Option<PathBuf>,
}

/// Cheap to clone. The inner [`reqwest::Client`] and jar are `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:    Client,
  jar:       Arc<Jar>,
  base:      Url,
  state_dir: Option<PathBuf>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let base = Url::parse(&config.base_url)
      .with_context(|| format!("invalid server url {:?}", config.base_url))?;
    let jar = Arc::new(Jar::default());

    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .cookie_provider(Arc::clone(&jar))
      .build()
      .context("failed to build HTTP client")?;

    let api = Self { client, jar, base, state_dir: config.state_dir };
    if let Some(code) = api.load_persisted()? {
      tracing::info!(branch = %code, "restored kiosk pairing");
      api.set_cookie(&code);
    }
    Ok(api)
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base.as_str().trim_end_matches('/'), path)
  }

  // ── Pairing cookie ────────────────────────────────────────────────────────

  /// The branch this device is paired with, as held in the jar.
  pub fn paired_branch(&self) -> Option<String> {
    let header = self.jar.cookies(&self.base)?;
    let header = header.to_str().ok()?;
    header
      .split(';')
      .filter_map(|pair| pair.trim().split_once('='))
      .find(|(name, _)| *name == KIOSK_COOKIE)
      .map(|(_, value)| value.to_owned())
      .filter(|v| !v.is_empty())
  }

  /// Pair this device with `code` locally and persist the pairing.
  pub fn remember_branch(&self, code: &str) -> Result<()> {
    self.set_cookie(code);
    self.persist(code)
  }

  /// Drop the pairing from the jar and the state directory.
  pub fn forget_branch(&self) -> Result<()> {
    let expired = format!("{KIOSK_COOKIE}=; Path=/; Max-Age=0");
    self.jar.add_cookie_str(&expired, &self.base);

    let Some(path) = self.cookie_path() else {
      return Ok(());
    };
    match std::fs::remove_file(&path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
  }

  fn set_cookie(&self, code: &str) {
    let cookie = format!("{KIOSK_COOKIE}={code}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}");
    self.jar.add_cookie_str(&cookie, &self.base);
  }

  fn cookie_path(&self) -> Option<PathBuf> {
    self.state_dir.as_deref().map(|d| d.join(COOKIE_FILE))
  }

  fn persist(&self, code: &str) -> Result<()> {
    let Some(path) = self.cookie_path() else {
      return Ok(());
    };
    if let Some(dir) = path.parent() {
      std::fs::create_dir_all(dir)
        .with_context(|| format!("creating state directory {}", dir.display()))?;
    }
    std::fs::write(&path, code).with_context(|| format!("writing {}", path.display()))
  }

  fn load_persisted(&self) -> Result<Option<String>> {
    let Some(path) = self.cookie_path() else {
      return Ok(None);
    };
    read_code(&path)
  }

  // ── Endpoints ─────────────────────────────────────────────────────────────

  /// `GET /api/branches`
  pub async fn branches(&self) -> Result<Vec<BranchSummary>> {
    let resp = self
      .client
      .get(self.url("/branches"))
      .send()
      .await
      .context("GET /branches failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /branches → {}", resp.status()));
    }
    resp.json().await.context("deserialising branches")
  }

  /// `GET /api/kiosk/check`
  pub async fn check(&self) -> Result<KioskCheck> {
    let resp = self
      .client
      .get(self.url("/kiosk/check"))
      .send()
      .await
      .context("GET /kiosk/check failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /kiosk/check → {}", resp.status()));
    }
    resp.json().await.context("deserialising kiosk check")
  }

  /// `GET /api/kiosk/pair?branch=<code>` with the setup key in a header.
  ///
  /// The server's `Set-Cookie` lands in the jar; the code is persisted too.
  pub async fn pair(&self, branch: &str, key: &str) -> Result<PairResponse> {
    let resp = self
      .client
      .get(self.url("/kiosk/pair"))
      .query(&[("branch", branch)])
      .header("x-setup-key", key)
      .send()
      .await
      .context("GET /kiosk/pair failed")?;

    let status = resp.status();
    if !status.is_success() {
      let reason = resp
        .json::<ErrorBody>()
        .await
        .map(|b| b.error)
        .unwrap_or_default();
      return Err(anyhow!("GET /kiosk/pair → {status} {reason}"));
    }
    let paired: PairResponse = resp.json().await.context("deserialising pair response")?;
    self.persist(&paired.branch.code)?;
    Ok(paired)
  }

  /// `POST /api/subscribe`
  pub async fn subscribe(&self, draft: &Draft) -> Result<SubmitReply> {
    let resp = self
      .client
      .post(self.url("/subscribe"))
      .json(draft)
      .send()
      .await
      .context("POST /subscribe failed")?;

    let status = resp.status();
    if status.is_success() {
      return Ok(SubmitReply::Accepted);
    }
    let body = resp.json::<ErrorBody>().await.ok();
    Ok(SubmitReply::Rejected { status: status.as_u16(), body })
  }
}

fn read_code(path: &Path) -> Result<Option<String>> {
  match std::fs::read_to_string(path) {
    Ok(raw) => {
      let code = raw.trim();
      Ok((!code.is_empty()).then(|| code.to_owned()))
    }
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
  }
}
