//! Brevo contacts API client implementing [`MailingList`].

use std::time::Duration;

use kiosk_core::mailing::{MailingList, NewContact};
use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_base_url() -> String { "https://api.brevo.com/v3".to_owned() }

/// `[brevo]` section of the server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BrevoConfig {
  /// Without a key, forwarding is skipped and only logged.
  #[serde(default)]
  pub api_key:  Option<String>,
  #[serde(default = "default_base_url")]
  pub base_url: String,
}

impl Default for BrevoConfig {
  fn default() -> Self {
    Self { api_key: None, base_url: default_base_url() }
  }
}

#[derive(Debug, Error)]
pub enum BrevoError {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Brevo responded {status}: {body}")]
  Status { status: u16, body: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateContact<'a> {
  #[serde(flatten)]
  contact:        &'a NewContact,
  update_enabled: bool,
}

pub struct BrevoClient {
  http:   reqwest::Client,
  config: BrevoConfig,
}

impl BrevoClient {
  pub fn new(config: BrevoConfig) -> Result<Self, BrevoError> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { http, config })
  }

  fn contacts_url(&self) -> String {
    format!("{}/contacts", self.config.base_url.trim_end_matches('/'))
  }
}

impl MailingList for BrevoClient {
  type Error = BrevoError;

  async fn add_contact(&self, contact: NewContact) -> Result<(), BrevoError> {
    let Some(api_key) = self.config.api_key.as_deref() else {
      tracing::warn!(email = %contact.email, "no Brevo API key configured; contact not forwarded");
      return Ok(());
    };

    let resp = self
      .http
      .post(self.contacts_url())
      .header("api-key", api_key)
      .json(&CreateContact { contact: &contact, update_enabled: true })
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(BrevoError::Status { status: status.as_u16(), body });
    }

    tracing::info!(email = %contact.email, lists = ?contact.list_ids, "contact forwarded to Brevo");
    Ok(())
  }
}
