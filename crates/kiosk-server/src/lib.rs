//! HTTP layer for the kiosk newsletter form.
//!
//! Exposes an axum [`Router`] serving the branch list, kiosk pairing and the
//! subscription endpoint, backed by any [`SubscriptionStore`] and forwarding
//! accepted contacts to any [`MailingList`].
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET`  | `/api/branches` | [`handlers::branches::list`] |
//! | `GET`  | `/api/kiosk/check` | [`handlers::kiosk::check`] |
//! | `GET`  | `/api/kiosk/pair` | [`handlers::kiosk::pair`] |
//! | `POST` | `/api/subscribe` | [`handlers::subscribe::create`] |

pub mod brevo;
pub mod error;
pub mod handlers;
pub mod pairing;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use kiosk_core::{mailing::{ListRouting, MailingList}, store::SubscriptionStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use brevo::BrevoConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `KIOSK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// PHC string produced by `server hash-key`. Pairing is refused when unset.
  #[serde(default)]
  pub setup_key_hash: Option<String>,
  /// Adds `Secure` to the pairing cookie.
  #[serde(default)]
  pub secure_cookies: bool,
  #[serde(default)]
  pub brevo:          BrevoConfig,
  #[serde(default)]
  pub lists:          ListRouting,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M> {
  pub store:  Arc<S>,
  pub mailer: Arc<M>,
  pub config: Arc<ServerConfig>,
}

impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      mailer: Arc::clone(&self.mailer),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the kiosk API.
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: SubscriptionStore + 'static,
  M: MailingList + 'static,
{
  Router::new()
    .route("/api/branches",    get(handlers::branches::list::<S, M>))
    .route("/api/kiosk/check", get(handlers::kiosk::check))
    .route("/api/kiosk/pair",  get(handlers::kiosk::pair::<S, M>))
    .route("/api/subscribe",   post(handlers::subscribe::create::<S, M>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
