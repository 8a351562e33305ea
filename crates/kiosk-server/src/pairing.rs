//! Setup-key verification and the `kiosk-branch` cookie.
//!
//! Pairing is guarded by a shared setup key. The server only ever stores its
//! argon2 PHC hash; the plain key arrives either as the `key` query parameter
//! or in the [`SETUP_KEY_HEADER`] header.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{FromRequestParts, Query},
  http::{HeaderMap, HeaderValue, header, request::Parts},
};
use kiosk_core::{mailing::MailingList, store::SubscriptionStore};
use rand_core::OsRng;
use serde::Deserialize;

use crate::{AppState, error::ApiError};

pub const KIOSK_COOKIE: &str = "kiosk-branch";
pub const SETUP_KEY_HEADER: &str = "x-setup-key";
/// Roughly a century.
pub const COOKIE_MAX_AGE_SECS: u64 = 3_153_600_000;

// ─── Setup key ───────────────────────────────────────────────────────────────

/// Hash a setup key into the PHC string stored as `setup_key_hash`.
pub fn hash_setup_key(key: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(key.as_bytes(), &salt)?.to_string())
}

/// Check `presented` against the configured hash.
///
/// A server without a configured hash refuses every pairing attempt.
pub fn verify_setup_key(presented: Option<&str>, hash: Option<&str>) -> Result<(), ApiError> {
  let (Some(presented), Some(hash)) = (presented, hash) else {
    return Err(ApiError::Unauthorized);
  };
  if presented.is_empty() {
    return Err(ApiError::Unauthorized);
  }

  let parsed = PasswordHash::new(hash).map_err(|e| {
    tracing::warn!(error = %e, "configured setup_key_hash is not a valid PHC string");
    ApiError::Unauthorized
  })?;

  Argon2::default()
    .verify_password(presented.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthorized)
}

#[derive(Deserialize)]
struct KeyParam {
  key: Option<String>,
}

/// Zero-size marker: present in a handler means the request carried a valid
/// setup key.
pub struct SetupAuthorized;

impl<S, M> FromRequestParts<AppState<S, M>> for SetupAuthorized
where
  S: SubscriptionStore + 'static,
  M: MailingList + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    // An empty `?key=` falls through to the header.
    let from_query = Query::<KeyParam>::try_from_uri(&parts.uri)
      .ok()
      .and_then(|Query(p)| p.key)
      .filter(|k| !k.is_empty());
    let from_header = parts
      .headers
      .get(SETUP_KEY_HEADER)
      .and_then(|v| v.to_str().ok())
      .filter(|k| !k.is_empty())
      .map(str::to_owned);

    verify_setup_key(
      from_query.or(from_header).as_deref(),
      state.config.setup_key_hash.as_deref(),
    )?;
    Ok(SetupAuthorized)
  }
}

// ─── Cookie ──────────────────────────────────────────────────────────────────

/// The branch code carried by the request's `kiosk-branch` cookie, if any.
pub fn kiosk_cookie(headers: &HeaderMap) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == KIOSK_COOKIE)
    .map(|(_, value)| value.trim().to_owned())
    .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value binding this browser to `code`.
pub fn pairing_cookie(code: &str, secure: bool) -> Result<HeaderValue, ApiError> {
  let mut cookie = format!(
    "{KIOSK_COOKIE}={code}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax"
  );
  if secure {
    cookie.push_str("; Secure");
  }
  HeaderValue::from_str(&cookie).map_err(|_| ApiError::BadRequest("Invalid branch code".into()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashed_key_verifies_and_wrong_key_does_not() {
    let hash = hash_setup_key("open-sesame").unwrap();
    assert!(verify_setup_key(Some("open-sesame"), Some(&hash)).is_ok());
    assert!(matches!(
      verify_setup_key(Some("guess"), Some(&hash)),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn missing_key_or_hash_is_unauthorized() {
    let hash = hash_setup_key("k").unwrap();
    assert!(verify_setup_key(None, Some(&hash)).is_err());
    assert!(verify_setup_key(Some(""), Some(&hash)).is_err());
    assert!(verify_setup_key(Some("k"), None).is_err());
    assert!(verify_setup_key(Some("k"), Some("not-a-phc-string")).is_err());
  }

  #[test]
  fn cookie_is_found_among_others() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::COOKIE,
      HeaderValue::from_static("theme=dark; kiosk-branch=PD; lang=de"),
    );
    assert_eq!(kiosk_cookie(&headers).as_deref(), Some("PD"));
  }

  #[test]
  fn absent_or_empty_cookie_is_none() {
    let mut headers = HeaderMap::new();
    assert_eq!(kiosk_cookie(&headers), None);
    headers.insert(header::COOKIE, HeaderValue::from_static("kiosk-branch="));
    assert_eq!(kiosk_cookie(&headers), None);
  }

  #[test]
  fn pairing_cookie_attributes() {
    let plain = pairing_cookie("PD", false).unwrap();
    assert_eq!(
      plain.to_str().unwrap(),
      "kiosk-branch=PD; Path=/; Max-Age=3153600000; HttpOnly; SameSite=Lax"
    );
    let secure = pairing_cookie("PD", true).unwrap();
    assert!(secure.to_str().unwrap().ends_with("; Secure"));
  }
}
