//! Administrator credentials, signed session cookies and the
//! [`AdminSession`] extractor.
//!
//! A session cookie holds `username|expiry|signature`, where the signature is
//! a hex HMAC-SHA256 of `username|expiry` under the configured secret key.
//! Nothing is kept server-side.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
  response::{IntoResponse, Redirect, Response},
};
use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;
use stopid_core::{admin::Admin, settings::Settings, store::CatalogStore};

use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "stopid_session";
const SESSION_DURATION_SECS: i64 = 7 * 24 * 3600;

/// Credentials accepted as valid for this server instance, and the key that
/// signs their sessions.
#[derive(Clone)]
pub struct AuthConfig {
  pub username: String,
  /// Plaintext, or a PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password: String,
  mac:          HmacSha256,
}

impl AuthConfig {
  pub fn new(
    username: impl Into<String>,
    password: impl Into<String>,
    secret: &str,
  ) -> Result<Self, InvalidLength> {
    Ok(Self {
      username: username.into(),
      password: password.into(),
      mac:      HmacSha256::new_from_slice(secret.as_bytes())?,
    })
  }

  pub fn from_settings(settings: &Settings) -> Result<Self, InvalidLength> {
    Self::new(&settings.admin_username, &settings.admin_password, &settings.secret_key)
  }

  /// Check a login attempt against the configured account.
  pub fn check_credentials(&self, username: &str, password: &str) -> bool {
    let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());

    let password_ok = if self.password.starts_with("$argon2") {
      PasswordHash::new(&self.password)
        .map(|hash| Argon2::default().verify_password(password.as_bytes(), &hash).is_ok())
        .unwrap_or(false)
    } else {
      constant_time_eq(password.as_bytes(), self.password.as_bytes())
    };

    user_ok && password_ok
  }

  /// Create a signed session value for `username`.
  pub fn create_session(&self, username: &str) -> String {
    let expiry = chrono::Utc::now().timestamp() + SESSION_DURATION_SECS;
    self.signed(username, expiry)
  }

  fn signed(&self, username: &str, expiry: i64) -> String {
    let payload = format!("{username}|{expiry}");
    let sig = self.sign(&payload);
    format!("{payload}|{sig}")
  }

  fn sign(&self, payload: &str) -> String {
    let mut mac = self.mac.clone();
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
  }

  /// Verify a session value. Returns the administrator if the signature
  /// matches and the session has not expired.
  pub fn verify_session(&self, value: &str) -> Option<Admin> {
    let mut parts = value.rsplitn(3, '|');
    let sig = parts.next()?;
    let expiry_str = parts.next()?;
    let username = parts.next()?;

    let expected = self.sign(&format!("{username}|{expiry_str}"));
    if !constant_time_eq(sig.as_bytes(), expected.as_bytes()) {
      return None;
    }

    let expiry: i64 = expiry_str.parse().ok()?;
    if chrono::Utc::now().timestamp() > expiry {
      return None;
    }

    Some(Admin::new(username))
  }

  /// The administrator behind the request's session cookie, if any.
  pub fn admin_from_headers(&self, headers: &HeaderMap) -> Option<Admin> {
    cookie(headers, SESSION_COOKIE).and_then(|value| self.verify_session(value))
  }

  /// `Set-Cookie` value that opens a session for `username`.
  pub fn session_cookie(&self, username: &str) -> String {
    let value = self.create_session(username);
    format!(
      "{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_DURATION_SECS}"
    )
  }
}

/// `Set-Cookie` value that ends the session.
pub fn clear_session_cookie() -> String {
  format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Constant-time comparison of two byte strings.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Find one cookie in the request's `Cookie` headers.
pub(crate) fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .find_map(|h| parse_cookie(h, name))
}

fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
  header
    .split(';')
    .map(str::trim)
    .find_map(|part| part.strip_prefix(name)?.strip_prefix('='))
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// An authenticated administrator session. Handlers that take this extractor
/// are only reached with a valid session; anyone else is sent to `/login`.
pub struct AdminSession(pub Admin);

impl<S> FromRequestParts<AppState<S>> for AdminSession
where
  S: CatalogStore + 'static,
{
  type Rejection = Response;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    state
      .auth
      .admin_from_headers(&parts.headers)
      .map(AdminSession)
      .ok_or_else(|| Redirect::to("/login").into_response())
  }
}
