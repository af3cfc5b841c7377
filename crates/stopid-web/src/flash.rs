//! One-shot notices carried across a redirect in a cookie.
//!
//! The cookie holds base64url(`kind\nmessage`). It is set by the response
//! that redirects and cleared by the page that displays it.

use axum::{
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};

use crate::auth::cookie;

pub const FLASH_COOKIE: &str = "stopid_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
  Success,
  Warning,
  Error,
}

impl FlashKind {
  pub fn as_str(self) -> &'static str {
    match self {
      FlashKind::Success => "success",
      FlashKind::Warning => "warning",
      FlashKind::Error => "error",
    }
  }

  fn parse(s: &str) -> Option<Self> {
    match s {
      "success" => Some(FlashKind::Success),
      "warning" => Some(FlashKind::Warning),
      "error" => Some(FlashKind::Error),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
  pub kind:    FlashKind,
  pub message: String,
}

impl Flash {
  pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
    Self { kind, message: message.into() }
  }

  pub fn success(message: impl Into<String>) -> Self { Self::new(FlashKind::Success, message) }

  pub fn warning(message: impl Into<String>) -> Self { Self::new(FlashKind::Warning, message) }

  pub fn error(message: impl Into<String>) -> Self { Self::new(FlashKind::Error, message) }

  /// Read the pending notice from the request, ignoring malformed cookies.
  pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
    let raw = cookie(headers, FLASH_COOKIE)?;
    let decoded = B64.decode(raw).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (kind, message) = text.split_once('\n')?;
    Some(Self::new(FlashKind::parse(kind)?, message))
  }

  /// `Set-Cookie` value carrying this notice to the next page.
  pub fn cookie(&self) -> String {
    let value = B64.encode(format!("{}\n{}", self.kind.as_str(), self.message));
    format!("{FLASH_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax")
  }

  /// `303 See Other` to `location`, carrying this notice.
  pub fn redirect(self, location: &str) -> Response {
    redirect_with_cookies(location, [self.cookie()])
  }
}

/// `Set-Cookie` value that discards a displayed notice.
pub const CLEAR_FLASH_COOKIE: &str = "stopid_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

/// `303 See Other` to `location` with the given `Set-Cookie` values.
pub fn redirect_with_cookies(
  location: &str,
  cookies: impl IntoIterator<Item = String>,
) -> Response {
  let mut headers = vec![(header::LOCATION, location.to_owned())];
  headers.extend(cookies.into_iter().map(|c| (header::SET_COOKIE, c)));
  (StatusCode::SEE_OTHER, axum::response::AppendHeaders(headers)).into_response()
}
