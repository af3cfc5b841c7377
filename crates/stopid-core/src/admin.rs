//! The administrator principal.
//!
//! Operations that only an administrator may perform take an `&Admin`
//! argument. The web layer produces one from a verified session; nothing in
//! this crate checks credentials.

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
  username: String,
}

impl Admin {
  pub fn new(username: impl Into<String>) -> Self {
    Self { username: username.into() }
  }

  pub fn username(&self) -> &str { &self.username }
}
