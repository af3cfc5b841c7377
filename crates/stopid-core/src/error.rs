//! Error types for `stopid-core`.

use std::path::PathBuf;

use thiserror::Error;

use crate::{site::SiteId, suggestion::SuggestionId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("site not found: {0}")]
  SiteNotFound(SiteId),

  #[error("suggestion not found: {0}")]
  SuggestionNotFound(SuggestionId),

  #[error("a site named {0:?} already exists")]
  DuplicateSite(String),

  #[error("sync source not found: {}", .0.display())]
  SourceMissing(PathBuf),

  #[error("invalid sync source: {0}")]
  InvalidSource(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A submission rejected before it reached the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", describe(.missing, .invalid))]
pub struct ValidationError {
  /// Form fields that were required but left blank, in form order.
  pub missing: Vec<&'static str>,
  /// Fields whose value was present but unusable.
  pub invalid: Vec<&'static str>,
}

impl ValidationError {
  pub fn is_empty(&self) -> bool { self.missing.is_empty() && self.invalid.is_empty() }
}

fn describe(missing: &[&str], invalid: &[&str]) -> String {
  let mut parts = Vec::new();
  if !missing.is_empty() {
    parts.push(format!("missing required fields: {}", missing.join(", ")));
  }
  if !invalid.is_empty() {
    parts.push(format!("invalid fields: {}", invalid.join(", ")));
  }
  parts.join("; ")
}
