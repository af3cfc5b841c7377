//! Runtime settings shared by the server and the CLI.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `STOPID_*` environment variables, then the unprefixed
//! `SECRET_KEY`, `ADMIN_USER`, `ADMIN_PASSWORD` and `DATABASE_PATH`
//! variables older deployments set.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_SECRET_KEY: &str = "change-this-secret-key";

const LEGACY_OVERRIDES: &[(&str, &str)] = &[
  ("SECRET_KEY", "secret_key"),
  ("ADMIN_USER", "admin_username"),
  ("ADMIN_PASSWORD", "admin_password"),
  ("DATABASE_PATH", "database_path"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub host:             String,
  pub port:             u16,
  pub database_path:    PathBuf,
  /// Signs admin session cookies.
  pub secret_key:       String,
  pub admin_username:   String,
  /// Plaintext, or an argon2 PHC string (`$argon2id$...`).
  pub admin_password:   String,
  /// Reconciliation source read on startup and by the admin sync action.
  pub sync_source:      PathBuf,
  pub sync_on_startup:  bool,
  pub prune_on_startup: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".into(),
      port:             5000,
      database_path:    PathBuf::from("data/sites.db"),
      secret_key:       DEFAULT_SECRET_KEY.into(),
      admin_username:   "admin".into(),
      admin_password:   "password".into(),
      sync_source:      PathBuf::from("data/sites.json"),
      sync_on_startup:  true,
      prune_on_startup: false,
    }
  }
}

impl Settings {
  /// Load settings, reading `file` if it exists.
  pub fn load(file: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = file {
      builder = builder.add_source(config::File::from(path).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix("STOPID"));
    for (var, key) in LEGACY_OVERRIDES {
      builder = builder.set_override_option(*key, std::env::var(var).ok())?;
    }
    Ok(builder.build()?.try_deserialize()?)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Whether the signing key was left at its published default.
  pub fn uses_default_secret(&self) -> bool { self.secret_key == DEFAULT_SECRET_KEY }
}
