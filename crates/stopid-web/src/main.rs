//! StopIDCheck server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus the
//! environment, opens the SQLite catalogue, seeds it when empty, reconciles
//! it against the configured source file, and serves the site over HTTP.
//!
//! # Password hash generation
//!
//! To generate an argon2 PHC string for `admin_password`:
//!
//! ```
//! cargo run -p stopid-web --bin stopid-server -- --hash-password
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use stopid_core::{
  settings::Settings,
  sync::{SyncMode, sync_from_file},
};
use stopid_store_sqlite::SqliteStore;
use stopid_web::{AppState, auth::AuthConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "StopIDCheck web server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let mut settings = Settings::load(Some(cli.config.as_path())).context("failed to load settings")?;
  settings.database_path = expand_tilde(&settings.database_path);
  settings.sync_source = expand_tilde(&settings.sync_source);

  if settings.uses_default_secret() {
    tracing::warn!("secret_key is the built-in default; set SECRET_KEY before exposing the server");
  }

  // Open SQLite store.
  if let Some(parent) = settings.database_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let store = SqliteStore::open(&settings.database_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.database_path))?;

  store.seed_if_empty().await.context("failed to seed catalogue")?;

  if settings.sync_on_startup {
    let mode = SyncMode::from_prune_flag(settings.prune_on_startup);
    match sync_from_file(&store, &settings.sync_source, mode).await {
      Ok(report) => tracing::info!(?mode, %report, "startup sync completed"),
      Err(stopid_core::Error::SourceMissing(path)) => {
        tracing::warn!(path = %path.display(), "sync source not found, skipping startup sync");
      }
      Err(e) => return Err(e).context("startup sync failed"),
    }
  }

  // Build application state.
  let auth = AuthConfig::from_settings(&settings)
    .map_err(|e| anyhow::anyhow!("invalid secret key: {e}"))?;
  let address = settings.address();
  let state = AppState::new(store, settings, auth);

  let app = stopid_web::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
