//! `stopid`: command-line maintenance for the StopIDCheck catalogue.
//!
//! # Usage
//!
//! ```
//! stopid sync --source data/sites.json --prune
//! stopid sites --country FR --country UK --query yoti
//! stopid --config /etc/stopid.toml sites --category "Réseaux sociaux" --json
//! ```

mod table;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use stopid_api::view::SiteView;
use stopid_core::{
  filter::{MatchMode, SiteFilter},
  settings::Settings,
  store::CatalogStore,
  sync::{SyncMode, sync_from_file},
};
use stopid_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "stopid", about = "Maintain and query the StopIDCheck catalogue")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Reconcile the catalogue against a JSON source document.
  Sync {
    /// Source document; defaults to the configured `sync_source`.
    #[arg(long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Delete sites and alternatives the source no longer lists.
    #[arg(long)]
    prune: bool,
  },

  /// List catalogue sites.
  Sites(SitesArgs),
}

#[derive(Args, Debug, Default)]
struct SitesArgs {
  /// Category to include; repeat to allow several.
  #[arg(long)]
  category: Vec<String>,

  /// Verification keyword to include; repeat to allow several.
  #[arg(long)]
  verification_type: Vec<String>,

  /// Country or region to include; repeat to allow several.
  #[arg(long)]
  country: Vec<String>,

  /// Free-text search.
  #[arg(short, long)]
  query: Option<String>,

  /// Compare values for equality instead of by substring.
  #[arg(long)]
  exact: bool,

  /// Print JSON instead of a table.
  #[arg(long)]
  json: bool,
}

impl SitesArgs {
  fn filter(&self) -> SiteFilter {
    SiteFilter {
      mode:               if self.exact { MatchMode::Exact } else { MatchMode::Substring },
      categories:         self.category.clone(),
      verification_types: self.verification_type.clone(),
      countries:          self.country.clone(),
      text:               self.query.clone(),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(Some(cli.config.as_path())).context("loading settings")?;
  let store = open_store(&settings).await?;

  match cli.command {
    Command::Sync { source, prune } => {
      let source = source.unwrap_or_else(|| settings.sync_source.clone());
      sync(&store, source, SyncMode::from_prune_flag(prune)).await
    }
    Command::Sites(args) => sites(&store, &args).await,
  }
}

async fn open_store(settings: &Settings) -> Result<SqliteStore> {
  let path = &settings.database_path;
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  SqliteStore::open(path)
    .await
    .with_context(|| format!("opening store at {}", path.display()))
}

// ─── Commands ─────────────────────────────────────────────────────────────────

/// A missing source file is reported and leaves the store untouched.
async fn sync(store: &SqliteStore, source: PathBuf, mode: SyncMode) -> Result<()> {
  match sync_from_file(store, &source, mode).await {
    Ok(report) => {
      tracing::info!(source = %source.display(), ?mode, "sync completed");
      println!("{report}");
      Ok(())
    }
    Err(stopid_core::Error::SourceMissing(path)) => {
      tracing::warn!(path = %path.display(), "sync source not found, nothing to do");
      Ok(())
    }
    Err(e) => Err(e).with_context(|| format!("syncing from {}", source.display())),
  }
}

async fn sites(store: &SqliteStore, args: &SitesArgs) -> Result<()> {
  let sites = store
    .list_sites(&args.filter())
    .await
    .context("listing sites")?;
  let views: Vec<SiteView> = sites.into_iter().map(SiteView::from).collect();

  if args.json {
    println!("{}", serde_json::to_string_pretty(&views)?);
  } else {
    print!("{}", table::render(&views));
  }
  Ok(())
}
