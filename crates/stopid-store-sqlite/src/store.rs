//! [`SqliteStore`], the SQLite implementation of [`CatalogStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use stopid_core::{
  admin::Admin,
  filter::{Facets, SiteFilter},
  site::{Alternative, Site, SiteId},
  source::SourceDocument,
  store::CatalogStore,
  suggestion::{NewSuggestion, ProposedAlternative, Suggestion, SuggestionId},
  sync::{self, Snapshot, SyncMode, SyncPlan, SyncReport},
};

use crate::{
  Error, Result,
  encode::{
    ALTERNATIVE_COLUMNS, RawSuggestion, SITE_COLUMNS, SUGGESTION_COLUMNS, alternative_from_row,
    encode_dt, insert_site, proposed_alternatives, site_from_row, update_site,
  },
  query,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalogue backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Result of the approval transaction, decided on the connection thread.
enum Approval {
  Missing,
  Duplicate(String),
  Approved(Site),
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn site_count(&self) -> Result<usize> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM sites", [], |r| r.get(0))?))
      .await?;
    Ok(count as usize)
  }

  /// Load the embedded sample catalogue when the store holds no sites.
  /// Returns `None` if the store was already populated.
  pub async fn seed_if_empty(&self) -> Result<Option<SyncReport>> {
    if self.site_count().await? > 0 {
      return Ok(None);
    }
    let seed = SourceDocument::seed()?;
    let report = self.reconcile(&seed, SyncMode::Merge).await?;
    tracing::info!(%report, "seeded empty catalogue");
    Ok(Some(report))
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run raw SQL on the connection, e.g. to install failure triggers.
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self.conn.call(move |conn| Ok(conn.execute_batch(sql)?)).await?;
    Ok(())
  }
}

// ─── Reconciliation helpers ──────────────────────────────────────────────────

fn load_snapshot(conn: &rusqlite::Connection) -> rusqlite::Result<Snapshot> {
  let mut stmt = conn.prepare(&format!("SELECT {SITE_COLUMNS} FROM sites"))?;
  let sites = stmt
    .query_map([], site_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(&format!("SELECT {ALTERNATIVE_COLUMNS} FROM alternatives"))?;
  let alternatives = stmt
    .query_map([], alternative_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Snapshot { sites, alternatives })
}

fn apply_plan(conn: &rusqlite::Connection, plan: &SyncPlan) -> rusqlite::Result<()> {
  for id in &plan.alternative_deletes {
    conn.execute("DELETE FROM alternatives WHERE id = ?1", [id])?;
  }
  for id in &plan.site_deletes {
    conn.execute("DELETE FROM sites WHERE id = ?1", [id])?;
  }

  let mut site_ids: HashMap<&str, SiteId> = HashMap::new();
  for record in &plan.site_inserts {
    site_ids.insert(record.name.as_str(), insert_site(conn, record)?);
  }
  for (id, record) in &plan.site_updates {
    update_site(conn, *id, record)?;
    site_ids.insert(record.name.as_str(), *id);
  }

  for (id, alt) in &plan.alternative_updates {
    conn.execute(
      "UPDATE alternatives SET alt_url = ?2, alt_description = ?3 WHERE id = ?1",
      rusqlite::params![id, alt.alt_url, alt.alt_description],
    )?;
  }
  for (site_name, alt) in &plan.alternative_inserts {
    let site_id = match site_ids.get(site_name.as_str()) {
      Some(id) => *id,
      None => conn.query_row("SELECT id FROM sites WHERE name = ?1", [site_name], |r| r.get(0))?,
    };
    conn.execute(
      "INSERT INTO alternatives (site_id, alt_name, alt_url, alt_description)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![site_id, alt.alt_name, alt.alt_url, alt.alt_description],
    )?;
  }
  Ok(())
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Sites ─────────────────────────────────────────────────────────────────

  async fn list_sites(&self, filter: &SiteFilter) -> Result<Vec<Site>> {
    let plan = query::site_list(filter);

    let sites = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&plan.sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(plan.params.iter()), site_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(sites)
  }

  async fn get_site(&self, id: SiteId) -> Result<Option<Site>> {
    let site = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?1"),
              [id],
              site_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(site)
  }

  async fn recent_sites(&self, limit: usize) -> Result<Vec<Site>> {
    let limit = limit as i64;
    let sites = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {SITE_COLUMNS} FROM sites ORDER BY id DESC LIMIT ?1"))?;
        let rows = stmt
          .query_map([limit], site_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(sites)
  }

  async fn alternatives(&self, site_id: SiteId) -> Result<Vec<Alternative>> {
    let alternatives = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ALTERNATIVE_COLUMNS} FROM alternatives
           WHERE site_id = ?1 ORDER BY alt_name COLLATE NOCASE, id"
        ))?;
        let rows = stmt
          .query_map([site_id], alternative_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(alternatives)
  }

  async fn facets(&self) -> Result<Facets> {
    let (categories, countries): (Vec<String>, Vec<String>) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT DISTINCT category FROM sites WHERE category != ''")?;
        let categories = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare("SELECT DISTINCT country FROM sites")?;
        let countries = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((categories, countries))
      })
      .await?;

    Ok(Facets::build(
      categories.iter().map(String::as_str),
      countries.iter().map(String::as_str),
    ))
  }

  // ── Suggestions ───────────────────────────────────────────────────────────

  async fn submit_suggestion(&self, input: NewSuggestion) -> Result<Suggestion> {
    let submitted_at = Utc::now();
    let at_str = encode_dt(submitted_at);
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO suggestions (
             name, url, category, verification_type, country, description, submitted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.name,
            row.url,
            row.category,
            row.verification_type,
            row.country,
            row.description,
            at_str,
          ],
        )?;
        let id = tx.last_insert_rowid();

        for (position, alt) in row.alternatives.iter().enumerate() {
          tx.execute(
            "INSERT INTO suggestion_alternatives (suggestion_id, position, name, url, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, position as i64, alt.name, alt.url, alt.description],
          )?;
        }

        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(Suggestion {
      id,
      name: input.name,
      url: input.url,
      category: input.category,
      verification_type: input.verification_type,
      country: input.country,
      description: input.description,
      alternatives: input.alternatives,
      submitted_at,
    })
  }

  async fn list_pending(&self, _admin: &Admin) -> Result<Vec<Suggestion>> {
    let raws: Vec<(RawSuggestion, Vec<ProposedAlternative>)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUGGESTION_COLUMNS} FROM suggestions ORDER BY submitted_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawSuggestion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for raw in rows {
          let alternatives = proposed_alternatives(conn, raw.id)?;
          out.push((raw, alternatives));
        }
        Ok(out)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, alternatives)| raw.into_suggestion(alternatives))
      .collect()
  }

  async fn approve(&self, admin: &Admin, id: SuggestionId) -> Result<Site> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = tx
          .query_row(
            &format!("SELECT {SUGGESTION_COLUMNS} FROM suggestions WHERE id = ?1"),
            [id],
            RawSuggestion::from_row,
          )
          .optional()?
        else {
          return Ok(Approval::Missing);
        };

        let taken = tx
          .query_row("SELECT 1 FROM sites WHERE name = ?1", [&raw.name], |_| Ok(()))
          .optional()?
          .is_some();
        if taken {
          return Ok(Approval::Duplicate(raw.name));
        }

        let record = raw.site_record();
        let site_id = insert_site(&tx, &record)?;

        for proposed in proposed_alternatives(&tx, id)? {
          let alt = proposed.to_record();
          tx.execute(
            "INSERT INTO alternatives (site_id, alt_name, alt_url, alt_description)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (site_id, alt_name) DO UPDATE SET
               alt_url = excluded.alt_url,
               alt_description = excluded.alt_description",
            rusqlite::params![site_id, alt.alt_name, alt.alt_url, alt.alt_description],
          )?;
        }

        tx.execute("DELETE FROM suggestions WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(Approval::Approved(Site::from_record(site_id, record)))
      })
      .await?;

    match outcome {
      Approval::Missing => Err(stopid_core::Error::SuggestionNotFound(id).into()),
      Approval::Duplicate(name) => Err(stopid_core::Error::DuplicateSite(name).into()),
      Approval::Approved(site) => {
        tracing::info!(admin = admin.username(), site = %site.name, "suggestion approved");
        Ok(site)
      }
    }
  }

  async fn reject(&self, admin: &Admin, id: SuggestionId) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM suggestions WHERE id = ?1", [id])?))
      .await?;

    if removed == 0 {
      return Err(stopid_core::Error::SuggestionNotFound(id).into());
    }
    tracing::info!(admin = admin.username(), suggestion = id, "suggestion rejected");
    Ok(())
  }

  // ── Reconciliation ────────────────────────────────────────────────────────

  async fn reconcile(&self, document: &SourceDocument, mode: SyncMode) -> Result<SyncReport> {
    let document = document.clone();

    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let snapshot = load_snapshot(&tx)?;
        let plan = sync::plan(&snapshot, &document, mode);
        apply_plan(&tx, &plan)?;
        tx.commit()?;
        Ok(plan.report())
      })
      .await?;
    Ok(report)
  }
}
