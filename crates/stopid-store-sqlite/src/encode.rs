//! Row types and conversions between SQLite columns and domain types.
//!
//! Timestamps are stored as RFC 3339 strings. Every other column maps to a
//! plain `String` or `i64`.

use chrono::{DateTime, Utc};
use stopid_core::{
  site::{Alternative, Site, SiteRecord},
  suggestion::{ProposedAlternative, Suggestion},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Sites ───────────────────────────────────────────────────────────────────

/// Column list matching [`site_from_row`].
pub const SITE_COLUMNS: &str = "id, name, url, category, description, verification_type, \
                                context, date_in_effect, status, country, sources";

pub fn site_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Site> {
  Ok(Site::from_record(row.get(0)?, SiteRecord {
    name:              row.get(1)?,
    url:               row.get(2)?,
    category:          row.get(3)?,
    description:       row.get(4)?,
    verification_type: row.get(5)?,
    context:           row.get(6)?,
    date_in_effect:    row.get(7)?,
    status:            row.get(8)?,
    country:           row.get(9)?,
    sources:           row.get(10)?,
  }))
}

/// Insert a site, returning its new id.
pub fn insert_site(conn: &rusqlite::Connection, r: &SiteRecord) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO sites (
       name, url, category, description, verification_type,
       context, date_in_effect, status, country, sources
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    rusqlite::params![
      r.name,
      r.url,
      r.category,
      r.description,
      r.verification_type,
      r.context,
      r.date_in_effect,
      r.status,
      r.country,
      r.sources,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update_site(conn: &rusqlite::Connection, id: i64, r: &SiteRecord) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE sites SET
       name = ?2, url = ?3, category = ?4, description = ?5, verification_type = ?6,
       context = ?7, date_in_effect = ?8, status = ?9, country = ?10, sources = ?11
     WHERE id = ?1",
    rusqlite::params![
      id,
      r.name,
      r.url,
      r.category,
      r.description,
      r.verification_type,
      r.context,
      r.date_in_effect,
      r.status,
      r.country,
      r.sources,
    ],
  )?;
  Ok(())
}

// ─── Alternatives ────────────────────────────────────────────────────────────

pub const ALTERNATIVE_COLUMNS: &str = "id, site_id, alt_name, alt_url, alt_description";

pub fn alternative_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Alternative> {
  Ok(Alternative {
    id:              row.get(0)?,
    site_id:         row.get(1)?,
    alt_name:        row.get(2)?,
    alt_url:         row.get(3)?,
    alt_description: row.get(4)?,
  })
}

// ─── Suggestions ─────────────────────────────────────────────────────────────

/// Raw values read directly from a `suggestions` row.
pub struct RawSuggestion {
  pub id:                i64,
  pub name:              String,
  pub url:               String,
  pub category:          String,
  pub verification_type: String,
  pub country:           String,
  pub description:       String,
  pub submitted_at:      String,
}

pub const SUGGESTION_COLUMNS: &str =
  "id, name, url, category, verification_type, country, description, submitted_at";

impl RawSuggestion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      name:              row.get(1)?,
      url:               row.get(2)?,
      category:          row.get(3)?,
      verification_type: row.get(4)?,
      country:           row.get(5)?,
      description:       row.get(6)?,
      submitted_at:      row.get(7)?,
    })
  }

  /// The site an approval creates. Fields the form does not collect stay
  /// empty.
  pub fn site_record(&self) -> SiteRecord {
    SiteRecord {
      name: self.name.clone(),
      url: self.url.clone(),
      category: self.category.clone(),
      description: self.description.clone(),
      verification_type: self.verification_type.clone(),
      country: self.country.clone(),
      ..Default::default()
    }
  }

  pub fn into_suggestion(self, alternatives: Vec<ProposedAlternative>) -> Result<Suggestion> {
    Ok(Suggestion {
      id: self.id,
      name: self.name,
      url: self.url,
      category: self.category,
      verification_type: self.verification_type,
      country: self.country,
      description: self.description,
      alternatives,
      submitted_at: decode_dt(&self.submitted_at)?,
    })
  }
}

/// Proposed alternatives of one suggestion, in submission order.
pub fn proposed_alternatives(
  conn: &rusqlite::Connection,
  suggestion_id: i64,
) -> rusqlite::Result<Vec<ProposedAlternative>> {
  let mut stmt = conn.prepare(
    "SELECT name, url, description FROM suggestion_alternatives
     WHERE suggestion_id = ?1 ORDER BY position",
  )?;
  let rows = stmt
    .query_map([suggestion_id], |row| {
      Ok(ProposedAlternative {
        name:        row.get(0)?,
        url:         row.get(1)?,
        description: row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
