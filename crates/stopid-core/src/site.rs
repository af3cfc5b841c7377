//! Sites and their alternatives.
//!
//! A [`Site`] is a catalogued web service together with what is known about
//! the verification it enforces. Every text field is stored as-is; fields
//! such as `category` and `country` may hold several comma-separated values.

use serde::{Deserialize, Serialize};

use crate::{country, severity::Severity};

pub type SiteId = i64;
pub type AlternativeId = i64;

// ─── Site ────────────────────────────────────────────────────────────────────

/// A persisted site row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
  pub id:                SiteId,
  pub name:              String,
  pub url:               String,
  pub category:          String,
  pub description:       String,
  pub verification_type: String,
  pub context:           String,
  pub date_in_effect:    String,
  pub status:            String,
  pub country:           String,
  pub sources:           String,
}

impl Site {
  /// Build a persisted site from its identifier and field values.
  pub fn from_record(id: SiteId, record: SiteRecord) -> Self {
    Self {
      id,
      name: record.name,
      url: record.url,
      category: record.category,
      description: record.description,
      verification_type: record.verification_type,
      context: record.context,
      date_in_effect: record.date_in_effect,
      status: record.status,
      country: record.country,
      sources: record.sources,
    }
  }

  /// The field values of this site, without its identifier.
  pub fn record(&self) -> SiteRecord {
    SiteRecord {
      name:              self.name.clone(),
      url:               self.url.clone(),
      category:          self.category.clone(),
      description:       self.description.clone(),
      verification_type: self.verification_type.clone(),
      context:           self.context.clone(),
      date_in_effect:    self.date_in_effect.clone(),
      status:            self.status.clone(),
      country:           self.country.clone(),
      sources:           self.sources.clone(),
    }
  }

  pub fn severity(&self) -> Severity { Severity::classify(&self.status, &self.country) }

  /// Flag emoji for the site's country list.
  pub fn flags(&self) -> String { country::flags(&self.country) }
}

/// The writable fields of a site. Used for inserts and in-place updates,
/// where the identifier is either not yet known or not being changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
  pub name:              String,
  pub url:               String,
  pub category:          String,
  pub description:       String,
  pub verification_type: String,
  pub context:           String,
  pub date_in_effect:    String,
  pub status:            String,
  pub country:           String,
  pub sources:           String,
}

// ─── Alternative ─────────────────────────────────────────────────────────────

/// A privacy-friendly substitute for a site. Owned by exactly one site and
/// unique by `(site_id, alt_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
  pub id:              AlternativeId,
  pub site_id:         SiteId,
  pub alt_name:        String,
  pub alt_url:         String,
  pub alt_description: String,
}

impl Alternative {
  pub fn record(&self) -> AlternativeRecord {
    AlternativeRecord {
      alt_name:        self.alt_name.clone(),
      alt_url:         self.alt_url.clone(),
      alt_description: self.alt_description.clone(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeRecord {
  pub alt_name:        String,
  pub alt_url:         String,
  pub alt_description: String,
}

/// Split a comma-separated field into trimmed, non-empty tags.
pub fn split_tags(field: &str) -> impl Iterator<Item = &str> {
  field.split(',').map(str::trim).filter(|t| !t.is_empty())
}
