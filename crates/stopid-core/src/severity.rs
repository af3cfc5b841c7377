//! Severity classification.
//!
//! A pure mapping from a site's `status` and `country` text to one of four
//! ordinal levels. The rules look for French and English wording, since the
//! catalogue is maintained in French but imports may not be.

use serde::{Deserialize, Serialize};

use crate::site::split_tags;

const BLOCKED_TERMS: &[&str] =
  &["bloqué", "blocage", "non accessible", "inaccessible", "blocked"];

const MANDATORY_TERMS: &[&str] =
  &["obligatoire", "requise", "requis", "mandatory", "required"];

const OPTIONAL_TERMS: &[&str] =
  &["facultatif", "facultative", "optionnel", "optional"];

const GLOBAL_MARKERS: &[&str] = &["international", "global", "monde"];

/// How intrusive or strictly enforced a site's verification is.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Low,
  Medium,
  High,
  VeryHigh,
}

impl Severity {
  pub const ALL: [Severity; 4] =
    [Severity::Low, Severity::Medium, Severity::High, Severity::VeryHigh];

  /// Classify a site from its free-text `status` and `country` fields.
  ///
  /// Rules, first match wins:
  ///
  /// 1. blocked → `VeryHigh`
  /// 2. mandatory and global scope → `VeryHigh`
  /// 3. mandatory → `High`
  /// 4. optional and global scope → `Low`
  /// 5. optional → `Medium`
  /// 6. anything else (planned, experimental, unknown) → `Medium`
  ///
  /// Global scope means the country list is empty, names a global marker, or
  /// lists more than one code.
  pub fn classify(status: &str, country: &str) -> Self {
    let status = status.to_lowercase();
    let country = country.to_lowercase();

    let mentions = |terms: &[&str]| terms.iter().any(|t| status.contains(t));
    let blocked = mentions(BLOCKED_TERMS);
    let mandatory = mentions(MANDATORY_TERMS);
    let optional = mentions(OPTIONAL_TERMS);
    let global = is_global_scope(&country);

    match (blocked, mandatory, optional, global) {
      (true, ..) => Severity::VeryHigh,
      (_, true, _, true) => Severity::VeryHigh,
      (_, true, _, false) => Severity::High,
      (_, _, true, true) => Severity::Low,
      _ => Severity::Medium,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Severity::Low => "Faible",
      Severity::Medium => "Moyen",
      Severity::High => "Élevé",
      Severity::VeryHigh => "Très élevé",
    }
  }

  pub fn css_class(self) -> &'static str {
    match self {
      Severity::Low => "severity-low",
      Severity::Medium => "severity-medium",
      Severity::High => "severity-high",
      Severity::VeryHigh => "severity-very-high",
    }
  }
}

fn is_global_scope(country: &str) -> bool {
  let codes: Vec<&str> = split_tags(country).collect();
  codes.is_empty()
    || codes.len() > 1
    || codes.iter().any(|c| GLOBAL_MARKERS.contains(c))
}
