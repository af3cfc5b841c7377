//! The typed site filter.
//!
//! [`SiteFilter`] is the only way to ask the store for a filtered site list.
//! Storage backends turn it into a query; [`SiteFilter::matches`] states the
//! same semantics over an in-memory [`Site`].

use serde::{Deserialize, Serialize};

use crate::{country::EXTRA_REGIONS, site::{Site, split_tags}};

/// Verification keywords offered in the filter and suggestion forms.
pub const VERIFICATION_KEYWORDS: &[&str] = &[
  "Pièce d’identité",
  "Selfie",
  "Selfie vidéo",
  "Estimation faciale",
  "Carte bancaire",
  "Numéro de téléphone",
  "Yoti",
  "Persona",
  "Veriff",
  "FaceTec",
  "Stripe",
  "k‑iD",
  "Pas d’ID requis",
];

// ─── Mode ────────────────────────────────────────────────────────────────────

/// How the selected values of each dimension are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
  /// Category must equal one of the selected values; verification type and
  /// country must contain one of them; text is searched across six columns.
  #[default]
  Substring,
  /// Category, verification type and country each compare for equality
  /// with their first selected value; text is searched in the site name
  /// only.
  Exact,
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Optional, possibly multi-valued constraints on the site list.
///
/// Dimensions combine with AND; values within a dimension combine with OR.
/// An empty dimension imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFilter {
  #[serde(default)]
  pub mode:               MatchMode,
  #[serde(default)]
  pub categories:         Vec<String>,
  #[serde(default)]
  pub verification_types: Vec<String>,
  #[serde(default)]
  pub countries:          Vec<String>,
  pub text:               Option<String>,
}

impl SiteFilter {
  /// Build a filter from decoded query-string pairs.
  ///
  /// Recognises repeated `category`, `verification_type` and `country` keys,
  /// a `q` free-text key and `mode=exact`. Blank values and unknown keys are
  /// ignored.
  pub fn from_pairs<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut filter = SiteFilter::default();
    for (key, value) in pairs {
      let value = value.as_ref().trim();
      if value.is_empty() {
        continue;
      }
      match key.as_ref() {
        "category" => filter.categories.push(value.to_owned()),
        "verification_type" => filter.verification_types.push(value.to_owned()),
        "country" => filter.countries.push(value.to_owned()),
        "q" => filter.text = Some(value.to_owned()),
        "mode" if value.eq_ignore_ascii_case("exact") => filter.mode = MatchMode::Exact,
        _ => {}
      }
    }
    filter
  }

  pub fn is_empty(&self) -> bool {
    self.categories.is_empty()
      && self.verification_types.is_empty()
      && self.countries.is_empty()
      && self.text().is_none()
  }

  /// The free-text term, if any, ignoring blank input.
  pub fn text(&self) -> Option<&str> {
    self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
  }

  /// The values of one dimension as they take part in matching. In exact
  /// mode only the first selected value counts.
  pub fn effective<'a>(&self, values: &'a [String]) -> &'a [String] {
    match self.mode {
      MatchMode::Substring => values,
      MatchMode::Exact => &values[..values.len().min(1)],
    }
  }

  /// Whether `site` satisfies every active constraint.
  pub fn matches(&self, site: &Site) -> bool {
    let categories = self.effective(&self.categories);
    let verifications = self.effective(&self.verification_types);
    let countries = self.effective(&self.countries);

    let dimension = |values: &[String], column: &str, exact: bool| {
      values.is_empty()
        || values.iter().any(|v| {
          if exact { column == v.as_str() } else { column.contains(v.as_str()) }
        })
    };

    let exact = self.mode == MatchMode::Exact;
    if !dimension(categories, site.category.as_str(), true)
      || !dimension(verifications, site.verification_type.as_str(), exact)
      || !dimension(countries, site.country.as_str(), exact)
    {
      return false;
    }

    let Some(text) = self.text() else { return true };
    let needle = text.to_ascii_lowercase();
    let contains = |column: &str| column.to_ascii_lowercase().contains(&needle);
    match self.mode {
      MatchMode::Exact => contains(site.name.as_str()),
      MatchMode::Substring => [
        &site.name,
        &site.description,
        &site.verification_type,
        &site.context,
        &site.country,
        &site.sources,
      ]
      .into_iter()
      .any(|column| contains(column.as_str())),
    }
  }
}

// ─── Facets ──────────────────────────────────────────────────────────────────

/// Selectable values for the filter widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
  pub categories:         Vec<String>,
  pub verification_types: Vec<String>,
  pub countries:          Vec<String>,
}

impl Facets {
  /// Assemble facets from the distinct `category` values and every raw
  /// `country` field in the store.
  pub fn build<'a>(
    categories: impl IntoIterator<Item = &'a str>,
    country_fields: impl IntoIterator<Item = &'a str>,
  ) -> Self {
    let mut categories: Vec<String> =
      categories.into_iter().map(str::to_owned).collect();
    categories.sort();
    categories.dedup();

    let mut countries: Vec<String> = country_fields
      .into_iter()
      .flat_map(split_tags)
      .map(str::to_owned)
      .chain(EXTRA_REGIONS.iter().map(|r| r.to_string()))
      .collect();
    countries.sort();
    countries.dedup();

    Facets {
      categories,
      verification_types: VERIFICATION_KEYWORDS.iter().map(|k| k.to_string()).collect(),
      countries,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::site::SiteRecord;

  fn site(name: &str, category: &str, verification: &str, country: &str) -> Site {
    Site::from_record(1, SiteRecord {
      name: name.into(),
      url: format!("https://{}.example", name.to_lowercase()),
      category: category.into(),
      verification_type: verification.into(),
      country: country.into(),
      ..Default::default()
    })
  }

  #[test]
  fn from_pairs_collects_repeated_keys() {
    let f = SiteFilter::from_pairs([
      ("category", "Adulte"),
      ("category", "Streaming"),
      ("country", " FR "),
      ("country", ""),
      ("q", "  "),
      ("page", "2"),
    ]);
    assert_eq!(f.categories, vec!["Adulte", "Streaming"]);
    assert_eq!(f.countries, vec!["FR"]);
    assert!(f.text.is_none());
    assert_eq!(f.mode, MatchMode::Substring);
  }

  #[test]
  fn from_pairs_recognises_exact_mode() {
    let f = SiteFilter::from_pairs([("mode", "EXACT")]);
    assert_eq!(f.mode, MatchMode::Exact);
    assert!(f.is_empty());
  }

  #[test]
  fn blank_text_is_not_a_constraint() {
    let f = SiteFilter { text: Some("   ".into()), ..Default::default() };
    assert!(f.is_empty());
    assert!(f.text().is_none());

    let f = SiteFilter { text: Some(" yoti ".into()), ..Default::default() };
    assert!(!f.is_empty());
  }

  #[test]
  fn exact_mode_compares_verification_type_whole() {
    let f = SiteFilter {
      mode: MatchMode::Exact,
      verification_types: vec!["Yoti".into()],
      ..Default::default()
    };
    assert!(f.matches(&site("A", "c", "Yoti", "")));
    assert!(!f.matches(&site("A", "c", "Yoti pour clips 18+", "")));
  }

  #[test]
  fn empty_filter_matches_everything() {
    assert!(SiteFilter::default().matches(&site("A", "x", "y", "z")));
  }

  #[test]
  fn category_is_exact_even_in_substring_mode() {
    let f = SiteFilter { categories: vec!["Adult".into()], ..Default::default() };
    assert!(!f.matches(&site("A", "Adulte", "", "")));
    assert!(f.matches(&site("A", "Adult", "", "")));
  }

  #[test]
  fn values_within_a_dimension_are_ored() {
    let f = SiteFilter {
      verification_types: vec!["Yoti".into(), "Persona".into()],
      ..Default::default()
    };
    assert!(f.matches(&site("A", "c", "Contrôle via Persona", "")));
    assert!(f.matches(&site("A", "c", "Yoti pour clips 18+", "")));
    assert!(!f.matches(&site("A", "c", "Carte bancaire", "")));
  }

  #[test]
  fn dimensions_are_anded() {
    let f = SiteFilter {
      verification_types: vec!["Selfie".into()],
      countries: vec!["UK".into()],
      ..Default::default()
    };
    assert!(f.matches(&site("A", "c", "Selfie vidéo", "UK, FR")));
    assert!(!f.matches(&site("A", "c", "Selfie vidéo", "FR")));
  }

  #[test]
  fn keyword_match_is_case_sensitive() {
    let f = SiteFilter { verification_types: vec!["selfie".into()], ..Default::default() };
    assert!(!f.matches(&site("A", "c", "Selfie vidéo", "")));
  }

  #[test]
  fn text_searches_several_columns_ignoring_ascii_case() {
    let mut s = site("Reddit", "c", "", "UK");
    s.sources = "Tom’s Guide".into();
    let f = SiteFilter { text: Some("tom’s".into()), ..Default::default() };
    assert!(f.matches(&s));
    let f = SiteFilter { text: Some("REDD".into()), ..Default::default() };
    assert!(f.matches(&s));
    let f = SiteFilter { text: Some("lemmy".into()), ..Default::default() };
    assert!(!f.matches(&s));
  }

  #[test]
  fn exact_mode_uses_first_value_and_name_only() {
    let f = SiteFilter {
      mode: MatchMode::Exact,
      countries: vec!["UK".into(), "FR".into()],
      ..Default::default()
    };
    assert!(f.matches(&site("A", "c", "", "UK")));
    assert!(!f.matches(&site("A", "c", "", "FR")));
    assert!(!f.matches(&site("A", "c", "", "UK, FR")));

    let mut s = site("Spotify", "c", "", "");
    s.description = "musique".into();
    let f = SiteFilter {
      mode: MatchMode::Exact,
      text: Some("musique".into()),
      ..Default::default()
    };
    assert!(!f.matches(&s));
    let f = SiteFilter { text: Some("musique".into()), ..Default::default() };
    assert!(f.matches(&s));
  }

  #[test]
  fn facets_split_countries_and_add_regions() {
    let facets = Facets::build(
      ["Streaming", "Adulte", "Streaming"],
      ["UK, FR", "FR", "International", ""],
    );
    assert_eq!(facets.categories, vec!["Adulte", "Streaming"]);
    assert_eq!(facets.countries, vec!["EU", "FR", "International", "UE", "UK"]);
    assert_eq!(facets.verification_types.len(), VERIFICATION_KEYWORDS.len());
  }
}
