//! Visitor suggestions awaiting review.
//!
//! A suggestion is created from the public form, listed for administrators,
//! and then either approved (copied into the catalogue and deleted) or
//! rejected (deleted). There are no intermediate states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ValidationError, site::AlternativeRecord};

pub type SuggestionId = i64;

// ─── Types ───────────────────────────────────────────────────────────────────

/// An alternative proposed alongside a suggested site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedAlternative {
  pub name:        String,
  pub url:         String,
  pub description: String,
}

impl ProposedAlternative {
  pub fn to_record(&self) -> AlternativeRecord {
    AlternativeRecord {
      alt_name:        self.name.clone(),
      alt_url:         self.url.clone(),
      alt_description: self.description.clone(),
    }
  }
}

/// A validated submission, ready to be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSuggestion {
  pub name:              String,
  pub url:               String,
  pub category:          String,
  pub verification_type: String,
  pub country:           String,
  pub description:       String,
  pub alternatives:      Vec<ProposedAlternative>,
}

/// A stored suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
  pub id:                SuggestionId,
  pub name:              String,
  pub url:               String,
  pub category:          String,
  pub verification_type: String,
  pub country:           String,
  pub description:       String,
  pub alternatives:      Vec<ProposedAlternative>,
  /// Server-assigned; never taken from the submitter.
  pub submitted_at:      DateTime<Utc>,
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// Raw fields of the public suggestion form.
///
/// Category, verification type and country are multi-selects, so they are
/// collected as lists; `alternatives` is the textarea content, one
/// `name|url|description` triple per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionForm {
  pub name:               String,
  pub url:                String,
  pub categories:         Vec<String>,
  pub verification_types: Vec<String>,
  pub countries:          Vec<String>,
  pub description:        String,
  pub alternatives:       String,
}

impl SuggestionForm {
  /// Build a form from decoded `application/x-www-form-urlencoded` pairs.
  pub fn from_pairs<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
  {
    let mut form = SuggestionForm::default();
    for (key, value) in pairs {
      let value = value.into();
      match key.as_ref() {
        "name" => form.name = value,
        "url" => form.url = value,
        "category" => form.categories.push(value),
        "verification_type" => form.verification_types.push(value),
        "country" => form.countries.push(value),
        "description" => form.description = value,
        "alternatives" => form.alternatives = value,
        _ => {}
      }
    }
    form
  }

  /// Trim and check the submission. Name, URL and at least one category are
  /// required, and the URL must be `http` or `https`.
  pub fn validate(&self) -> Result<NewSuggestion, ValidationError> {
    let name = self.name.trim();
    let url = self.url.trim();
    let categories = clean_list(&self.categories);

    let mut err = ValidationError::default();
    if name.is_empty() {
      err.missing.push("name");
    }
    if url.is_empty() {
      err.missing.push("url");
    } else if !is_web_url(url) {
      err.invalid.push("url");
    }
    if categories.is_empty() {
      err.missing.push("category");
    }
    if !err.is_empty() {
      return Err(err);
    }

    Ok(NewSuggestion {
      name:              name.to_owned(),
      url:               url.to_owned(),
      category:          categories.join(", "),
      verification_type: clean_list(&self.verification_types).join(", "),
      country:           clean_list(&self.countries).join(", "),
      description:       self.description.trim().to_owned(),
      alternatives:      parse_alternatives(&self.alternatives),
    })
  }
}

fn clean_list(values: &[String]) -> Vec<&str> {
  values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).collect()
}

/// Parse the alternatives textarea.
///
/// Each line is `name|url` or `name|url|description`. Lines with fewer than
/// two parts, or whose URL is not `http`/`https`, are skipped; parts past the
/// third are ignored.
pub fn parse_alternatives(raw: &str) -> Vec<ProposedAlternative> {
  raw
    .lines()
    .filter_map(|line| {
      let parts: Vec<&str> = line.split('|').map(str::trim).collect();
      if parts.len() < 2 || !is_web_url(parts[1]) {
        return None;
      }
      Some(ProposedAlternative {
        name:        parts[0].to_owned(),
        url:         parts[1].to_owned(),
        description: parts.get(2).copied().unwrap_or_default().to_owned(),
      })
    })
    .collect()
}

/// Whether `raw` parses as an absolute `http` or `https` URL.
pub fn is_web_url(raw: &str) -> bool {
  url::Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form() -> SuggestionForm {
    SuggestionForm {
      name: "  Discord ".into(),
      url: "https://discord.com".into(),
      categories: vec!["Réseaux sociaux".into(), " ".into(), "Messagerie".into()],
      verification_types: vec!["Selfie".into(), "Pièce d’identité".into()],
      countries: vec!["UK".into()],
      description: "Messagerie instantanée ".into(),
      alternatives: "Matrix|https://matrix.org|Protocole ouvert\nbroken line\nRevolt|https://revolt.chat".into(),
    }
  }

  #[test]
  fn valid_form_is_normalised() {
    let s = form().validate().unwrap();
    assert_eq!(s.name, "Discord");
    assert_eq!(s.category, "Réseaux sociaux, Messagerie");
    assert_eq!(s.verification_type, "Selfie, Pièce d’identité");
    assert_eq!(s.country, "UK");
    assert_eq!(s.description, "Messagerie instantanée");
    assert_eq!(s.alternatives.len(), 2);
    assert_eq!(s.alternatives[1].description, "");
  }

  #[test]
  fn missing_fields_are_reported_together() {
    let f = SuggestionForm {
      categories: vec!["   ".into()],
      ..Default::default()
    };
    let err = f.validate().unwrap_err();
    assert_eq!(err.missing, vec!["name", "url", "category"]);
    assert!(err.invalid.is_empty());
  }

  #[test]
  fn non_web_urls_are_refused() {
    for url in ["javascript:alert(1)", "data:text/html,hi", "discord.com", "ftp://example.org"] {
      let f = SuggestionForm { url: url.into(), ..form() };
      let err = f.validate().unwrap_err();
      assert_eq!(err.invalid, vec!["url"], "{url}");
      assert!(err.missing.is_empty());
      assert_eq!(err.to_string(), "invalid fields: url");
    }

    let f = SuggestionForm { url: "HTTP://Discord.com".into(), ..form() };
    assert!(f.validate().is_ok());
  }

  #[test]
  fn alternatives_with_non_web_urls_are_dropped() {
    let alts = parse_alternatives(
      "Evil|javascript:alert(1)|x\nMatrix|https://matrix.org\nBare|matrix.org",
    );
    assert_eq!(alts.len(), 1);
    assert_eq!(alts[0].name, "Matrix");
  }

  #[test]
  fn from_pairs_collects_multiselects() {
    let f = SuggestionForm::from_pairs([
      ("name", "X"),
      ("url", "https://x.com"),
      ("category", "A"),
      ("category", "B"),
      ("country", "FR"),
      ("csrf", "ignored"),
    ]);
    assert_eq!(f.categories, vec!["A", "B"]);
    assert_eq!(f.countries, vec!["FR"]);
    assert_eq!(f.name, "X");
  }

  #[test]
  fn alternatives_parsing() {
    let alts = parse_alternatives(" Lemmy | https://join-lemmy.org | Fédéré \n\nKbin|https://kbin.social|a|b");
    assert_eq!(alts, vec![
      ProposedAlternative {
        name:        "Lemmy".into(),
        url:         "https://join-lemmy.org".into(),
        description: "Fédéré".into(),
      },
      ProposedAlternative {
        name:        "Kbin".into(),
        url:         "https://kbin.social".into(),
        description: "a".into(),
      },
    ]);
  }
}
