//! The reconciliation source document.
//!
//! A JSON document listing sites with their alternatives. It is the wire
//! format for bulk data only; the store never keeps it. Field values are
//! lenient: lists are joined with `", "`, nested objects are kept as compact
//! JSON text, and missing or `null` values become empty strings.
//!
//! ```json
//! { "sites": [
//!   { "name": "Reddit", "category": ["Réseaux sociaux"], "country": "UK",
//!     "alternatives": [ { "alt_name": "Lemmy", "alt_url": "https://join-lemmy.org" } ] }
//! ] }
//! ```
//!
//! A bare top-level array of sites is accepted as well.

use std::path::Path;

use serde_json::{Map, Value};

use crate::{
  Error, Result,
  site::{AlternativeRecord, SiteRecord},
};

const SEED: &str = include_str!("../seed/sites.json");

/// One site entry of a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSite {
  pub record:       SiteRecord,
  pub alternatives: Vec<AlternativeRecord>,
}

/// A parsed, normalised source document. Entries keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
  pub sites: Vec<SourceSite>,
}

impl SourceDocument {
  /// Read and parse the document at `path`.
  ///
  /// A missing file yields [`Error::SourceMissing`] so callers can report it
  /// and carry on.
  pub fn load(path: &Path) -> Result<Self> {
    let raw = match std::fs::read_to_string(path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(Error::SourceMissing(path.to_path_buf()));
      }
      Err(e) => return Err(e.into()),
    };
    Self::parse(&raw)
  }

  /// The sample catalogue used to seed an empty store.
  pub fn seed() -> Result<Self> { Self::parse(SEED) }

  pub fn parse(json: &str) -> Result<Self> {
    let value: Value = serde_json::from_str(json)?;
    Self::from_value(&value)
  }

  pub fn from_value(value: &Value) -> Result<Self> {
    let entries = match value {
      Value::Array(items) => items,
      Value::Object(map) => match map.get("sites") {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid("`sites` must be a list")),
        None => return Err(invalid("missing top-level `sites` list")),
      },
      _ => return Err(invalid("expected an object or a list of sites")),
    };

    let sites = entries
      .iter()
      .enumerate()
      .map(|(i, entry)| parse_site(i, entry))
      .collect::<Result<_>>()?;
    Ok(SourceDocument { sites })
  }
}

fn parse_site(index: usize, entry: &Value) -> Result<SourceSite> {
  let Value::Object(obj) = entry else {
    return Err(invalid(format!("site #{} is not an object", index + 1)));
  };

  let name = field(obj, &["name"]);
  if name.is_empty() {
    return Err(invalid(format!("site #{} has no name", index + 1)));
  }

  let record = SiteRecord {
    url: field(obj, &["url"]),
    category: field(obj, &["category"]),
    description: field(obj, &["description"]),
    verification_type: field(obj, &["verification_type"]),
    context: field(obj, &["context"]),
    date_in_effect: field(obj, &["date_in_effect"]),
    status: field(obj, &["status"]),
    country: field(obj, &["country"]),
    sources: field(obj, &["sources"]),
    name,
  };

  let alternatives = match obj.get("alternatives") {
    None | Some(Value::Null) => Vec::new(),
    Some(Value::Array(items)) => items
      .iter()
      .enumerate()
      .map(|(j, alt)| parse_alternative(&record.name, j, alt))
      .collect::<Result<_>>()?,
    Some(_) => {
      return Err(invalid(format!("alternatives of {:?} must be a list", record.name)));
    }
  };

  Ok(SourceSite { record, alternatives })
}

fn parse_alternative(site: &str, index: usize, entry: &Value) -> Result<AlternativeRecord> {
  let Value::Object(obj) = entry else {
    return Err(invalid(format!("alternative #{} of {site:?} is not an object", index + 1)));
  };

  let alt_name = field(obj, &["alt_name", "name"]);
  if alt_name.is_empty() {
    return Err(invalid(format!("alternative #{} of {site:?} has no name", index + 1)));
  }

  Ok(AlternativeRecord {
    alt_name,
    alt_url: field(obj, &["alt_url", "url"]),
    alt_description: field(obj, &["alt_description", "description"]),
  })
}

/// The first present key among `keys`, normalised to text.
fn field(obj: &Map<String, Value>, keys: &[&str]) -> String {
  keys
    .iter()
    .find_map(|k| obj.get(*k))
    .map(normalize)
    .unwrap_or_default()
}

/// Flatten a JSON value to the text stored in a column.
pub fn normalize(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.trim().to_owned(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    Value::Array(items) => items
      .iter()
      .map(normalize)
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(", "),
    Value::Object(_) => value.to_string(),
  }
}

fn invalid(msg: impl Into<String>) -> Error { Error::InvalidSource(msg.into()) }

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn normalize_flattens_values() {
    assert_eq!(normalize(&json!(null)), "");
    assert_eq!(normalize(&json!(" FR ")), "FR");
    assert_eq!(normalize(&json!(["UK", "FR", ""])), "UK, FR");
    assert_eq!(normalize(&json!(2024)), "2024");
    assert_eq!(normalize(&json!(true)), "true");
    assert_eq!(normalize(&json!({"a": 1})), r#"{"a":1}"#);
  }

  #[test]
  fn parses_wrapped_and_bare_documents() {
    let wrapped = SourceDocument::parse(r#"{"sites":[{"name":"A"}]}"#).unwrap();
    let bare = SourceDocument::parse(r#"[{"name":"A"}]"#).unwrap();
    assert_eq!(wrapped, bare);
    assert_eq!(wrapped.sites[0].record.name, "A");
    assert_eq!(wrapped.sites[0].record.url, "");
  }

  #[test]
  fn alternatives_accept_short_keys() {
    let doc = SourceDocument::parse(
      r#"[{"name":"A","alternatives":[
           {"alt_name":"B","alt_url":"https://b","alt_description":"bee"},
           {"name":"C","url":"https://c"}]}]"#,
    )
    .unwrap();
    let alts = &doc.sites[0].alternatives;
    assert_eq!(alts[0].alt_description, "bee");
    assert_eq!(alts[1].alt_name, "C");
    assert_eq!(alts[1].alt_url, "https://c");
  }

  #[test]
  fn rejects_nameless_entries() {
    assert!(matches!(
      SourceDocument::parse(r#"[{"url":"https://x"}]"#),
      Err(Error::InvalidSource(_))
    ));
    assert!(matches!(
      SourceDocument::parse(r#"[{"name":"A","alternatives":[{"alt_url":"u"}]}]"#),
      Err(Error::InvalidSource(_))
    ));
    assert!(matches!(
      SourceDocument::parse(r#"{"items":[]}"#),
      Err(Error::InvalidSource(_))
    ));
  }

  #[test]
  fn missing_file_is_reported_as_such() {
    let err = SourceDocument::load(Path::new("/nonexistent/stopid/sites.json")).unwrap_err();
    assert!(matches!(err, Error::SourceMissing(_)));
  }

  #[test]
  fn seed_document_is_well_formed() {
    let seed = SourceDocument::seed().unwrap();
    assert_eq!(seed.sites.len(), 4);
    let alts: usize = seed.sites.iter().map(|s| s.alternatives.len()).sum();
    assert_eq!(alts, 7);
    assert_eq!(seed.sites[0].record.sources, "Politico.eu, TF1 Info, AP News");
  }
}
