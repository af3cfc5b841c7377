//! Translation of a [`SiteFilter`] into parameterised SQL.
//!
//! Column names are fixed by this module; user input only ever travels as a
//! bound parameter. Substring tests use `instr`, so `%` and `_` in search
//! terms are matched literally.

use stopid_core::filter::{MatchMode, SiteFilter};

use crate::encode::SITE_COLUMNS;

/// Columns searched by free text in substring mode.
const TEXT_COLUMNS: &[&str] =
  &["name", "description", "verification_type", "context", "country", "sources"];

/// A statement with its positional (`?`) parameters in binding order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
  pub sql:    String,
  pub params: Vec<String>,
}

#[derive(Clone, Copy)]
enum Test {
  Equals,
  Contains,
}

impl Test {
  fn sql(self, column: &str) -> String {
    match self {
      Test::Equals => format!("{column} = ?"),
      Test::Contains => format!("instr({column}, ?) > 0"),
    }
  }
}

/// Build the `SELECT` for the site list.
pub fn site_list(filter: &SiteFilter) -> QueryPlan {
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<String> = Vec::new();

  let loose = match filter.mode {
    MatchMode::Substring => Test::Contains,
    MatchMode::Exact => Test::Equals,
  };

  any_of(&mut conds, &mut params, "category", Test::Equals, filter.effective(&filter.categories));
  any_of(
    &mut conds,
    &mut params,
    "verification_type",
    loose,
    filter.effective(&filter.verification_types),
  );
  any_of(&mut conds, &mut params, "country", loose, filter.effective(&filter.countries));

  if let Some(text) = filter.text() {
    let columns: &[&str] = match filter.mode {
      MatchMode::Substring => TEXT_COLUMNS,
      MatchMode::Exact => &["name"],
    };
    let parts: Vec<String> = columns
      .iter()
      .map(|c| {
        params.push(text.to_owned());
        format!("instr(lower({c}), lower(?)) > 0")
      })
      .collect();
    conds.push(group(parts));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", conds.join(" AND "))
  };

  QueryPlan {
    sql: format!(
      "SELECT {SITE_COLUMNS} FROM sites{where_clause} ORDER BY name COLLATE NOCASE, id"
    ),
    params,
  }
}

/// Push one OR-group testing `column` against each value. No values means no
/// constraint.
fn any_of(
  conds: &mut Vec<String>,
  params: &mut Vec<String>,
  column: &str,
  test: Test,
  values: &[String],
) {
  if values.is_empty() {
    return;
  }
  let parts = values
    .iter()
    .map(|v| {
      params.push(v.clone());
      test.sql(column)
    })
    .collect();
  conds.push(group(parts));
}

fn group(parts: Vec<String>) -> String {
  if parts.len() == 1 {
    parts.into_iter().collect()
  } else {
    format!("({})", parts.join(" OR "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SELECT: &str = "SELECT id, name, url, category, description, verification_type, \
                        context, date_in_effect, status, country, sources FROM sites";

  #[test]
  fn empty_filter_selects_everything() {
    let plan = site_list(&SiteFilter::default());
    assert_eq!(plan.sql, format!("{SELECT} ORDER BY name COLLATE NOCASE, id"));
    assert!(plan.params.is_empty());
  }

  #[test]
  fn dimensions_and_values_combine() {
    let filter = SiteFilter {
      categories: vec!["Adulte".into(), "Streaming".into()],
      countries: vec!["UK".into()],
      ..Default::default()
    };
    let plan = site_list(&filter);
    assert_eq!(
      plan.sql,
      format!(
        "{SELECT} WHERE (category = ? OR category = ?) AND instr(country, ?) > 0 \
         ORDER BY name COLLATE NOCASE, id"
      )
    );
    assert_eq!(plan.params, vec!["Adulte", "Streaming", "UK"]);
  }

  #[test]
  fn text_binds_once_per_column() {
    let filter = SiteFilter { text: Some("x'; DROP TABLE sites; --".into()), ..Default::default() };
    let plan = site_list(&filter);
    assert_eq!(plan.params.len(), TEXT_COLUMNS.len());
    assert!(!plan.sql.contains("DROP"));
    assert!(plan.sql.contains("instr(lower(sources), lower(?)) > 0"));
  }

  #[test]
  fn exact_mode_uses_equality_and_first_value() {
    let filter = SiteFilter {
      mode: MatchMode::Exact,
      verification_types: vec!["Selfie".into(), "Yoti".into()],
      text: Some("red".into()),
      ..Default::default()
    };
    let plan = site_list(&filter);
    assert_eq!(
      plan.sql,
      format!(
        "{SELECT} WHERE verification_type = ? AND instr(lower(name), lower(?)) > 0 \
         ORDER BY name COLLATE NOCASE, id"
      )
    );
    assert_eq!(plan.params, vec!["Selfie", "red"]);
  }
}
