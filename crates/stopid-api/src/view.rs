//! Serialisable read models shared by the JSON API and the HTML pages.

use serde::Serialize;
use stopid_core::{
  site::{Alternative, Site},
  severity::Severity,
};

/// A site together with its derived presentation values.
#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
  #[serde(flatten)]
  pub site:           Site,
  pub severity:       Severity,
  pub severity_label: &'static str,
  pub severity_class: &'static str,
  /// Flag emoji for the country list.
  pub flags:          String,
}

impl From<Site> for SiteView {
  fn from(site: Site) -> Self {
    let severity = site.severity();
    Self {
      severity,
      severity_label: severity.label(),
      severity_class: severity.css_class(),
      flags: site.flags(),
      site,
    }
  }
}

/// A site with its alternatives, as shown on the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct SiteDetail {
  #[serde(flatten)]
  pub site:         SiteView,
  pub alternatives: Vec<Alternative>,
}
