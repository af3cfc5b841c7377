//! Askama page templates and their context structs.
//!
//! Templates live in `templates/` at the crate root. Every page extends
//! `base.html`, which reads the shared [`PageContext`].

use askama::Template;
use axum::{
  http::{HeaderMap, StatusCode, header},
  response::{AppendHeaders, Html, IntoResponse, Response},
};
use stopid_api::view::SiteView;
use stopid_core::{site::Alternative, suggestion::Suggestion};

use crate::{
  Result,
  auth::AuthConfig,
  flash::{CLEAR_FLASH_COOKIE, Flash},
};

/// Values every page needs: the pending notice and whether the visitor is
/// signed in.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
  pub flash:    Option<Flash>,
  pub is_admin: bool,
}

impl PageContext {
  pub fn new(headers: &HeaderMap, auth: &AuthConfig) -> Self {
    Self {
      flash:    Flash::from_headers(headers),
      is_admin: auth.admin_from_headers(headers).is_some(),
    }
  }

  pub fn with_flash(mut self, flash: Flash) -> Self {
    self.flash = Some(flash);
    self
  }
}

/// One option of a select widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
  pub value:    String,
  pub selected: bool,
}

pub fn choices(values: &[String], selected: &[String]) -> Vec<Choice> {
  values
    .iter()
    .map(|v| Choice { value: v.clone(), selected: selected.contains(v) })
    .collect()
}

/// A category name with its pre-encoded `/sites` link.
#[derive(Debug, Clone)]
pub struct CategoryLink {
  pub name: String,
  pub href: String,
}

impl CategoryLink {
  pub fn new(name: &str) -> Self {
    let query = url::form_urlencoded::Serializer::new(String::new())
      .append_pair("category", name)
      .finish();
    Self { name: name.to_owned(), href: format!("/sites?{query}") }
  }
}

// ─── Pages ───────────────────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub ctx:        PageContext,
  pub categories: Vec<CategoryLink>,
  pub recent:     Vec<SiteView>,
}

#[derive(Template)]
#[template(path = "sites.html")]
pub struct SitesTemplate {
  pub ctx:                PageContext,
  pub sites:              Vec<SiteView>,
  pub categories:         Vec<Choice>,
  pub verification_types: Vec<Choice>,
  pub countries:          Vec<Choice>,
  pub query:              String,
  pub exact:              bool,
  pub filtered:           bool,
}

#[derive(Template)]
#[template(path = "site_detail.html")]
pub struct SiteTemplate {
  pub ctx:          PageContext,
  pub site:         SiteView,
  pub alternatives: Vec<Alternative>,
}

#[derive(Template)]
#[template(path = "suggest.html")]
pub struct SuggestTemplate {
  pub ctx:                PageContext,
  pub name:               String,
  pub url:                String,
  pub description:        String,
  pub alternatives:       String,
  pub categories:         Vec<Choice>,
  pub verification_types: Vec<Choice>,
  pub countries:          Vec<Choice>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
  pub ctx:      PageContext,
  pub username: String,
}

/// A pending suggestion with its timestamp pre-formatted.
pub struct PendingView {
  pub suggestion:   Suggestion,
  pub submitted_at: String,
}

impl From<Suggestion> for PendingView {
  fn from(suggestion: Suggestion) -> Self {
    Self {
      submitted_at: suggestion.submitted_at.format("%d/%m/%Y %H:%M UTC").to_string(),
      suggestion,
    }
  }
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
  pub ctx:         PageContext,
  pub pending:     Vec<PendingView>,
  pub sync_source: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
  pub ctx: PageContext,
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Render a page. A notice shown on it is cleared from the browser.
pub fn page(template: &impl Template, ctx: &PageContext) -> Result<Response> {
  page_with_status(StatusCode::OK, template, ctx)
}

pub fn page_with_status(
  status: StatusCode,
  template: &impl Template,
  ctx: &PageContext,
) -> Result<Response> {
  let body = template.render()?;
  let clear: Vec<(header::HeaderName, &'static str)> = if ctx.flash.is_some() {
    vec![(header::SET_COOKIE, CLEAR_FLASH_COOKIE)]
  } else {
    Vec::new()
  };
  Ok((status, AppendHeaders(clear), Html(body)).into_response())
}

pub fn render_not_found() -> askama::Result<String> {
  NotFoundTemplate { ctx: PageContext::default() }.render()
}
