//! The public suggestion form.
//!
//! The POST body is decoded by hand because `category`, `verification_type`
//! and `country` are multi-selects and arrive as repeated keys.

use axum::{
  extract::State,
  http::{HeaderMap, StatusCode},
  response::Response,
};
use stopid_core::{store::CatalogStore, suggestion::SuggestionForm};

use crate::{
  AppState, Error, Result,
  flash::Flash,
  handlers::context,
  templates::{PageContext, SuggestTemplate, choices, page, page_with_status},
};

const MISSING_FIELDS: &str = "Veuillez remplir les champs obligatoires (nom, url, catégorie).";
const INVALID_URL: &str = "L’adresse doit commencer par http:// ou https://.";
const THANKS: &str = "Merci pour votre suggestion ! Elle sera revue par un administrateur.";

/// `GET /suggest`
pub async fn form<S>(State(state): State<AppState<S>>, headers: HeaderMap) -> Result<Response>
where
  S: CatalogStore,
{
  let template = render_form(&state, context(&state, &headers), &SuggestionForm::default()).await?;
  page(&template, &template.ctx)
}

/// `POST /suggest`
///
/// An incomplete submission is shown again with the entered values and an
/// error notice; nothing is stored.
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: String,
) -> Result<Response>
where
  S: CatalogStore,
{
  let form = SuggestionForm::from_pairs(url::form_urlencoded::parse(body.as_bytes()));

  let suggestion = match form.validate() {
    Ok(suggestion) => suggestion,
    Err(e) => {
      tracing::debug!(error = %e, "suggestion rejected");
      let message = if e.missing.is_empty() { INVALID_URL } else { MISSING_FIELDS };
      let ctx = context(&state, &headers).with_flash(Flash::error(message));
      let template = render_form(&state, ctx, &form).await?;
      return page_with_status(StatusCode::UNPROCESSABLE_ENTITY, &template, &template.ctx);
    }
  };

  let stored = state
    .store
    .submit_suggestion(suggestion)
    .await
    .map_err(Error::from_store)?;
  tracing::info!(id = stored.id, name = %stored.name, "suggestion received");

  Ok(Flash::success(THANKS).redirect("/"))
}

async fn render_form<S: CatalogStore>(
  state: &AppState<S>,
  ctx: PageContext,
  form: &SuggestionForm,
) -> Result<SuggestTemplate> {
  let facets = state.store.facets().await.map_err(Error::from_store)?;
  Ok(SuggestTemplate {
    ctx,
    name: form.name.clone(),
    url: form.url.clone(),
    description: form.description.clone(),
    alternatives: form.alternatives.clone(),
    categories: choices(&facets.categories, &form.categories),
    verification_types: choices(&facets.verification_types, &form.verification_types),
    countries: choices(&facets.countries, &form.countries),
  })
}
