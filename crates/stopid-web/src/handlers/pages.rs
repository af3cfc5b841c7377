//! Public catalogue pages.

use axum::{
  extract::{Path, RawQuery, State},
  http::{HeaderMap, StatusCode},
  response::Response,
};
use stopid_api::{sites::filter_from_query, view::SiteView};
use stopid_core::{filter::MatchMode, site::SiteId, store::CatalogStore};

use crate::{
  AppState, Error, Result,
  handlers::context,
  templates::{
    CategoryLink, IndexTemplate, NotFoundTemplate, SiteTemplate, SitesTemplate, choices, page,
    page_with_status,
  },
};

/// Number of sites shown under "recent" on the home page.
const RECENT_LIMIT: usize = 5;

/// `GET /`
pub async fn index<S>(State(state): State<AppState<S>>, headers: HeaderMap) -> Result<Response>
where
  S: CatalogStore,
{
  let facets = state.store.facets().await.map_err(Error::from_store)?;
  let recent = state
    .store
    .recent_sites(RECENT_LIMIT)
    .await
    .map_err(Error::from_store)?;

  let template = IndexTemplate {
    ctx:        context(&state, &headers),
    categories: facets.categories.iter().map(|c| CategoryLink::new(c)).collect(),
    recent:     recent.into_iter().map(SiteView::from).collect(),
  };
  page(&template, &template.ctx)
}

/// `GET /sites[?category=..&verification_type=..&country=..&q=..&mode=exact]`
pub async fn sites<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  RawQuery(query): RawQuery,
) -> Result<Response>
where
  S: CatalogStore,
{
  let filter = filter_from_query(query.as_deref());
  let sites = state.store.list_sites(&filter).await.map_err(Error::from_store)?;
  let facets = state.store.facets().await.map_err(Error::from_store)?;

  let template = SitesTemplate {
    ctx:                context(&state, &headers),
    sites:              sites.into_iter().map(SiteView::from).collect(),
    categories:         choices(&facets.categories, &filter.categories),
    verification_types: choices(&facets.verification_types, &filter.verification_types),
    countries:          choices(&facets.countries, &filter.countries),
    query:              filter.text().unwrap_or_default().to_owned(),
    exact:              filter.mode == MatchMode::Exact,
    filtered:           !filter.is_empty(),
  };
  page(&template, &template.ctx)
}

/// `GET /site/{id}`
pub async fn site_detail<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Path(id): Path<SiteId>,
) -> Result<Response>
where
  S: CatalogStore,
{
  let site = state
    .store
    .get_site(id)
    .await
    .map_err(Error::from_store)?
    .ok_or(stopid_core::Error::SiteNotFound(id))?;
  let alternatives = state.store.alternatives(id).await.map_err(Error::from_store)?;

  let template = SiteTemplate {
    ctx: context(&state, &headers),
    site: site.into(),
    alternatives,
  };
  page(&template, &template.ctx)
}

/// Fallback for unknown paths.
pub async fn not_found<S>(State(state): State<AppState<S>>, headers: HeaderMap) -> Result<Response>
where
  S: CatalogStore,
{
  let template = NotFoundTemplate { ctx: context(&state, &headers) };
  page_with_status(StatusCode::NOT_FOUND, &template, &template.ctx)
}
