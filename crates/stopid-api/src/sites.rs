//! Handlers for `/sites` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sites` | Repeatable `category`, `verification_type`, `country`; `q`; `mode=exact` |
//! | `GET`  | `/sites/{id}` | Site, severity and alternatives; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, RawQuery, State},
};
use stopid_core::{filter::SiteFilter, site::SiteId, store::CatalogStore};

use crate::{
  error::ApiError,
  view::{SiteDetail, SiteView},
};

/// Decode a raw query string into a filter, keeping repeated keys.
pub fn filter_from_query(query: Option<&str>) -> SiteFilter {
  SiteFilter::from_pairs(url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /sites[?category=..&country=..&q=..]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  RawQuery(query): RawQuery,
) -> Result<Json<Vec<SiteView>>, ApiError>
where
  S: CatalogStore,
{
  let filter = filter_from_query(query.as_deref());
  let sites = store.list_sites(&filter).await.map_err(ApiError::from_store)?;
  Ok(Json(sites.into_iter().map(SiteView::from).collect()))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /sites/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<SiteId>,
) -> Result<Json<SiteDetail>, ApiError>
where
  S: CatalogStore,
{
  let site = store
    .get_site(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(stopid_core::Error::SiteNotFound(id))?;
  let alternatives = store.alternatives(id).await.map_err(ApiError::from_store)?;
  Ok(Json(SiteDetail { site: site.into(), alternatives }))
}
