//! `GET /facets`: values for the filter widgets.

use std::sync::Arc;

use axum::{Json, extract::State};
use stopid_core::{filter::Facets, store::CatalogStore};

use crate::error::ApiError;

pub async fn handler<S>(State(store): State<Arc<S>>) -> Result<Json<Facets>, ApiError>
where
  S: CatalogStore,
{
  let facets = store.facets().await.map_err(ApiError::from_store)?;
  Ok(Json(facets))
}
