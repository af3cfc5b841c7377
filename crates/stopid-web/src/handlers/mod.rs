pub mod admin;
pub mod pages;
pub mod session;
pub mod suggest;

use axum::http::HeaderMap;
use stopid_core::store::CatalogStore;

use crate::{AppState, templates::PageContext};

pub(super) fn context<S: CatalogStore>(state: &AppState<S>, headers: &HeaderMap) -> PageContext {
  PageContext::new(headers, &state.auth)
}
