//! JSON REST API for the StopIDCheck catalogue.
//!
//! Exposes a read-only axum [`Router`] backed by any
//! [`stopid_core::store::CatalogStore`]. Sessions and the review workflow
//! live in the HTML layer.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stopid_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod facets;
pub mod sites;
pub mod view;

use std::sync::Arc;

use axum::{Router, routing::get};
use stopid_core::store::CatalogStore;

pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CatalogStore + 'static,
{
  Router::new()
    .route("/sites", get(sites::list::<S>))
    .route("/sites/{id}", get(sites::get_one::<S>))
    .route("/facets", get(facets::handler::<S>))
    .with_state(store)
}
