//! The `CatalogStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `stopid-store-sqlite`).
//! Higher layers (`stopid-api`, `stopid-web`, `stopid-cli`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  admin::Admin,
  filter::{Facets, SiteFilter},
  site::{Alternative, Site, SiteId},
  source::SourceDocument,
  suggestion::{NewSuggestion, Suggestion, SuggestionId},
  sync::{SyncMode, SyncReport},
};

/// Abstraction over a StopIDCheck catalogue backend.
///
/// Every mutating operation is atomic: it either completes in full or leaves
/// the store untouched. Review operations require an [`Admin`] capability,
/// which only an authenticated session can produce.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Sites ─────────────────────────────────────────────────────────────

  /// Sites matching `filter`, ordered by name (case-insensitive).
  fn list_sites<'a>(
    &'a self,
    filter: &'a SiteFilter,
  ) -> impl Future<Output = Result<Vec<Site>, Self::Error>> + Send + 'a;

  /// Retrieve a site by id. Returns `None` if not found.
  fn get_site(
    &self,
    id: SiteId,
  ) -> impl Future<Output = Result<Option<Site>, Self::Error>> + Send + '_;

  /// The `limit` most recently inserted sites, newest first.
  fn recent_sites(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Site>, Self::Error>> + Send + '_;

  /// Alternatives of one site, ordered by name.
  fn alternatives(
    &self,
    site_id: SiteId,
  ) -> impl Future<Output = Result<Vec<Alternative>, Self::Error>> + Send + '_;

  /// Values offered by the filter widgets.
  fn facets(&self) -> impl Future<Output = Result<Facets, Self::Error>> + Send + '_;

  // ── Suggestions ───────────────────────────────────────────────────────

  /// Persist a validated submission. The timestamp is set by the store.
  fn submit_suggestion(
    &self,
    input: NewSuggestion,
  ) -> impl Future<Output = Result<Suggestion, Self::Error>> + Send + '_;

  /// Pending suggestions, newest first.
  fn list_pending<'a>(
    &'a self,
    admin: &'a Admin,
  ) -> impl Future<Output = Result<Vec<Suggestion>, Self::Error>> + Send + 'a;

  /// Copy a suggestion and its proposed alternatives into the catalogue and
  /// delete it, in one transaction.
  ///
  /// Fails without changes if the suggestion is gone or a site with the same
  /// name already exists.
  fn approve<'a>(
    &'a self,
    admin: &'a Admin,
    id: SuggestionId,
  ) -> impl Future<Output = Result<Site, Self::Error>> + Send + 'a;

  /// Delete a suggestion without touching the catalogue.
  fn reject<'a>(
    &'a self,
    admin: &'a Admin,
    id: SuggestionId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Reconciliation ────────────────────────────────────────────────────

  /// Bring the catalogue in line with `document`, in one transaction.
  fn reconcile<'a>(
    &'a self,
    document: &'a SourceDocument,
    mode: SyncMode,
  ) -> impl Future<Output = Result<SyncReport, Self::Error>> + Send + 'a;
}
