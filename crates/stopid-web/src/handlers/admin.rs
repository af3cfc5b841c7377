//! The review queue and the manual sync trigger.
//!
//! Every handler takes an [`AdminSession`]; mutations are POST-only and
//! report their outcome as a notice on `/admin`.

use axum::{
  Form,
  extract::{Path, State},
  http::HeaderMap,
  response::Response,
};
use serde::Deserialize;
use stopid_core::{
  store::CatalogStore,
  suggestion::SuggestionId,
  sync::{SyncMode, sync_from_file},
};

use crate::{
  AppState, Error, Result,
  auth::AdminSession,
  flash::Flash,
  handlers::context,
  templates::{AdminTemplate, PendingView, page},
};

/// `GET /admin`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  AdminSession(admin): AdminSession,
  headers: HeaderMap,
) -> Result<Response>
where
  S: CatalogStore + 'static,
{
  let pending = state.store.list_pending(&admin).await.map_err(Error::from_store)?;

  let template = AdminTemplate {
    ctx:         context(&state, &headers),
    pending:     pending.into_iter().map(PendingView::from).collect(),
    sync_source: state.settings.sync_source.display().to_string(),
  };
  page(&template, &template.ctx)
}

/// `POST /admin/approve/{id}`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<SuggestionId>,
) -> Response
where
  S: CatalogStore + 'static,
{
  let flash = match state.store.approve(&admin, id).await.map_err(Error::from_store) {
    Ok(site) => {
      tracing::debug!(site = site.id, "approved suggestion published");
      Flash::success("Suggestion approuvée et ajoutée à la base.")
    }
    Err(e) => failure_notice(e),
  };
  flash.redirect("/admin")
}

/// `POST /admin/reject/{id}`
pub async fn reject<S>(
  State(state): State<AppState<S>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<SuggestionId>,
) -> Response
where
  S: CatalogStore + 'static,
{
  let flash = match state.store.reject(&admin, id).await.map_err(Error::from_store) {
    Ok(()) => Flash::success("Suggestion supprimée."),
    Err(e) => failure_notice(e),
  };
  flash.redirect("/admin")
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncForm {
  /// Checkbox; present when ticked.
  pub prune: Option<String>,
}

/// `POST /admin/sync`
///
/// Runs are serialised; a second request waits for the first to finish.
pub async fn sync<S>(
  State(state): State<AppState<S>>,
  AdminSession(admin): AdminSession,
  Form(form): Form<SyncForm>,
) -> Response
where
  S: CatalogStore + 'static,
{
  let mode = SyncMode::from_prune_flag(form.prune.is_some());
  let _guard = state.sync_lock.lock().await;

  let result = sync_from_file(state.store.as_ref(), &state.settings.sync_source, mode).await;
  let flash = match result {
    Ok(report) => {
      tracing::info!(admin = admin.username(), ?mode, %report, "sync completed");
      if report.changed() {
        Flash::success(format!("Synchronisation terminée. {report}"))
      } else {
        Flash::success("Synchronisation terminée : aucun changement.")
      }
    }
    Err(stopid_core::Error::SourceMissing(path)) => {
      tracing::warn!(path = %path.display(), "sync source not found");
      Flash::warning(format!("Fichier source introuvable : {}", path.display()))
    }
    Err(stopid_core::Error::InvalidSource(reason)) => {
      tracing::warn!(%reason, "sync source rejected");
      Flash::error(format!("Fichier source invalide : {reason}"))
    }
    Err(e) => failure_notice(Error::Core(e)),
  };
  flash.redirect("/admin")
}

/// The notice shown for a failed review action.
fn failure_notice(e: Error) -> Flash {
  match e {
    Error::Core(stopid_core::Error::SuggestionNotFound(_)) => Flash::error("Suggestion introuvable."),
    Error::Core(stopid_core::Error::DuplicateSite(name)) => {
      Flash::error(format!("Un site nommé « {name} » existe déjà."))
    }
    e => {
      tracing::error!(error = %e, "admin action failed");
      Flash::error("Une erreur interne est survenue.")
    }
  }
}
