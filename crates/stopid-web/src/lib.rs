//! HTML front end for the StopIDCheck catalogue.
//!
//! Exposes an axum [`Router`] serving the public pages, the suggestion form
//! and the administrator review queue, backed by any [`CatalogStore`]. The
//! JSON API from `stopid-api` is nested under `/api`.

pub mod auth;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod templates;

pub use error::{Error, Result};

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use stopid_core::{settings::Settings, store::CatalogStore};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use handlers::{admin, pages, session, suggest};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: CatalogStore> {
  pub store:     Arc<S>,
  pub settings:  Arc<Settings>,
  pub auth:      Arc<AuthConfig>,
  /// Held for the duration of a reconciliation run.
  pub sync_lock: Arc<Mutex<()>>,
}

impl<S: CatalogStore> AppState<S> {
  pub fn new(store: S, settings: Settings, auth: AuthConfig) -> Self {
    Self {
      store:     Arc::new(store),
      settings:  Arc::new(settings),
      auth:      Arc::new(auth),
      sync_lock: Arc::new(Mutex::new(())),
    }
  }
}

impl<S: CatalogStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      settings:  self.settings.clone(),
      auth:      self.auth.clone(),
      sync_lock: self.sync_lock.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the site's axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CatalogStore + 'static,
{
  let api = stopid_api::api_router(state.store.clone());

  Router::new()
    .route("/",                   get(pages::index::<S>))
    .route("/sites",              get(pages::sites::<S>))
    .route("/site/{id}",          get(pages::site_detail::<S>))
    .route("/suggest",            get(suggest::form::<S>).post(suggest::submit::<S>))
    .route("/login",              get(session::form::<S>).post(session::login::<S>))
    .route("/logout",             get(session::logout))
    .route("/admin",              get(admin::dashboard::<S>))
    .route("/admin/approve/{id}", post(admin::approve::<S>))
    .route("/admin/reject/{id}",  post(admin::reject::<S>))
    .route("/admin/sync",         post(admin::sync::<S>))
    .fallback(pages::not_found::<S>)
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::path::PathBuf;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use stopid_core::admin::Admin;
  use stopid_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use crate::flash::{FLASH_COOKIE, Flash};

  const SEED_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../stopid-core/seed/sites.json");

  async fn make_state(sync_source: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.seed_if_empty().await.unwrap();
    let settings = Settings {
      sync_source: PathBuf::from(sync_source),
      ..Settings::default()
    };
    let auth = AuthConfig::new("admin", "password", "test-secret-key").unwrap();
    AppState::new(store, settings, auth)
  }

  async fn send(
    state: &AppState<SqliteStore>,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    form: Option<&str>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    let body = match form {
      Some(form) => {
        builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        Body::from(form.to_owned())
      }
      None => Body::empty(),
    };
    router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  fn location(resp: &Response) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
  }

  /// The `Set-Cookie` values of a response, reduced to `name=value`.
  fn cookies(resp: &Response) -> Vec<String> {
    resp
      .headers()
      .get_all(header::SET_COOKIE)
      .iter()
      .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_owned())
      .collect()
  }

  fn flash_of(resp: &Response) -> Flash {
    let cookie = cookies(resp)
      .into_iter()
      .find(|c| c.starts_with(FLASH_COOKIE))
      .unwrap();
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(header::COOKIE, cookie.parse().unwrap());
    Flash::from_headers(&headers).unwrap()
  }

  fn session_cookie(state: &AppState<SqliteStore>) -> String {
    format!("{}={}", auth::SESSION_COOKIE, state.auth.create_session("admin"))
  }

  // ── Public pages ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn home_lists_categories_and_recent_sites() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "GET", "/", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("/sites?category="));
    assert!(html.contains("Spotify"));
    assert!(html.contains("Connexion"));
  }

  #[tokio::test]
  async fn sites_page_applies_filters() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "GET", "/sites?country=FR", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Pornhub"));
    assert!(!html.contains("Spotify</a>"));
    assert!(html.contains("Réinitialiser"));
  }

  #[tokio::test]
  async fn site_detail_and_missing_site() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "GET", "/site/2", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Reddit"));

    let resp = send(&state, "GET", "/site/999", None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Page introuvable"));
  }

  #[tokio::test]
  async fn unknown_path_renders_not_found_page() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "GET", "/nowhere", None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Page introuvable"));
  }

  #[tokio::test]
  async fn api_is_nested() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "GET", "/api/facets", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  // ── Suggestions ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn incomplete_suggestion_is_redisplayed() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "POST", "/suggest", None, Some("name=Discord&url=")).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(resp).await;
    assert!(html.contains("Veuillez remplir les champs obligatoires"));
    assert!(html.contains("value=\"Discord\""));

    let admin = Admin::new("admin");
    assert!(state.store.list_pending(&admin).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn script_url_suggestion_is_refused() {
    let state = make_state(SEED_PATH).await;
    let resp = send(
      &state,
      "POST",
      "/suggest",
      None,
      Some("name=Evil&url=javascript%3Aalert(1)&category=Messagerie"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(resp).await.contains("L’adresse doit commencer par"));

    let admin = Admin::new("admin");
    assert!(state.store.list_pending(&admin).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn suggestion_is_stored_and_thanked() {
    let state = make_state(SEED_PATH).await;
    let resp = send(
      &state,
      "POST",
      "/suggest",
      None,
      Some("name=Discord&url=https%3A%2F%2Fdiscord.com&category=Messagerie&country=UK&country=FR"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(flash_of(&resp).message.starts_with("Merci pour votre suggestion"));

    let admin = Admin::new("admin");
    let pending = state.store.list_pending(&admin).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].country, "UK, FR");
  }

  // ── Sessions ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_sets_session() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "POST", "/login", None, Some("username=admin&password=password")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin");

    let session = cookies(&resp)
      .into_iter()
      .find(|c| c.starts_with(auth::SESSION_COOKIE))
      .unwrap();
    let resp = send(&state, "GET", "/admin", Some(&session), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Suggestions en attente"));
  }

  #[tokio::test]
  async fn bad_credentials_are_refused() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "POST", "/login", None, Some("username=admin&password=nope")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert_eq!(flash_of(&resp).message, "Identifiants incorrects.");
    assert!(!cookies(&resp).iter().any(|c| c.starts_with(auth::SESSION_COOKIE)));
  }

  #[tokio::test]
  async fn logout_clears_session() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "GET", "/logout", Some(&session_cookie(&state)), None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(cookies(&resp).contains(&format!("{}=", auth::SESSION_COOKIE)));
  }

  #[tokio::test]
  async fn admin_routes_require_a_session() {
    let state = make_state(SEED_PATH).await;
    for (method, uri) in [
      ("GET", "/admin"),
      ("POST", "/admin/approve/1"),
      ("POST", "/admin/reject/1"),
      ("POST", "/admin/sync"),
    ] {
      let resp = send(&state, method, uri, Some("stopid_session=admin|9999999999|bad"), Some("")).await;
      assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{method} {uri}");
      assert_eq!(location(&resp), "/login");
    }
  }

  // ── Review ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn approve_publishes_suggestion() {
    let state = make_state(SEED_PATH).await;
    let session = session_cookie(&state);
    send(
      &state,
      "POST",
      "/suggest",
      None,
      Some("name=Discord&url=https%3A%2F%2Fdiscord.com&category=Messagerie&alternatives=Matrix%7Chttps%3A%2F%2Fmatrix.org"),
    )
    .await;

    let html = body_text(send(&state, "GET", "/admin", Some(&session), None).await).await;
    assert!(html.contains("Discord"));
    assert!(html.contains("/admin/approve/1"));

    let resp = send(&state, "POST", "/admin/approve/1", Some(&session), Some("")).await;
    assert_eq!(location(&resp), "/admin");
    assert_eq!(flash_of(&resp).message, "Suggestion approuvée et ajoutée à la base.");

    let html = body_text(send(&state, "GET", "/sites?q=discord", None, None).await).await;
    assert!(html.contains("Discord"));

    let resp = send(&state, "POST", "/admin/approve/1", Some(&session), Some("")).await;
    assert_eq!(flash_of(&resp).message, "Suggestion introuvable.");
  }

  #[tokio::test]
  async fn approving_an_existing_name_is_refused() {
    let state = make_state(SEED_PATH).await;
    let session = session_cookie(&state);
    send(&state, "POST", "/suggest", None, Some("name=Reddit&url=https%3A%2F%2Freddit.com&category=Forum")).await;

    let resp = send(&state, "POST", "/admin/approve/1", Some(&session), Some("")).await;
    let flash = flash_of(&resp);
    assert_eq!(flash.kind, flash::FlashKind::Error);
    assert!(flash.message.contains("Reddit"));
  }

  #[tokio::test]
  async fn reject_discards_suggestion() {
    let state = make_state(SEED_PATH).await;
    let session = session_cookie(&state);
    send(&state, "POST", "/suggest", None, Some("name=Discord&url=https%3A%2F%2Fdiscord.com&category=Messagerie")).await;

    let resp = send(&state, "POST", "/admin/reject/1", Some(&session), Some("")).await;
    assert_eq!(flash_of(&resp).message, "Suggestion supprimée.");

    let html = body_text(send(&state, "GET", "/admin", Some(&session), None).await).await;
    assert!(html.contains("Aucune suggestion en attente."));
  }

  // ── Sync ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sync_against_unchanged_source_reports_nothing() {
    let state = make_state(SEED_PATH).await;
    let resp = send(&state, "POST", "/admin/sync", Some(&session_cookie(&state)), Some("")).await;
    assert_eq!(location(&resp), "/admin");
    let flash = flash_of(&resp);
    assert_eq!(flash.kind, flash::FlashKind::Success);
    assert!(flash.message.contains("aucun changement"));
  }

  #[tokio::test]
  async fn sync_with_missing_source_warns() {
    let state = make_state("/nonexistent/stopid/sites.json").await;
    let resp = send(&state, "POST", "/admin/sync", Some(&session_cookie(&state)), Some("prune=on")).await;
    let flash = flash_of(&resp);
    assert_eq!(flash.kind, flash::FlashKind::Warning);
    assert!(flash.message.contains("introuvable"));
  }
}
