//! Administrator login and logout.

use axum::{
  Form,
  extract::State,
  http::HeaderMap,
  response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use stopid_core::store::CatalogStore;

use crate::{
  AppState, Result,
  auth::clear_session_cookie,
  flash::{Flash, redirect_with_cookies},
  handlers::context,
  templates::{LoginTemplate, page},
};

#[derive(Debug, Deserialize)]
pub struct Credentials {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

/// `GET /login`
pub async fn form<S>(State(state): State<AppState<S>>, headers: HeaderMap) -> Result<Response>
where
  S: CatalogStore,
{
  let ctx = context(&state, &headers);
  if ctx.is_admin {
    return Ok(Redirect::to("/admin").into_response());
  }
  let template = LoginTemplate { ctx, username: String::new() };
  page(&template, &template.ctx)
}

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Form(credentials): Form<Credentials>,
) -> Response
where
  S: CatalogStore,
{
  let username = credentials.username.trim();
  if !state.auth.check_credentials(username, &credentials.password) {
    tracing::warn!(username, "failed login attempt");
    return Flash::error("Identifiants incorrects.").redirect("/login");
  }

  tracing::info!(username, "administrator signed in");
  redirect_with_cookies("/admin", [
    state.auth.session_cookie(username),
    Flash::success("Connexion réussie.").cookie(),
  ])
}

/// `GET /logout`
pub async fn logout() -> Response {
  redirect_with_cookies("/", [
    clear_session_cookie(),
    Flash::success("Vous êtes déconnecté.").cookie(),
  ])
}
