//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::templates::render_not_found;

#[derive(Debug, Error)]
pub enum Error {
  #[error("template error: {0}")]
  Template(#[from] askama::Error),
  #[error(transparent)]
  Core(#[from] stopid_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// Convert a backend error through the core taxonomy.
  pub fn from_store<E: Into<stopid_core::Error>>(e: E) -> Self { Error::Core(e.into()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Core(stopid_core::Error::SiteNotFound(_)) => {
        match render_not_found() {
          Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
          Err(_) => (StatusCode::NOT_FOUND, "Page introuvable").into_response(),
        }
      }
      Error::Template(e) => {
        tracing::error!(error = %e, "template rendering failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Erreur interne").into_response()
      }
      Error::Core(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Erreur interne").into_response()
      }
    }
  }
}
