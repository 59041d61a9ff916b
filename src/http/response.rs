//! Error responses for the control surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::navigation::NavigationError;
use crate::routing::ResolveError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Status code and machine-readable kind for a navigation failure.
pub fn classify(err: &NavigationError) -> (StatusCode, &'static str) {
    match err {
        NavigationError::Resolve(ResolveError::UnknownName(_)) => {
            (StatusCode::NOT_FOUND, "unknown_route")
        }
        NavigationError::Resolve(ResolveError::MissingParam { .. }) => {
            (StatusCode::BAD_REQUEST, "missing_param")
        }
        NavigationError::Resolve(ResolveError::NoMatch(_)) => (StatusCode::NOT_FOUND, "no_match"),
        NavigationError::Resolve(ResolveError::RedirectLoop(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "redirect_loop")
        }
        NavigationError::Load { .. } => (StatusCode::BAD_GATEWAY, "load_failed"),
    }
}

impl IntoResponse for NavigationError {
    fn into_response(self) -> Response {
        let (status, error) = classify(&self);
        (
            status,
            Json(ErrorBody {
                error,
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        NavigationError::Resolve(self).into_response()
    }
}
