//! Control surface handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::navigation::{NavigationError, NavigationOutcome};
use crate::routing::{Params, Resolution, ResolveError, RouteNode};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct RouteListing {
    pub base: String,
    pub routes: Vec<RouteNode>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub path: String,
}

/// Body of `POST /api/navigate`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NavigateRequest {
    Named {
        name: String,
        #[serde(default)]
        params: Params,
    },
    Path {
        path: String,
    },
}

#[derive(Serialize)]
struct Superseded {
    superseded: bool,
    sequence: u64,
    latest: u64,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn list_routes(State(state): State<AppState>) -> Json<RouteListing> {
    let navigator = &state.navigator;
    Json(RouteListing {
        base: navigator.history().base().to_string(),
        routes: navigator.table().routes().to_vec(),
    })
}

pub async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<Resolution>, ResolveError> {
    let navigator = &state.navigator;
    let path = navigator.history().strip_base(&query.path);
    navigator.table().resolve(path).map(Json)
}

pub async fn navigate(
    State(state): State<AppState>,
    Json(request): Json<NavigateRequest>,
) -> Result<Response, NavigationError> {
    let outcome = match request {
        NavigateRequest::Named { name, params } => {
            state.navigator.push_named(&name, &params).await?
        }
        NavigateRequest::Path { path } => state.navigator.push(&path).await?,
    };
    Ok(outcome_response(outcome))
}

pub async fn current(State(state): State<AppState>) -> Response {
    match state.navigator.current() {
        Some(activation) => Json(activation).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn back(State(state): State<AppState>) -> Result<Response, NavigationError> {
    Ok(match state.navigator.back().await? {
        Some(outcome) => outcome_response(outcome),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn forward(State(state): State<AppState>) -> Result<Response, NavigationError> {
    Ok(match state.navigator.forward().await? {
        Some(outcome) => outcome_response(outcome),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

fn outcome_response(outcome: NavigationOutcome) -> Response {
    match outcome {
        NavigationOutcome::Completed(activation) => Json(activation).into_response(),
        NavigationOutcome::Superseded { sequence, latest } => (
            StatusCode::ACCEPTED,
            Json(Superseded {
                superseded: true,
                sequence,
                latest,
            }),
        )
            .into_response(),
    }
}
