use crate::domain::endpoint::{EndpointUpdate, NewEndpoint};
use crate::http::handlers::payins::error_response;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

pub async fn list_endpoints(State(state): State<AppState>) -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(state.engine.registry.list())).into_response()
}

pub async fn create_endpoint(
    State(state): State<AppState>,
    Json(req): Json<NewEndpoint>,
) -> impl IntoResponse {
    let endpoint = state.engine.registry.insert(req, chrono::Utc::now());
    tracing::info!(endpoint = %endpoint.id, bank = %endpoint.bank, "endpoint registered");
    (axum::http::StatusCode::CREATED, Json(endpoint)).into_response()
}

pub async fn update_endpoint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<EndpointUpdate>,
) -> impl IntoResponse {
    match state.engine.registry.update(id, update) {
        Ok(endpoint) => (axum::http::StatusCode::OK, Json(endpoint)).into_response(),
        Err(e) => error_response(e),
    }
}
