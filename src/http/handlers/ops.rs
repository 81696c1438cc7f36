use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let endpoints = state.engine.registry.list().len();
    let banks = state.engine.circuit_status().len();
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({
            "ready": true,
            "endpoints": endpoints,
            "banks": banks,
        })),
    )
        .into_response()
}

pub async fn liveness() -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(serde_json::json!({"alive": true}))).into_response()
}
