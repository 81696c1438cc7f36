use crate::http::handlers::payins::error_response;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let rows = state.engine.circuit_status();
    (axum::http::StatusCode::OK, Json(rows)).into_response()
}

pub async fn reset(State(state): State<AppState>, Path(bank): Path<String>) -> impl IntoResponse {
    match state.engine.reset_circuit(&bank.to_uppercase()) {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"success": true})),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn audit(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        Json(state.engine.monitor.audit_log()),
    )
        .into_response()
}
