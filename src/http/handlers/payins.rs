use crate::domain::request::{OutcomeReport, PayinRequest};
use crate::error::EngineError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

pub async fn select_endpoint(
    State(state): State<AppState>,
    Json(req): Json<PayinRequest>,
) -> impl IntoResponse {
    match state.engine.select(&req) {
        Ok(selection) => (axum::http::StatusCode::OK, Json(selection)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn report_outcome(
    State(state): State<AppState>,
    Path(selection_id): Path<Uuid>,
    Json(report): Json<OutcomeReport>,
) -> impl IntoResponse {
    match state.engine.report_outcome(selection_id, report.outcome) {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"recorded": true})),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}

pub fn error_response(e: EngineError) -> axum::response::Response {
    (e.status(), Json(e.envelope())).into_response()
}
