use crate::http::handlers::payins::error_response;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    #[serde(default)]
    pub include_acknowledged: bool,
}

#[derive(Debug, Deserialize)]
pub struct AckRequest {
    pub acknowledged_by: String,
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        Json(state.engine.alerts.list(query.include_acknowledged)),
    )
        .into_response()
}

pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AckRequest>,
) -> impl IntoResponse {
    match state
        .engine
        .alerts
        .acknowledge(id, &req.acknowledged_by, chrono::Utc::now())
    {
        Ok(alert) => (axum::http::StatusCode::OK, Json(alert)).into_response(),
        Err(e) => error_response(e),
    }
}
