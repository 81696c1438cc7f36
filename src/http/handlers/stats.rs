use crate::stats::log_store::LogQuery;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

pub async fn realtime(State(state): State<AppState>) -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(state.engine.realtime_stats())).into_response()
}

pub async fn selection_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> impl IntoResponse {
    let logs = state.engine.query_logs(&query);
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({
            "count": logs.len(),
            "logs": logs,
        })),
    )
        .into_response()
}
