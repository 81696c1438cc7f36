use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PayinRequest {
    pub amount: i64,
    pub user_city: Option<String>,
    pub user_state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionResponse {
    pub selection_id: Uuid,
    pub endpoint_id: Uuid,
    pub bank: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Completed,
    Failed,
    Expired,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeReport {
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}
