use crate::circuit::state::CircuitState;
use crate::domain::request::Outcome;
use serde::Serialize;
use uuid::Uuid;

/// Engine state changes, published on a broadcast channel so dashboards
/// subscribe instead of polling.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    SelectionMade {
        selection_id: Uuid,
        endpoint_id: Uuid,
        bank: String,
        score: f64,
    },
    OutcomeReported {
        selection_id: Uuid,
        bank: String,
        outcome: Outcome,
    },
    CircuitTransitioned {
        bank: String,
        from: CircuitState,
        to: CircuitState,
    },
    AlertRaised {
        alert_id: Uuid,
        bank: String,
    },
}
