use crate::domain::request::{ErrorEnvelope, ErrorPayload};
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no endpoint passes tier/capacity/breaker filters")]
    NoEligibleEndpoint,
    #[error("all ranked candidates lost the reservation race")]
    PoolExhausted,
    #[error("unknown selection {0}")]
    UnknownSelection(Uuid),
    #[error("unknown endpoint {0}")]
    UnknownEndpoint(Uuid),
    #[error("unknown bank {0}")]
    UnknownBank(String),
    #[error("unknown alert {0}")]
    UnknownAlert(Uuid),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidRequest(_) => "INVALID_REQUEST",
            EngineError::NoEligibleEndpoint => "NO_ELIGIBLE_ENDPOINT",
            EngineError::PoolExhausted => "POOL_EXHAUSTED",
            EngineError::UnknownSelection(_) => "UNKNOWN_SELECTION",
            EngineError::UnknownEndpoint(_) => "UNKNOWN_ENDPOINT",
            EngineError::UnknownBank(_) => "UNKNOWN_BANK",
            EngineError::UnknownAlert(_) => "UNKNOWN_ALERT",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            EngineError::NoEligibleEndpoint | EngineError::PoolExhausted => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            EngineError::UnknownSelection(_)
            | EngineError::UnknownEndpoint(_)
            | EngineError::UnknownBank(_)
            | EngineError::UnknownAlert(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorPayload {
                code: self.code().to_string(),
                message: self.to_string(),
                details: None,
            },
        }
    }
}
