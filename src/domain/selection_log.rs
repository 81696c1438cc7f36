use crate::domain::endpoint::Tier;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TierMatch {
    Exact,
    Adjacent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeoMatch {
    City,
    State,
    None,
}

/// Immutable audit record of one routing decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionLog {
    pub id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub endpoint_id: Uuid,
    pub bank: String,
    pub amount: i64,
    pub score: f64,
    pub request_tier: Tier,
    pub tier_match: TierMatch,
    pub geo_match: GeoMatch,
    pub geo_boost: i64,
}
