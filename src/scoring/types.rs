use crate::domain::selection_log::{GeoMatch, TierMatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tunable scoring weights. The magnitudes are configuration, not algorithm:
/// defaults make an exact tier dominate, a city match beat a state match,
/// success rate separate otherwise-tied candidates, and low headroom cost a
/// small penalty so load spreads across the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub tier_exact_bonus: f64,
    pub tier_adjacent_bonus: f64,
    pub geo_city_boost: f64,
    pub geo_state_boost: f64,
    /// Multiplier applied to the endpoint's 0..=100 success rate.
    pub success_rate_scale: f64,
    /// Maximum penalty as an endpoint approaches its daily limit.
    pub headroom_penalty_max: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            tier_exact_bonus: 50.0,
            tier_adjacent_bonus: 20.0,
            geo_city_boost: 15.0,
            geo_state_boost: 8.0,
            success_rate_scale: 0.3,
            headroom_penalty_max: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub tier_bonus: f64,
    pub geo_boost: f64,
    pub success_component: f64,
    pub headroom_penalty: f64,
    pub final_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub endpoint_id: Uuid,
    pub bank: String,
    pub score: f64,
    pub tier_match: TierMatch,
    pub geo_match: GeoMatch,
    pub geo_boost: i64,
    pub breakdown: ScoreBreakdown,
    /// Registry version observed at scoring time; reservation CAS target.
    pub version: u64,
    pub daily_volume: i64,
}
