use crate::circuit::state::BreakerThresholds;
use crate::scoring::types::ScoreWeights;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub internal_api_key: String,
    pub breaker: BreakerThresholds,
    pub weights: ScoreWeights,
    pub max_reserve_attempts: usize,
    pub ticker_interval_secs: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let breaker_defaults = BreakerThresholds::default();
        let weight_defaults = ScoreWeights::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            internal_api_key: std::env::var("INTERNAL_API_KEY")
                .unwrap_or_else(|_| "dev-internal-key".to_string()),
            breaker: BreakerThresholds {
                failure_rate_open: env_parse("BREAKER_FAILURE_RATE", breaker_defaults.failure_rate_open),
                min_samples: env_parse("BREAKER_MIN_SAMPLES", breaker_defaults.min_samples),
                window_secs: env_parse("BREAKER_WINDOW_SECS", breaker_defaults.window_secs),
                cooldown_secs: env_parse("BREAKER_COOLDOWN_SECS", breaker_defaults.cooldown_secs),
            },
            weights: ScoreWeights {
                tier_exact_bonus: env_parse("SCORE_TIER_EXACT", weight_defaults.tier_exact_bonus),
                tier_adjacent_bonus: env_parse("SCORE_TIER_ADJACENT", weight_defaults.tier_adjacent_bonus),
                geo_city_boost: env_parse("SCORE_GEO_CITY", weight_defaults.geo_city_boost),
                geo_state_boost: env_parse("SCORE_GEO_STATE", weight_defaults.geo_state_boost),
                success_rate_scale: env_parse("SCORE_SUCCESS_SCALE", weight_defaults.success_rate_scale),
                headroom_penalty_max: env_parse("SCORE_HEADROOM_PENALTY", weight_defaults.headroom_penalty_max),
            },
            max_reserve_attempts: env_parse("MAX_RESERVE_ATTEMPTS", 3),
            ticker_interval_secs: env_parse("BREAKER_TICK_SECS", 5),
        }
    }
}
