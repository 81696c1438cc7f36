use crate::domain::endpoint::{Endpoint, Tier};
use crate::domain::request::PayinRequest;
use crate::domain::selection_log::{GeoMatch, TierMatch};
use crate::scoring::types::{ScoreBreakdown, ScoreWeights, ScoredCandidate};

pub fn tier_match(request_band: Tier, endpoint_tier: Tier) -> Option<TierMatch> {
    if endpoint_tier == request_band {
        Some(TierMatch::Exact)
    } else if endpoint_tier.is_adjacent(request_band) {
        Some(TierMatch::Adjacent)
    } else {
        None
    }
}

pub fn geo_match(request: &PayinRequest, endpoint: &Endpoint) -> GeoMatch {
    let city_hit = match (&request.user_city, &endpoint.bank_city) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };
    if city_hit {
        return GeoMatch::City;
    }
    let state_hit = match (&request.user_state, &endpoint.bank_state) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };
    if state_hit {
        GeoMatch::State
    } else {
        GeoMatch::None
    }
}

/// Pure, deterministic score for one candidate. Returns `None` when the
/// endpoint tier is neither exact nor adjacent to the request band: that is a
/// hard exclusion, not a low score.
pub fn score_endpoint(
    request_band: Tier,
    request: &PayinRequest,
    endpoint: &Endpoint,
    weights: &ScoreWeights,
) -> Option<ScoredCandidate> {
    let tier = tier_match(request_band, endpoint.tier)?;
    let tier_bonus = match tier {
        TierMatch::Exact => weights.tier_exact_bonus,
        TierMatch::Adjacent => weights.tier_adjacent_bonus,
    };

    let geo = geo_match(request, endpoint);
    let geo_boost = match geo {
        GeoMatch::City => weights.geo_city_boost,
        GeoMatch::State => weights.geo_state_boost,
        GeoMatch::None => 0.0,
    };

    let success_component = endpoint.success_rate * weights.success_rate_scale;

    let utilization = if endpoint.daily_limit > 0 {
        endpoint.daily_volume as f64 / endpoint.daily_limit as f64
    } else {
        1.0
    };
    let headroom_penalty = utilization.clamp(0.0, 1.0) * weights.headroom_penalty_max;

    let final_score = tier_bonus + geo_boost + success_component - headroom_penalty;

    Some(ScoredCandidate {
        endpoint_id: endpoint.id,
        bank: endpoint.bank.clone(),
        score: final_score,
        tier_match: tier,
        geo_match: geo,
        geo_boost: geo_boost as i64,
        breakdown: ScoreBreakdown {
            tier_bonus,
            geo_boost,
            success_component,
            headroom_penalty,
            final_score,
        },
        version: endpoint.version,
        daily_volume: endpoint.daily_volume,
    })
}

/// Sorts candidates best-first. Ties break on lower committed volume, then
/// lowest endpoint id, so the ordering is reproducible for audit.
pub fn rank(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.daily_volume.cmp(&b.daily_volume))
            .then(a.endpoint_id.cmp(&b.endpoint_id))
    });
    candidates
}
