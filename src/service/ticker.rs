use crate::service::engine::RoutingEngine;
use std::time::Duration;

/// Background task driving time-based breaker transitions (OPEN → HALF_OPEN
/// after cooldown), so banks recover even with no traffic.
#[derive(Clone)]
pub struct BreakerTicker {
    pub engine: RoutingEngine,
    pub interval: Duration,
}

impl BreakerTicker {
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.engine.tick_breakers(chrono::Utc::now());
        }
    }
}
