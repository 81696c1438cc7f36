use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Breaker tuning. Defaults: a bank opens once 5+ outcomes in the trailing
/// 15 minutes fail at over 30%, cools down for 10 minutes, then admits one
/// probe at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerThresholds {
    pub failure_rate_open: f64,
    pub min_samples: usize,
    pub window_secs: i64,
    pub cooldown_secs: i64,
}

impl Default for BreakerThresholds {
    fn default() -> Self {
        Self {
            failure_rate_open: 0.30,
            min_samples: 5,
            window_secs: 15 * 60,
            cooldown_secs: 10 * 60,
        }
    }
}

/// Per-bank breaker: state plus the rolling outcome window backing it.
#[derive(Debug, Clone)]
pub struct BankCircuit {
    pub bank: String,
    pub state: CircuitState,
    pub opened_at: Option<chrono::DateTime<chrono::Utc>>,
    pub probe_in_flight: bool,
    /// (observed_at, success) pairs, oldest first.
    pub window: VecDeque<(chrono::DateTime<chrono::Utc>, bool)>,
}

impl BankCircuit {
    pub fn new(bank: &str) -> Self {
        Self {
            bank: bank.to_string(),
            state: CircuitState::Closed,
            opened_at: None,
            probe_in_flight: false,
            window: VecDeque::new(),
        }
    }

    pub fn prune(&mut self, window_secs: i64, now: chrono::DateTime<chrono::Utc>) {
        let floor = now - chrono::Duration::seconds(window_secs);
        while self.window.front().is_some_and(|(ts, _)| *ts < floor) {
            self.window.pop_front();
        }
    }

    pub fn failure_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let failed = self.window.iter().filter(|(_, ok)| !ok).count();
        failed as f64 / self.window.len() as f64
    }
}

/// What the selector may do against a bank right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    /// Half-open and the single probe slot is free.
    Probe,
    Reject,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircuitTransition {
    pub bank: String,
    pub from: CircuitState,
    pub to: CircuitState,
    pub reason: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BankCircuitSnapshot {
    pub bank: String,
    pub state: CircuitState,
    pub failure_rate: f64,
    pub opened_at: Option<chrono::DateTime<chrono::Utc>>,
    pub samples_in_window: usize,
}
