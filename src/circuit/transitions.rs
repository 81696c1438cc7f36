use crate::circuit::state::{Admission, BankCircuit, BreakerThresholds, CircuitState, CircuitTransition};

fn transition(
    circuit: &mut BankCircuit,
    to: CircuitState,
    reason: String,
    now: chrono::DateTime<chrono::Utc>,
) -> CircuitTransition {
    let from = circuit.state;
    circuit.state = to;
    match to {
        CircuitState::Open => {
            circuit.opened_at = Some(now);
            circuit.probe_in_flight = false;
        }
        CircuitState::HalfOpen => {
            circuit.probe_in_flight = false;
        }
        CircuitState::Closed => {
            circuit.opened_at = None;
            circuit.probe_in_flight = false;
            circuit.window.clear();
        }
    }
    CircuitTransition {
        bank: circuit.bank.clone(),
        from,
        to,
        reason,
        at: now,
    }
}

pub fn admission(circuit: &BankCircuit) -> Admission {
    match circuit.state {
        CircuitState::Closed => Admission::Allow,
        CircuitState::Open => Admission::Reject,
        CircuitState::HalfOpen => {
            if circuit.probe_in_flight {
                Admission::Reject
            } else {
                Admission::Probe
            }
        }
    }
}

/// Folds one terminal outcome into the window and applies any resulting
/// state change. `was_probe` marks an outcome for a half-open probe.
pub fn record_outcome(
    circuit: &mut BankCircuit,
    thresholds: &BreakerThresholds,
    success: bool,
    was_probe: bool,
    now: chrono::DateTime<chrono::Utc>,
) -> Option<CircuitTransition> {
    circuit.window.push_back((now, success));
    circuit.prune(thresholds.window_secs, now);

    match circuit.state {
        CircuitState::Closed => {
            let rate = circuit.failure_rate();
            if circuit.window.len() >= thresholds.min_samples && rate > thresholds.failure_rate_open {
                return Some(transition(
                    circuit,
                    CircuitState::Open,
                    format!(
                        "failure rate {:.0}% over {} outcomes",
                        rate * 100.0,
                        circuit.window.len()
                    ),
                    now,
                ));
            }
            None
        }
        CircuitState::HalfOpen => {
            if !was_probe {
                return None;
            }
            circuit.probe_in_flight = false;
            if success {
                Some(transition(
                    circuit,
                    CircuitState::Closed,
                    "probe succeeded".to_string(),
                    now,
                ))
            } else {
                Some(transition(
                    circuit,
                    CircuitState::Open,
                    "probe failed".to_string(),
                    now,
                ))
            }
        }
        // Outcomes landing while open are stragglers from earlier
        // reservations; they accumulate in the window but cannot transition.
        CircuitState::Open => None,
    }
}

/// Time-driven transition: OPEN moves to HALF_OPEN once the cooldown since
/// `opened_at` has elapsed. Called from the scheduler tick, not from request
/// arrival, so breakers recover during quiet periods.
pub fn tick(
    circuit: &mut BankCircuit,
    thresholds: &BreakerThresholds,
    now: chrono::DateTime<chrono::Utc>,
) -> Option<CircuitTransition> {
    if circuit.state != CircuitState::Open {
        return None;
    }
    let opened_at = circuit.opened_at?;
    if now - opened_at >= chrono::Duration::seconds(thresholds.cooldown_secs) {
        Some(transition(
            circuit,
            CircuitState::HalfOpen,
            "cooldown elapsed".to_string(),
            now,
        ))
    } else {
        None
    }
}

/// Admin override: forces CLOSED and clears the window regardless of the
/// computed rate. Last writer wins against an in-flight automatic
/// transition; the breaker reopens immediately if failures continue.
pub fn reset(circuit: &mut BankCircuit, now: chrono::DateTime<chrono::Utc>) -> CircuitTransition {
    transition(circuit, CircuitState::Closed, "admin reset".to_string(), now)
}
