use crate::circuit::state::{
    Admission, BankCircuit, BankCircuitSnapshot, BreakerThresholds, CircuitState, CircuitTransition,
};
use crate::circuit::transitions;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditEntry {
    pub bank: String,
    pub from: CircuitState,
    pub to: CircuitState,
    pub reason: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

/// Process-wide breaker state, one machine per bank. Banks with no recorded
/// telemetry are treated as CLOSED.
pub struct CircuitMonitor {
    thresholds: BreakerThresholds,
    banks: RwLock<HashMap<String, BankCircuit>>,
    audit: RwLock<Vec<AuditEntry>>,
}

impl CircuitMonitor {
    pub fn new(thresholds: BreakerThresholds) -> Self {
        Self {
            thresholds,
            banks: RwLock::new(HashMap::new()),
            audit: RwLock::new(Vec::new()),
        }
    }

    pub fn admission(&self, bank: &str) -> Admission {
        let banks = self.banks.read();
        match banks.get(bank) {
            Some(circuit) => transitions::admission(circuit),
            None => Admission::Allow,
        }
    }

    /// Claims the single half-open probe slot. Returns false if another
    /// request won it first or the bank moved out of HALF_OPEN.
    pub fn begin_probe(&self, bank: &str) -> bool {
        let mut banks = self.banks.write();
        match banks.get_mut(bank) {
            Some(circuit) if circuit.state == CircuitState::HalfOpen && !circuit.probe_in_flight => {
                circuit.probe_in_flight = true;
                true
            }
            _ => false,
        }
    }

    /// Frees the probe slot without an outcome (probe selection expired).
    pub fn release_probe(&self, bank: &str) {
        let mut banks = self.banks.write();
        if let Some(circuit) = banks.get_mut(bank) {
            if circuit.state == CircuitState::HalfOpen {
                circuit.probe_in_flight = false;
            }
        }
    }

    pub fn record_outcome(
        &self,
        bank: &str,
        success: bool,
        was_probe: bool,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<CircuitTransition> {
        let mut banks = self.banks.write();
        let circuit = banks
            .entry(bank.to_string())
            .or_insert_with(|| BankCircuit::new(bank));
        let transition = transitions::record_outcome(circuit, &self.thresholds, success, was_probe, now);
        drop(banks);
        if let Some(t) = &transition {
            self.record_audit(t);
        }
        transition
    }

    /// Scheduler-driven pass over all banks; returns the transitions taken.
    pub fn tick(&self, now: chrono::DateTime<chrono::Utc>) -> Vec<CircuitTransition> {
        let mut taken = Vec::new();
        let mut banks = self.banks.write();
        for circuit in banks.values_mut() {
            if let Some(t) = transitions::tick(circuit, &self.thresholds, now) {
                taken.push(t);
            }
        }
        drop(banks);
        for t in &taken {
            self.record_audit(t);
        }
        taken
    }

    /// Admin override. Last writer wins when racing an automatic
    /// transition; a reset that lands on an already-closed bank is a no-op
    /// transition and is still audited.
    pub fn reset(&self, bank: &str, now: chrono::DateTime<chrono::Utc>) -> Option<CircuitTransition> {
        let mut banks = self.banks.write();
        let circuit = banks.get_mut(bank)?;
        if circuit.state != CircuitState::Closed {
            tracing::warn!(bank, state = ?circuit.state, "admin reset overrides breaker state");
        }
        let t = transitions::reset(circuit, now);
        drop(banks);
        self.record_audit(&t);
        Some(t)
    }

    pub fn snapshot(&self, now: chrono::DateTime<chrono::Utc>) -> Vec<BankCircuitSnapshot> {
        let mut banks = self.banks.write();
        let mut rows: Vec<BankCircuitSnapshot> = banks
            .values_mut()
            .map(|circuit| {
                circuit.prune(self.thresholds.window_secs, now);
                BankCircuitSnapshot {
                    bank: circuit.bank.clone(),
                    state: circuit.state,
                    failure_rate: circuit.failure_rate(),
                    opened_at: circuit.opened_at,
                    samples_in_window: circuit.window.len(),
                }
            })
            .collect();
        rows.sort_by(|a, b| a.bank.cmp(&b.bank));
        rows
    }

    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit.read().clone()
    }

    fn record_audit(&self, t: &CircuitTransition) {
        tracing::info!(
            bank = %t.bank,
            from = ?t.from,
            to = ?t.to,
            reason = %t.reason,
            "circuit transition"
        );
        self.audit.write().push(AuditEntry {
            bank: t.bank.clone(),
            from: t.from,
            to: t.to,
            reason: t.reason.clone(),
            at: t.at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().unwrap()
    }

    #[test]
    fn unknown_bank_is_allowed() {
        let m = CircuitMonitor::new(BreakerThresholds::default());
        assert_eq!(m.admission("NOBODY"), Admission::Allow);
    }

    #[test]
    fn probe_slot_is_exclusive() {
        let m = CircuitMonitor::new(BreakerThresholds::default());
        for i in 0..5 {
            m.record_outcome("HDFC", false, false, t0() + Duration::seconds(i));
        }
        m.tick(t0() + Duration::minutes(11));
        assert_eq!(m.admission("HDFC"), Admission::Probe);
        assert!(m.begin_probe("HDFC"));
        assert!(!m.begin_probe("HDFC"));
        assert_eq!(m.admission("HDFC"), Admission::Reject);
        m.release_probe("HDFC");
        assert!(m.begin_probe("HDFC"));
    }

    #[test]
    fn transitions_are_audited() {
        let m = CircuitMonitor::new(BreakerThresholds::default());
        for i in 0..5 {
            m.record_outcome("HDFC", false, false, t0() + Duration::seconds(i));
        }
        m.reset("HDFC", t0() + Duration::minutes(1));
        let audit = m.audit_log();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].to, CircuitState::Open);
        assert_eq!(audit[1].reason, "admin reset");
    }

    #[test]
    fn reset_on_unknown_bank_is_none() {
        let m = CircuitMonitor::new(BreakerThresholds::default());
        assert!(m.reset("NOBODY", t0()).is_none());
    }
}
