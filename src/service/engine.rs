use crate::alerts::AlertStore;
use crate::circuit::monitor::CircuitMonitor;
use crate::circuit::state::{Admission, CircuitState, CircuitTransition};
use crate::domain::alert::AlertKind;
use crate::domain::endpoint::Tier;
use crate::domain::request::{Outcome, PayinRequest, SelectionResponse};
use crate::domain::selection_log::SelectionLog;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::registry::EndpointRegistry;
use crate::scoring::engine::{rank, score_endpoint};
use crate::scoring::types::{ScoreWeights, ScoredCandidate};
use crate::stats::aggregator::{RealtimeStats, StatsAggregator};
use crate::stats::log_store::{LogQuery, SelectionLogStore};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// In-flight selection bookkeeping. `resolved` makes outcome reporting
/// idempotent: the first report wins, repeats are no-ops.
#[derive(Debug, Clone)]
struct SelectionRecord {
    endpoint_id: Uuid,
    bank: String,
    amount: i64,
    was_probe: bool,
    resolved: Option<Outcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircuitStatusRow {
    pub bank: String,
    pub state: CircuitState,
    pub failure_rate: f64,
    pub active_endpoints: usize,
}

/// Orchestrates filter → score → rank → atomic reserve → log, and closes the
/// feedback loop from reported outcomes back into the registry and breaker.
#[derive(Clone)]
pub struct RoutingEngine {
    pub registry: Arc<EndpointRegistry>,
    pub monitor: Arc<CircuitMonitor>,
    pub stats: Arc<StatsAggregator>,
    pub logs: Arc<SelectionLogStore>,
    pub alerts: Arc<AlertStore>,
    pub weights: ScoreWeights,
    pub max_reserve_attempts: usize,
    events: broadcast::Sender<EngineEvent>,
    selections: Arc<RwLock<HashMap<Uuid, SelectionRecord>>>,
}

impl RoutingEngine {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        monitor: Arc<CircuitMonitor>,
        weights: ScoreWeights,
        max_reserve_attempts: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            registry,
            monitor,
            stats: Arc::new(StatsAggregator::new()),
            logs: Arc::new(SelectionLogStore::new()),
            alerts: Arc::new(AlertStore::new()),
            weights,
            max_reserve_attempts,
            events,
            selections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Selects and reserves exactly one endpoint for the request.
    pub fn select(&self, request: &PayinRequest) -> Result<SelectionResponse, EngineError> {
        let now = chrono::Utc::now();
        let band = Tier::band_for(request.amount).ok_or_else(|| {
            EngineError::InvalidRequest(format!(
                "amount {} outside supported range 100..=100000",
                request.amount
            ))
        })?;

        // Snapshot of capacity-eligible endpoints, then breaker + tier
        // filtering. Tier NONE is exclusion, never a low score.
        let mut candidates: Vec<(ScoredCandidate, bool)> = Vec::new();
        for endpoint in self.registry.candidates(request.amount) {
            let probe = match self.monitor.admission(&endpoint.bank) {
                Admission::Allow => false,
                Admission::Probe => true,
                Admission::Reject => continue,
            };
            if let Some(scored) = score_endpoint(band, request, &endpoint, &self.weights) {
                candidates.push((scored, probe));
            }
        }

        if candidates.is_empty() {
            return Err(EngineError::NoEligibleEndpoint);
        }

        let probe_by_id: HashMap<Uuid, bool> =
            candidates.iter().map(|(c, p)| (c.endpoint_id, *p)).collect();
        let ranked = rank(candidates.into_iter().map(|(c, _)| c).collect());

        let mut attempts = 0;
        for candidate in &ranked {
            if attempts >= self.max_reserve_attempts {
                break;
            }
            attempts += 1;

            if self
                .registry
                .try_reserve(candidate.endpoint_id, candidate.version, request.amount)
                .is_err()
            {
                continue;
            }

            let was_probe = probe_by_id.get(&candidate.endpoint_id).copied().unwrap_or(false);
            if was_probe && !self.monitor.begin_probe(&candidate.bank) {
                // Lost the probe slot after winning the endpoint; unwind.
                self.registry.release(candidate.endpoint_id, request.amount);
                continue;
            }

            return Ok(self.commit_selection(request, band, candidate, was_probe, now));
        }

        Err(EngineError::PoolExhausted)
    }

    fn commit_selection(
        &self,
        request: &PayinRequest,
        band: Tier,
        candidate: &ScoredCandidate,
        was_probe: bool,
        now: chrono::DateTime<chrono::Utc>,
    ) -> SelectionResponse {
        let selection_id = Uuid::new_v4();
        self.selections.write().insert(
            selection_id,
            SelectionRecord {
                endpoint_id: candidate.endpoint_id,
                bank: candidate.bank.clone(),
                amount: request.amount,
                was_probe,
                resolved: None,
            },
        );

        self.logs.append(SelectionLog {
            id: selection_id,
            timestamp: now,
            endpoint_id: candidate.endpoint_id,
            bank: candidate.bank.clone(),
            amount: request.amount,
            score: candidate.score,
            request_tier: band,
            tier_match: candidate.tier_match,
            geo_match: candidate.geo_match,
            geo_boost: candidate.geo_boost,
        });
        self.stats.ingest_selection(&candidate.bank, request.amount, now);

        tracing::info!(
            selection = %selection_id,
            endpoint = %candidate.endpoint_id,
            bank = %candidate.bank,
            score = candidate.score,
            tier = ?candidate.tier_match,
            geo = ?candidate.geo_match,
            probe = was_probe,
            "endpoint selected"
        );
        let _ = self.events.send(EngineEvent::SelectionMade {
            selection_id,
            endpoint_id: candidate.endpoint_id,
            bank: candidate.bank.clone(),
            score: candidate.score,
        });

        SelectionResponse {
            selection_id,
            endpoint_id: candidate.endpoint_id,
            bank: candidate.bank.clone(),
            score: candidate.score,
        }
    }

    /// Terminal outcome for a previous selection. Duplicate reports for the
    /// same selection are accepted and ignored.
    pub fn report_outcome(&self, selection_id: Uuid, outcome: Outcome) -> Result<(), EngineError> {
        let now = chrono::Utc::now();
        let record = {
            let mut selections = self.selections.write();
            let record = selections
                .get_mut(&selection_id)
                .ok_or(EngineError::UnknownSelection(selection_id))?;
            if record.resolved.is_some() {
                return Ok(());
            }
            record.resolved = Some(outcome);
            record.clone()
        };

        self.registry.finalize(record.endpoint_id, outcome, record.amount);

        // Failed counts against the bank; Expired does not: an unpaid payin
        // is a user no-show, not bank failure, so it only releases capacity
        // (and a probe slot, if it held one).
        let transition = match outcome {
            Outcome::Completed => {
                self.monitor
                    .record_outcome(&record.bank, true, record.was_probe, now)
            }
            Outcome::Failed => {
                self.monitor
                    .record_outcome(&record.bank, false, record.was_probe, now)
            }
            Outcome::Expired => {
                if record.was_probe {
                    self.monitor.release_probe(&record.bank);
                }
                None
            }
        };

        self.stats.ingest_outcome(&record.bank, outcome, now);
        let _ = self.events.send(EngineEvent::OutcomeReported {
            selection_id,
            bank: record.bank.clone(),
            outcome,
        });

        if let Some(t) = transition {
            self.handle_transition(&t, now);
        }
        Ok(())
    }

    fn handle_transition(&self, t: &CircuitTransition, now: chrono::DateTime<chrono::Utc>) {
        let _ = self.events.send(EngineEvent::CircuitTransitioned {
            bank: t.bank.clone(),
            from: t.from,
            to: t.to,
        });
        if t.to == CircuitState::Open {
            let alert = self.alerts.raise(
                AlertKind::CircuitOpened,
                &t.bank,
                format!("circuit opened for {}: {}", t.bank, t.reason),
                now,
            );
            let _ = self.events.send(EngineEvent::AlertRaised {
                alert_id: alert.id,
                bank: t.bank.clone(),
            });
        }
    }

    /// Scheduler entry point for time-based breaker transitions.
    pub fn tick_breakers(&self, now: chrono::DateTime<chrono::Utc>) {
        for t in self.monitor.tick(now) {
            self.handle_transition(&t, now);
        }
    }

    pub fn circuit_status(&self) -> Vec<CircuitStatusRow> {
        let now = chrono::Utc::now();
        let counts = self.registry.active_counts_by_bank();
        let mut rows: Vec<CircuitStatusRow> = self
            .monitor
            .snapshot(now)
            .into_iter()
            .map(|s| CircuitStatusRow {
                active_endpoints: counts.get(&s.bank).copied().unwrap_or(0),
                bank: s.bank,
                state: s.state,
                failure_rate: s.failure_rate,
            })
            .collect();
        // Banks with endpoints but no telemetry yet report as CLOSED.
        for (bank, count) in counts {
            if !rows.iter().any(|r| r.bank == bank) {
                rows.push(CircuitStatusRow {
                    bank,
                    state: CircuitState::Closed,
                    failure_rate: 0.0,
                    active_endpoints: count,
                });
            }
        }
        rows.sort_by(|a, b| a.bank.cmp(&b.bank));
        rows
    }

    pub fn reset_circuit(&self, bank: &str) -> Result<(), EngineError> {
        let now = chrono::Utc::now();
        let t = self
            .monitor
            .reset(bank, now)
            .ok_or_else(|| EngineError::UnknownBank(bank.to_string()))?;
        let _ = self.events.send(EngineEvent::CircuitTransitioned {
            bank: t.bank,
            from: t.from,
            to: t.to,
        });
        Ok(())
    }

    pub fn realtime_stats(&self) -> RealtimeStats {
        self.stats.realtime(chrono::Utc::now())
    }

    pub fn query_logs(&self, query: &LogQuery) -> Vec<SelectionLog> {
        self.logs.query(query)
    }
}
