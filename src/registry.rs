use crate::domain::endpoint::{Endpoint, EndpointUpdate, NewEndpoint};
use crate::domain::request::Outcome;
use crate::error::EngineError;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Reservation failure. `Conflict` means a concurrent writer touched the
/// endpoint between snapshot and commit; the selector moves on to the next
/// candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveError {
    Conflict,
    Gone,
}

/// The pool of collection endpoints. All mutation goes through versioned
/// updates; callers never write back from their own snapshots.
pub struct EndpointRegistry {
    endpoints: RwLock<HashMap<Uuid, Endpoint>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, req: NewEndpoint, now: chrono::DateTime<chrono::Utc>) -> Endpoint {
        let endpoint = Endpoint::from_new(req, now);
        self.endpoints.write().insert(endpoint.id, endpoint.clone());
        endpoint
    }

    pub fn get(&self, id: Uuid) -> Option<Endpoint> {
        self.endpoints.read().get(&id).cloned()
    }

    pub fn list(&self) -> Vec<Endpoint> {
        let mut all: Vec<Endpoint> = self.endpoints.read().values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }

    /// Snapshot of endpoints that currently have capacity for `amount`.
    /// Breaker and tier filtering happen in the selector.
    pub fn candidates(&self, amount: i64) -> Vec<Endpoint> {
        self.endpoints
            .read()
            .values()
            .filter(|e| e.has_capacity_for(amount))
            .cloned()
            .collect()
    }

    /// Compare-and-set reservation. Succeeds only if the endpoint's version
    /// still matches the snapshot the candidate was scored from, then commits
    /// the amount and the in-flight lock in the same critical section.
    pub fn try_reserve(
        &self,
        id: Uuid,
        expected_version: u64,
        amount: i64,
    ) -> Result<(), ReserveError> {
        let mut endpoints = self.endpoints.write();
        let endpoint = endpoints.get_mut(&id).ok_or(ReserveError::Gone)?;
        if endpoint.version != expected_version {
            return Err(ReserveError::Conflict);
        }
        if !endpoint.has_capacity_for(amount) {
            return Err(ReserveError::Conflict);
        }
        endpoint.version += 1;
        endpoint.reserved = true;
        endpoint.daily_volume += amount;
        Ok(())
    }

    /// Unwinds a reservation that never became a selection (lost probe slot,
    /// cancelled request). No leaked capacity.
    pub fn release(&self, id: Uuid, amount: i64) {
        let mut endpoints = self.endpoints.write();
        if let Some(endpoint) = endpoints.get_mut(&id) {
            endpoint.version += 1;
            endpoint.reserved = false;
            endpoint.daily_volume = (endpoint.daily_volume - amount).max(0);
        }
    }

    /// Applies a terminal outcome: releases the in-flight lock, updates the
    /// rolling success rate, and returns unconsumed capacity for `Expired`.
    pub fn finalize(&self, id: Uuid, outcome: Outcome, amount: i64) -> Option<Endpoint> {
        let mut endpoints = self.endpoints.write();
        let endpoint = endpoints.get_mut(&id)?;
        endpoint.version += 1;
        endpoint.reserved = false;
        endpoint.total_txns += 1;
        match outcome {
            Outcome::Completed => endpoint.successful_txns += 1,
            Outcome::Failed => {}
            Outcome::Expired => {
                endpoint.daily_volume = (endpoint.daily_volume - amount).max(0);
            }
        }
        endpoint.success_rate = endpoint.successful_txns as f64 / endpoint.total_txns as f64 * 100.0;
        Some(endpoint.clone())
    }

    /// Trader/admin edits, including the activation toggle. Goes through the
    /// same version bump as reservation so a toggle cannot interleave with a
    /// reserve unversioned.
    pub fn update(&self, id: Uuid, update: EndpointUpdate) -> Result<Endpoint, EngineError> {
        let mut endpoints = self.endpoints.write();
        let endpoint = endpoints.get_mut(&id).ok_or(EngineError::UnknownEndpoint(id))?;
        endpoint.version += 1;
        if let Some(active) = update.active {
            endpoint.active = active;
        }
        if let Some(tier) = update.tier {
            endpoint.tier = tier;
        }
        if let Some(limit) = update.daily_limit {
            endpoint.daily_limit = limit;
        }
        if let Some(limit) = update.per_txn_limit {
            endpoint.per_txn_limit = limit;
        }
        if let Some(city) = update.bank_city {
            endpoint.bank_city = Some(city);
        }
        if let Some(state) = update.bank_state {
            endpoint.bank_state = Some(state);
        }
        Ok(endpoint.clone())
    }

    pub fn active_counts_by_bank(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for endpoint in self.endpoints.read().values() {
            if endpoint.active {
                *counts.entry(endpoint.bank.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
