use crate::domain::selection_log::{GeoMatch, SelectionLog, TierMatch};
use parking_lot::RwLock;
use serde::Deserialize;

/// Query over the append-only selection log. All fields optional; absent
/// means no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    pub bank: Option<String>,
    pub tier_match: Option<TierMatch>,
    pub geo_match: Option<GeoMatch>,
}

/// Append-only selection decisions, newest last. Entries are never mutated.
#[derive(Default)]
pub struct SelectionLogStore {
    logs: RwLock<Vec<SelectionLog>>,
}

impl SelectionLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, log: SelectionLog) {
        self.logs.write().push(log);
    }

    pub fn query(&self, q: &LogQuery) -> Vec<SelectionLog> {
        self.logs
            .read()
            .iter()
            .filter(|log| {
                q.from.is_none_or(|from| log.timestamp >= from)
                    && q.to.is_none_or(|to| log.timestamp <= to)
                    && q.bank
                        .as_deref()
                        .is_none_or(|bank| log.bank.eq_ignore_ascii_case(bank))
                    && q.tier_match.is_none_or(|tm| log.tier_match == tm)
                    && q.geo_match.is_none_or(|gm| log.geo_match == gm)
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.read().is_empty()
    }
}
