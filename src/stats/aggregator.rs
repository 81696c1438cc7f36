use crate::domain::request::Outcome;
use crate::stats::window::{minute_epoch, MinuteBucket};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize)]
pub struct BankStat {
    pub bank: String,
    pub requests: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RealtimeStats {
    pub requests_1h: u64,
    pub success_rate_1h: f64,
    pub volume_1h: i64,
    pub failed_1h: u64,
    pub top_banks: Vec<BankStat>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Sliding per-bank minute buckets over the trailing hour. Owns the realtime
/// dashboard numbers; callers get snapshots, never the buckets.
#[derive(Default)]
pub struct StatsAggregator {
    buckets: RwLock<HashMap<String, BTreeMap<i64, MinuteBucket>>>,
}

const RETENTION_MINUTES: i64 = 60;
const TOP_BANKS: usize = 5;

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest_selection(&self, bank: &str, amount: i64, now: chrono::DateTime<chrono::Utc>) {
        let minute = minute_epoch(now);
        let mut buckets = self.buckets.write();
        let bank_map = buckets.entry(bank.to_string()).or_default();
        let bucket = bank_map
            .entry(minute)
            .or_insert_with(|| MinuteBucket::new(minute));
        bucket.selections += 1;
        bucket.volume += amount;

        let floor = minute - ((RETENTION_MINUTES - 1) * 60);
        bank_map.retain(|m, _| *m >= floor);
    }

    /// Expired payins count as failed for the dashboard: the payin did not
    /// complete. (The breaker window treats them differently.)
    pub fn ingest_outcome(&self, bank: &str, outcome: Outcome, now: chrono::DateTime<chrono::Utc>) {
        let minute = minute_epoch(now);
        let mut buckets = self.buckets.write();
        let bank_map = buckets.entry(bank.to_string()).or_default();
        let bucket = bank_map
            .entry(minute)
            .or_insert_with(|| MinuteBucket::new(minute));
        match outcome {
            Outcome::Completed => bucket.completed += 1,
            Outcome::Failed | Outcome::Expired => bucket.failed += 1,
        }
    }

    pub fn realtime(&self, now: chrono::DateTime<chrono::Utc>) -> RealtimeStats {
        let start = minute_epoch(now) - ((RETENTION_MINUTES - 1) * 60);
        let buckets = self.buckets.read();

        let mut requests: u64 = 0;
        let mut volume: i64 = 0;
        let mut completed: u64 = 0;
        let mut failed: u64 = 0;
        let mut per_bank: HashMap<&str, (u64, u64, u64)> = HashMap::new();

        for (bank, bank_map) in buckets.iter() {
            for bucket in bank_map.values() {
                if bucket.minute < start {
                    continue;
                }
                requests += bucket.selections;
                volume += bucket.volume;
                completed += bucket.completed;
                failed += bucket.failed;
                let entry = per_bank.entry(bank.as_str()).or_insert((0, 0, 0));
                entry.0 += bucket.selections;
                entry.1 += bucket.completed;
                entry.2 += bucket.failed;
            }
        }

        let resolved = completed + failed;
        let success_rate_1h = if resolved == 0 {
            0.0
        } else {
            completed as f64 / resolved as f64 * 100.0
        };

        let mut top_banks: Vec<BankStat> = per_bank
            .into_iter()
            .map(|(bank, (reqs, ok, ko))| BankStat {
                bank: bank.to_string(),
                requests: reqs,
                success_rate: if ok + ko == 0 {
                    0.0
                } else {
                    ok as f64 / (ok + ko) as f64 * 100.0
                },
            })
            .collect();
        top_banks.sort_by(|a, b| b.requests.cmp(&a.requests).then(a.bank.cmp(&b.bank)));
        top_banks.truncate(TOP_BANKS);

        RealtimeStats {
            requests_1h: requests,
            success_rate_1h,
            volume_1h: volume,
            failed_1h: failed,
            top_banks,
            generated_at: now,
        }
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
    fn aggregates_trailing_hour() {
        let s = StatsAggregator::new();
        s.ingest_selection("HDFC", 3_000, t0());
        s.ingest_outcome("HDFC", Outcome::Completed, t0() + Duration::seconds(30));
        s.ingest_selection("AXIS", 8_000, t0() + Duration::minutes(1));
        s.ingest_outcome("AXIS", Outcome::Failed, t0() + Duration::minutes(2));

        let stats = s.realtime(t0() + Duration::minutes(5));
        assert_eq!(stats.requests_1h, 2);
        assert_eq!(stats.volume_1h, 11_000);
        assert_eq!(stats.failed_1h, 1);
        assert!((stats.success_rate_1h - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stale_minutes_drop_out() {
        let s = StatsAggregator::new();
        s.ingest_selection("HDFC", 3_000, t0());
        // Ingest two hours later prunes the old bucket for that bank.
        s.ingest_selection("HDFC", 1_000, t0() + Duration::hours(2));
        let stats = s.realtime(t0() + Duration::hours(2));
        assert_eq!(stats.requests_1h, 1);
        assert_eq!(stats.volume_1h, 1_000);
    }

    #[test]
    fn top_banks_ordered_by_traffic() {
        let s = StatsAggregator::new();
        for _ in 0..3 {
            s.ingest_selection("HDFC", 1_000, t0());
            s.ingest_outcome("HDFC", Outcome::Completed, t0());
        }
        s.ingest_selection("AXIS", 1_000, t0());
        s.ingest_outcome("AXIS", Outcome::Failed, t0());

        let stats = s.realtime(t0());
        assert_eq!(stats.top_banks[0].bank, "HDFC");
        assert_eq!(stats.top_banks[0].requests, 3);
        assert!((stats.top_banks[0].success_rate - 100.0).abs() < f64::EPSILON);
        assert_eq!(stats.top_banks[1].bank, "AXIS");
        assert!((stats.top_banks[1].success_rate - 0.0).abs() < f64::EPSILON);
    }
}
