use chrono::{DateTime, Timelike, Utc};

#[derive(Debug, Clone)]
pub struct MinuteBucket {
    pub minute: i64,
    pub selections: u64,
    pub volume: i64,
    pub completed: u64,
    pub failed: u64,
}

impl MinuteBucket {
    pub fn new(minute: i64) -> Self {
        Self {
            minute,
            selections: 0,
            volume: 0,
            completed: 0,
            failed: 0,
        }
    }
}

pub fn minute_epoch(ts: DateTime<Utc>) -> i64 {
    ts.timestamp() - (ts.second() as i64)
}
